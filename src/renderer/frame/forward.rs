//! Forward path: one lit pass over the active mesh.

use crate::renderer::core::pipeline::{
    PipelineSpec, create_render_pipeline, create_shader, uniform_entry,
};
use crate::renderer::core::{DepthMode, GpuContext, ScopedPipeline, UniformBuffer};
use crate::renderer::frame::scope::PassScope;
use crate::renderer::frame::state::ShadingPathState;
use crate::renderer::frame::uniforms::ForwardLightUniforms;
use crate::renderer::frame::{FrameLayouts, RecordContext, wgsl};
use crate::renderer::mesh::GpuMesh;
use crate::scene::lights::LightRig;

pub struct ForwardPass {
    pipeline: ScopedPipeline,
    lights: UniformBuffer<ForwardLightUniforms>,
}

impl ForwardPass {
    #[must_use]
    pub fn new(
        ctx: &GpuContext,
        layouts: &FrameLayouts,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let device = &ctx.device;
        let light_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Forward Light Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT, false)],
        });
        let shader = create_shader(
            device,
            "Forward Shader",
            &[wgsl::VERTEX, wgsl::FRAME, include_str!("../shaders/forward.wgsl")],
        );
        let pipeline = create_render_pipeline(
            device,
            &PipelineSpec {
                label: "Forward Pipeline",
                shader: &shader,
                bind_group_layouts: &[&layouts.frame, &layouts.albedo, &light_layout],
                color_formats: &[color_format],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth: DepthMode::Less,
                depth_format,
            },
        );
        Self {
            pipeline,
            lights: UniformBuffer::new(device, "Forward Lights", &light_layout),
        }
    }

    /// Writes the light block for this frame's light mode and specular model.
    pub fn prepare(&mut self, queue: &wgpu::Queue, state: &ShadingPathState, rig: &LightRig) {
        let uniforms = ForwardLightUniforms::new(state.light_mode(), state.blinn(), rig);
        self.lights.write(queue, &uniforms);
    }

    /// Last light block written, for inspection.
    #[must_use]
    pub fn light_uniforms(&self) -> Option<&ForwardLightUniforms> {
        self.lights.current()
    }

    pub fn record(
        &self,
        rc: &RecordContext<'_>,
        scope: &mut PassScope<'_>,
        mesh: Option<&GpuMesh>,
    ) {
        let Some(mesh) = mesh else {
            return;
        };
        scope.set_pipeline(&self.pipeline);
        scope.set_bind_group(0, rc.frame_group);
        scope.set_bind_group(2, self.lights.bind_group());
        mesh.draw(scope, 1);
    }
}
