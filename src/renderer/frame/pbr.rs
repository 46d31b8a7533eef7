//! PBR/IBL path: split-sum image-based lighting plus four direct point lights.
//!
//! Group layout of `pbr.wgsl`:
//!
//! | Group | Contents                                        |
//! |-------|-------------------------------------------------|
//! | 0     | frame uniforms                                  |
//! | 1     | material maps 0–4, sampler 5                    |
//! | 2     | irradiance, prefiltered, BRDF LUT, sampler      |
//! | 3     | lights, metallic/roughness scale, max mip lod   |

use crate::renderer::core::pipeline::{
    PipelineSpec, create_render_pipeline, create_shader, sampler_entry, texture_entry,
    uniform_entry,
};
use crate::renderer::core::{
    BindGroupKey, CachedBindGroup, DepthMode, GpuContext, ScopedPipeline, UniformBuffer,
};
use crate::renderer::frame::scope::PassScope;
use crate::renderer::frame::state::ShadingPathState;
use crate::renderer::frame::uniforms::PbrUniforms;
use crate::renderer::frame::{FrameLayouts, RecordContext, wgsl};
use crate::renderer::material::MaterialTextureSet;
use crate::renderer::mesh::GpuMesh;
use crate::renderer::precompute::EnvironmentSet;
use crate::renderer::primitives::GpuPrimitive;
use crate::scene::lights::LightRig;

/// What the PBR mesh pass draws.
#[derive(Clone, Copy)]
pub enum PbrSubject<'a> {
    Mesh(&'a GpuMesh),
    ProbeSphere(&'a GpuPrimitive),
}

pub struct PbrPass {
    mesh_pipeline: ScopedPipeline,
    probe_pipeline: ScopedPipeline,
    ibl_layout: wgpu::BindGroupLayout,
    params: UniformBuffer<PbrUniforms>,
    ibl_group: CachedBindGroup,
}

impl PbrPass {
    #[must_use]
    pub fn new(
        ctx: &GpuContext,
        layouts: &FrameLayouts,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let device = &ctx.device;
        let ibl_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("IBL Layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::Cube, true),
                texture_entry(1, wgpu::TextureViewDimension::Cube, true),
                texture_entry(2, wgpu::TextureViewDimension::D2, true),
                sampler_entry(3),
            ],
        });
        let params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("PBR Params Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT, false)],
        });

        let shader = create_shader(
            device,
            "PBR Shader",
            &[
                wgsl::VERTEX,
                wgsl::FRAME,
                include_str!("../shaders/ggx_sampling.wgsl"),
                include_str!("../shaders/pbr.wgsl"),
            ],
        );
        let bind_group_layouts = [
            &layouts.frame,
            &layouts.material,
            &ibl_layout,
            &params_layout,
        ];
        let pipeline = |label: &str, topology| {
            create_render_pipeline(
                device,
                &PipelineSpec {
                    label,
                    shader: &shader,
                    bind_group_layouts: &bind_group_layouts,
                    color_formats: &[color_format],
                    topology,
                    depth: DepthMode::Less,
                    depth_format,
                },
            )
        };

        Self {
            mesh_pipeline: pipeline("PBR Mesh Pipeline", wgpu::PrimitiveTopology::TriangleList),
            probe_pipeline: pipeline("PBR Probe Pipeline", wgpu::PrimitiveTopology::TriangleStrip),
            ibl_layout,
            params: UniformBuffer::new(device, "PBR Params", &params_layout),
            ibl_group: CachedBindGroup::new(),
        }
    }

    /// Uploads lights, the material scales and the prefiltered mip range.
    pub fn prepare(
        &mut self,
        queue: &wgpu::Queue,
        state: &ShadingPathState,
        rig: &LightRig,
        environment: &EnvironmentSet,
    ) {
        let uniforms = PbrUniforms::new(
            rig,
            state.metallic(),
            state.roughness(),
            environment.max_reflection_lod(),
        );
        self.params.write(queue, &uniforms);
    }

    #[must_use]
    pub fn uniforms(&self) -> Option<&PbrUniforms> {
        self.params.current()
    }

    pub fn record(
        &mut self,
        rc: &RecordContext<'_>,
        scope: &mut PassScope<'_>,
        environment: &EnvironmentSet,
        material: &MaterialTextureSet,
        subject: PbrSubject<'_>,
    ) {
        let layout = &self.ibl_layout;
        let key = BindGroupKey::new("ibl")
            .with_resource(environment.irradiance.id())
            .with_resource(environment.prefiltered.id())
            .with_resource(environment.brdf_lut.id());
        let ibl = self.ibl_group.get_or_create(key, || {
            rc.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("IBL Group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&environment.irradiance.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&environment.prefiltered.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&environment.brdf_lut.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&rc.layouts.linear_sampler),
                    },
                ],
            })
        });

        let pipeline = match subject {
            PbrSubject::Mesh(_) => &self.mesh_pipeline,
            PbrSubject::ProbeSphere(_) => &self.probe_pipeline,
        };
        scope.set_pipeline(pipeline);
        scope.set_bind_group(0, rc.frame_group);
        scope.set_bind_group(1, &material.bind_group);
        scope.set_bind_group(2, ibl);
        scope.set_bind_group(3, self.params.bind_group());

        match subject {
            PbrSubject::Mesh(mesh) => mesh.draw_untextured(scope),
            PbrSubject::ProbeSphere(sphere) => sphere.draw(scope.raw()),
        }
    }
}
