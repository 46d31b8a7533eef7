//! Deferred path.
//!
//! 1. Geometry pass: view-space position, view-space normal and albedo into
//!    the G-buffer, with the G-buffer's own depth.
//! 2. SSAO (optional): hemisphere occlusion into `SsaoRaw`, then a 4×4 box
//!    blur into `SsaoBlurred`.
//! 3. Lighting: one full-screen quad reading the G-buffer and the occlusion
//!    source into the swapchain.
//! 4. Light markers: one small cube per light, depth-tested against the
//!    G-buffer depth.

use crate::renderer::core::pipeline::{
    PipelineSpec, create_render_pipeline, create_shader, texture_entry, uniform_entry,
};
use crate::renderer::core::{
    BindGroupKey, CachedBindGroup, DepthMode, GpuContext, ScopedPipeline, UniformBuffer,
};
use crate::renderer::frame::plan::OcclusionSource;
use crate::renderer::frame::scope::PassScope;
use crate::renderer::frame::state::ShadingPathState;
use crate::renderer::frame::uniforms::DeferredLightUniforms;
use crate::renderer::frame::{FrameLayouts, RecordContext, wgsl};
use crate::renderer::mesh::GpuMesh;
use crate::renderer::primitives::GpuPrimitive;
use crate::renderer::targets::{
    GBUFFER_ALBEDO_FORMAT, GBUFFER_NORMAL_FORMAT, GBUFFER_POSITION_FORMAT, RenderTargets,
    SSAO_FORMAT,
};
use crate::resources::ssao::SsaoUniforms;
use crate::scene::lights::PointLight;

/// Key tag of the neutral occlusion input.
const NEUTRAL_OCCLUSION: u64 = 0;

fn screen_texture_layout(
    device: &wgpu::Device,
    label: &str,
    count: u32,
) -> wgpu::BindGroupLayout {
    let entries: Vec<wgpu::BindGroupLayoutEntry> = (0..count)
        .map(|binding| texture_entry(binding, wgpu::TextureViewDimension::D2, false))
        .collect();
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

fn view_entries<'a>(views: &[&'a wgpu::TextureView]) -> Vec<wgpu::BindGroupEntry<'a>> {
    views
        .iter()
        .enumerate()
        .map(|(binding, view)| wgpu::BindGroupEntry {
            binding: binding as u32,
            resource: wgpu::BindingResource::TextureView(view),
        })
        .collect()
}

pub struct DeferredPasses {
    geometry: ScopedPipeline,
    ssao: ScopedPipeline,
    blur: ScopedPipeline,
    lighting: ScopedPipeline,
    markers: ScopedPipeline,

    ssao_layout: wgpu::BindGroupLayout,
    blur_layout: wgpu::BindGroupLayout,
    lighting_layout: wgpu::BindGroupLayout,

    ssao_params: UniformBuffer<SsaoUniforms>,
    lights: UniformBuffer<DeferredLightUniforms>,

    ssao_group: CachedBindGroup,
    blur_group: CachedBindGroup,
    lighting_group: CachedBindGroup,
}

impl DeferredPasses {
    #[must_use]
    pub fn new(
        ctx: &GpuContext,
        layouts: &FrameLayouts,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let device = &ctx.device;

        let ssao_layout = screen_texture_layout(device, "SSAO Input Layout", 3);
        let blur_layout = screen_texture_layout(device, "SSAO Blur Layout", 1);
        let lighting_layout = screen_texture_layout(device, "Deferred Lighting Input Layout", 4);
        let ssao_params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SSAO Params Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT, false)],
        });
        // Read by the lighting fragment shader and the marker vertex shader.
        let lights_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Deferred Lights Layout"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                false,
            )],
        });

        let geometry_shader = create_shader(
            device,
            "G-Buffer Shader",
            &[wgsl::VERTEX, wgsl::FRAME, include_str!("../shaders/gbuffer.wgsl")],
        );
        let geometry = create_render_pipeline(
            device,
            &PipelineSpec {
                label: "G-Buffer Pipeline",
                shader: &geometry_shader,
                bind_group_layouts: &[&layouts.frame, &layouts.albedo],
                color_formats: &[
                    GBUFFER_POSITION_FORMAT,
                    GBUFFER_NORMAL_FORMAT,
                    GBUFFER_ALBEDO_FORMAT,
                ],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth: DepthMode::Less,
                depth_format,
            },
        );

        let ssao_shader = create_shader(
            device,
            "SSAO Shader",
            &[
                wgsl::VERTEX,
                wgsl::FRAME,
                wgsl::SCREEN,
                include_str!("../shaders/ssao.wgsl"),
            ],
        );
        let ssao = create_render_pipeline(
            device,
            &PipelineSpec {
                label: "SSAO Pipeline",
                shader: &ssao_shader,
                bind_group_layouts: &[&layouts.frame, &ssao_layout, &ssao_params_layout],
                color_formats: &[SSAO_FORMAT],
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                depth: DepthMode::Disabled,
                depth_format,
            },
        );

        let blur_shader = create_shader(
            device,
            "SSAO Blur Shader",
            &[wgsl::VERTEX, wgsl::SCREEN, include_str!("../shaders/ssao_blur.wgsl")],
        );
        let blur = create_render_pipeline(
            device,
            &PipelineSpec {
                label: "SSAO Blur Pipeline",
                shader: &blur_shader,
                bind_group_layouts: &[&blur_layout],
                color_formats: &[SSAO_FORMAT],
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                depth: DepthMode::Disabled,
                depth_format,
            },
        );

        let lighting_shader = create_shader(
            device,
            "Deferred Lighting Shader",
            &[
                wgsl::VERTEX,
                wgsl::FRAME,
                wgsl::SCREEN,
                include_str!("../shaders/deferred_lighting.wgsl"),
            ],
        );
        let lighting = create_render_pipeline(
            device,
            &PipelineSpec {
                label: "Deferred Lighting Pipeline",
                shader: &lighting_shader,
                bind_group_layouts: &[&layouts.frame, &lighting_layout, &lights_layout],
                color_formats: &[color_format],
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                depth: DepthMode::Disabled,
                depth_format,
            },
        );

        let marker_shader = create_shader(
            device,
            "Light Marker Shader",
            &[wgsl::VERTEX, wgsl::FRAME, include_str!("../shaders/light_marker.wgsl")],
        );
        let markers = create_render_pipeline(
            device,
            &PipelineSpec {
                label: "Light Marker Pipeline",
                shader: &marker_shader,
                bind_group_layouts: &[&layouts.frame, &lights_layout],
                color_formats: &[color_format],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth: DepthMode::Less,
                depth_format,
            },
        );

        Self {
            geometry,
            ssao,
            blur,
            lighting,
            markers,
            ssao_layout,
            blur_layout,
            lighting_layout,
            ssao_params: UniformBuffer::new(device, "SSAO Params", &ssao_params_layout),
            lights: UniformBuffer::new(device, "Deferred Lights", &lights_layout),
            ssao_group: CachedBindGroup::new(),
            blur_group: CachedBindGroup::new(),
            lighting_group: CachedBindGroup::new(),
        }
    }

    /// Uploads the SSAO parameters and the light list for this frame.
    pub fn prepare(
        &mut self,
        queue: &wgpu::Queue,
        state: &ShadingPathState,
        lights: &[PointLight],
    ) {
        self.ssao_params.write(queue, &state.ssao().to_uniforms());
        self.lights.write(queue, &DeferredLightUniforms::new(lights));
    }

    /// Number of lights in the last uploaded block.
    #[must_use]
    pub fn light_count(&self) -> u32 {
        self.lights.current().map_or(0, |l| l.count)
    }

    pub fn record_geometry(
        &self,
        rc: &RecordContext<'_>,
        scope: &mut PassScope<'_>,
        mesh: Option<&GpuMesh>,
    ) {
        let Some(mesh) = mesh else {
            return;
        };
        scope.set_pipeline(&self.geometry);
        scope.set_bind_group(0, rc.frame_group);
        mesh.draw(scope, 1);
    }

    pub fn record_ssao(
        &mut self,
        rc: &RecordContext<'_>,
        scope: &mut PassScope<'_>,
        targets: &RenderTargets,
        quad: &GpuPrimitive,
    ) {
        let (Some(gbuffer), Some(noise)) = (targets.gbuffer(), targets.noise()) else {
            return;
        };
        let layout = &self.ssao_layout;
        let key = BindGroupKey::new("ssao")
            .with_resource(gbuffer.position.id())
            .with_resource(gbuffer.normal.id());
        let group = self.ssao_group.get_or_create(key, || {
            rc.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("SSAO Inputs"),
                layout,
                entries: &view_entries(&[
                    &gbuffer.position.view,
                    &gbuffer.normal.view,
                    &noise.view,
                ]),
            })
        });

        scope.set_pipeline(&self.ssao);
        scope.set_bind_group(0, rc.frame_group);
        scope.set_bind_group(1, group);
        scope.set_bind_group(2, self.ssao_params.bind_group());
        quad.draw(scope.raw());
    }

    pub fn record_blur(
        &mut self,
        rc: &RecordContext<'_>,
        scope: &mut PassScope<'_>,
        targets: &RenderTargets,
        quad: &GpuPrimitive,
    ) {
        let Some(ssao) = targets.ssao() else {
            return;
        };
        let layout = &self.blur_layout;
        let key = BindGroupKey::new("ssao_blur").with_resource(ssao.raw.id());
        let group = self.blur_group.get_or_create(key, || {
            rc.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("SSAO Blur Input"),
                layout,
                entries: &view_entries(&[&ssao.raw.view]),
            })
        });

        scope.set_pipeline(&self.blur);
        scope.set_bind_group(0, group);
        quad.draw(scope.raw());
    }

    /// Full-screen lighting. `occlusion` picks the blurred SSAO target or the
    /// neutral white texture.
    pub fn record_lighting(
        &mut self,
        rc: &RecordContext<'_>,
        scope: &mut PassScope<'_>,
        targets: &RenderTargets,
        occlusion: OcclusionSource,
        quad: &GpuPrimitive,
    ) {
        let Some(gbuffer) = targets.gbuffer() else {
            return;
        };
        let (occlusion_id, occlusion_view) = match (occlusion, targets.ssao()) {
            (OcclusionSource::Blurred, Some(ssao)) => (ssao.blurred.id(), &ssao.blurred.view),
            _ => (NEUTRAL_OCCLUSION, &targets.neutral_occlusion().view),
        };

        let layout = &self.lighting_layout;
        let key = BindGroupKey::new("deferred_lighting")
            .with_resource(gbuffer.position.id())
            .with_resource(gbuffer.normal.id())
            .with_resource(gbuffer.albedo.id())
            .with_resource(occlusion_id);
        let group = self.lighting_group.get_or_create(key, || {
            rc.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Deferred Lighting Inputs"),
                layout,
                entries: &view_entries(&[
                    &gbuffer.position.view,
                    &gbuffer.normal.view,
                    &gbuffer.albedo.view,
                    occlusion_view,
                ]),
            })
        });

        scope.set_pipeline(&self.lighting);
        scope.set_bind_group(0, rc.frame_group);
        scope.set_bind_group(1, group);
        scope.set_bind_group(2, self.lights.bind_group());
        quad.draw(scope.raw());
    }

    pub fn record_markers(
        &self,
        rc: &RecordContext<'_>,
        scope: &mut PassScope<'_>,
        unit_cube: &GpuPrimitive,
    ) {
        let count = self.light_count();
        if count == 0 {
            return;
        }
        scope.set_pipeline(&self.markers);
        scope.set_bind_group(0, rc.frame_group);
        scope.set_bind_group(1, self.lights.bind_group());
        unit_cube.draw_instanced(scope.raw(), count);
    }
}
