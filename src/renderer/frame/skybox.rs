//! Background cube pass.
//!
//! Draws the unit cube around the camera at maximum depth with `LessEqual`,
//! after the opaque pass of the same path. The forward path shows the LDR
//! skybox; the PBR path shows the HDR environment cube, tonemapped.

use crate::renderer::core::pipeline::{
    PipelineSpec, create_render_pipeline, create_shader, sampler_entry, texture_entry,
    uniform_entry,
};
use crate::renderer::core::{
    BindGroupKey, CachedBindGroup, DepthMode, GpuContext, ScopedPipeline, Tracked, UniformBuffer,
};
use crate::renderer::frame::scope::PassScope;
use crate::renderer::frame::uniforms::BackgroundUniforms;
use crate::renderer::frame::{FrameLayouts, RecordContext, wgsl};
use crate::renderer::precompute::cubemap::CubemapAsset;
use crate::renderer::primitives::GpuPrimitive;

/// Which cube the background shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Skybox,
    Environment,
}

pub struct BackgroundPass {
    pipeline: ScopedPipeline,
    cube_layout: wgpu::BindGroupLayout,
    skybox_params: UniformBuffer<BackgroundUniforms>,
    environment_params: UniformBuffer<BackgroundUniforms>,
    skybox_group: CachedBindGroup,
    environment_group: CachedBindGroup,
}

impl BackgroundPass {
    #[must_use]
    pub fn new(
        ctx: &GpuContext,
        layouts: &FrameLayouts,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let device = &ctx.device;
        let cube_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Background Cube Layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::Cube, true),
                sampler_entry(1),
            ],
        });
        let params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Background Params Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT, false)],
        });

        let shader = create_shader(
            device,
            "Background Shader",
            &[wgsl::VERTEX, wgsl::FRAME, include_str!("../shaders/skybox.wgsl")],
        );
        let pipeline = create_render_pipeline(
            device,
            &PipelineSpec {
                label: "Background Pipeline",
                shader: &shader,
                bind_group_layouts: &[&layouts.frame, &cube_layout, &params_layout],
                color_formats: &[color_format],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth: DepthMode::LessEqual,
                depth_format,
            },
        );

        let mut skybox_params = UniformBuffer::new(device, "Skybox Params", &params_layout);
        skybox_params.write(&ctx.queue, &BackgroundUniforms::SKYBOX);
        let mut environment_params =
            UniformBuffer::new(device, "Environment Background Params", &params_layout);
        environment_params.write(&ctx.queue, &BackgroundUniforms::ENVIRONMENT);

        Self {
            pipeline,
            cube_layout,
            skybox_params,
            environment_params,
            skybox_group: CachedBindGroup::new(),
            environment_group: CachedBindGroup::new(),
        }
    }

    /// Draws `cube` as the background of the current pass.
    pub fn record(
        &mut self,
        rc: &RecordContext<'_>,
        scope: &mut PassScope<'_>,
        cube: &Tracked<CubemapAsset>,
        background: Background,
        unit_cube: &GpuPrimitive,
    ) {
        let (cache, params, label) = match background {
            Background::Skybox => (
                &mut self.skybox_group,
                &self.skybox_params,
                "Skybox Cube Group",
            ),
            Background::Environment => (
                &mut self.environment_group,
                &self.environment_params,
                "Environment Cube Group",
            ),
        };
        let layout = &self.cube_layout;
        let group = cache.get_or_create(BindGroupKey::new(label).with_resource(cube.id()), || {
            rc.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&cube.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&rc.layouts.linear_sampler),
                    },
                ],
            })
        });

        scope.set_pipeline(&self.pipeline);
        scope.set_bind_group(0, rc.frame_group);
        scope.set_bind_group(1, group);
        scope.set_bind_group(2, params.bind_group());
        unit_cube.draw(scope.raw());
    }
}
