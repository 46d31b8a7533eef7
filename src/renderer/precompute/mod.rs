//! Precompute Pipeline
//!
//! Turns one equirectangular HDR image into the four resources of image-based
//! lighting:
//!
//! ```text
//! HDR (2D) ──► environment cube 512² + mips ──┬─► irradiance cube 32²
//!                                             └─► prefiltered cube 128², 5 mips
//! (no input) ──────────────────────────────────► BRDF LUT 512² (Rg16Float)
//! ```
//!
//! Each cube stage renders the unit cube six times through the fixed
//! [`CaptureBasis`], once per face, into a face view of the destination cube.
//! The environment's mip chain is filled the same way: each level is captured
//! from a cube view of the level above it.
//! Stages are submitted one by one; the whole run is synchronous and stalls the
//! frame that triggers it.
//!
//! [`EnvironmentMaps`] owns the resulting set and is the only place a set is
//! replaced: decode and size-check first, release the old set, then
//! regenerate all four.

pub mod capture;
pub mod cubemap;

use crate::assets::AssetSource;
use crate::assets::image::{HdrImage, load_hdr_source};
use crate::errors::{PrismError, Result};
use crate::renderer::core::pipeline::{
    PipelineSpec, ScopedPipeline, create_render_pipeline, create_shader, linear_sampler,
    sampler_entry, texture_entry, uniform_entry,
};
use crate::renderer::core::texture::{GpuTexture, cube_level_view, face_view};
use crate::renderer::core::{DepthMode, GpuContext, ResourceCategory, Slot, Tracked};
use crate::renderer::primitives::{GpuPrimitive, PrimitiveCache};
use crate::renderer::targets::{RenderTargets, TargetRole, validate_extent};
use crate::resources::primitives::PrimitiveKind;

use capture::{
    CAPTURE_SLOT_COUNT, CAPTURE_SLOT_STRIDE, CaptureBasis, CaptureUniforms, basis_slot,
    prefilter_schedule, prefilter_slot,
};
use cubemap::{CubemapAsset, CubemapKind, ENV_CUBE_SIZE, PREFILTER_MIP_LEVELS};

/// Format of the BRDF integration table.
pub const BRDF_LUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg16Float;
/// Edge length of the BRDF integration table.
pub const BRDF_LUT_SIZE: u32 = 512;

const CUBE_FORMAT: wgpu::TextureFormat = crate::renderer::core::texture::HDR_FORMAT;

/// The four derived resources of one environment.
#[derive(Debug)]
pub struct EnvironmentSet {
    pub source: AssetSource,
    pub environment: Tracked<CubemapAsset>,
    pub irradiance: Tracked<CubemapAsset>,
    pub prefiltered: Tracked<CubemapAsset>,
    pub brdf_lut: Tracked<GpuTexture>,
}

impl EnvironmentSet {
    /// Highest mip of the prefiltered cube, the shader's roughness = 1 lod.
    #[must_use]
    pub fn max_reflection_lod(&self) -> f32 {
        (self.prefiltered.mip_level_count() - 1) as f32
    }
}

/// GPU state of the precompute stages.
pub struct PrecomputePipeline {
    basis: CaptureBasis,
    capture_group: wgpu::BindGroup,

    source_2d_layout: wgpu::BindGroupLayout,
    source_cube_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    equirect: ScopedPipeline,
    irradiance: ScopedPipeline,
    prefilter: ScopedPipeline,
    brdf_lut: ScopedPipeline,
    downsample: ScopedPipeline,
}

impl PrecomputePipeline {
    #[must_use]
    pub fn new(ctx: &GpuContext, depth_format: wgpu::TextureFormat) -> Self {
        let device = &ctx.device;
        let basis = CaptureBasis::new();

        let capture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Capture Uniform Layout"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                true,
            )],
        });
        let source_2d_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Capture Source Layout (2D)"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::D2, true),
                sampler_entry(1),
            ],
        });
        let source_cube_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Capture Source Layout (Cube)"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::Cube, true),
                sampler_entry(1),
            ],
        });

        // Every slot is constant: write them once.
        let capture_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Uniforms"),
            size: u64::from(CAPTURE_SLOT_COUNT) * CAPTURE_SLOT_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let write_slot = |slot: u32, uniforms: CaptureUniforms| {
            ctx.queue.write_buffer(
                &capture_buffer,
                u64::from(slot) * CAPTURE_SLOT_STRIDE,
                bytemuck::bytes_of(&uniforms),
            );
        };
        for face in 0..6 {
            let view_projection = basis.view_projection(face);
            write_slot(
                basis_slot(face),
                CaptureUniforms {
                    view_projection,
                    roughness: 0.0,
                    source_resolution: ENV_CUBE_SIZE as f32,
                    _pad: [0.0; 2],
                },
            );
            for step in prefilter_schedule() {
                write_slot(
                    prefilter_slot(step.mip, face),
                    CaptureUniforms {
                        view_projection,
                        roughness: step.roughness,
                        source_resolution: ENV_CUBE_SIZE as f32,
                        _pad: [0.0; 2],
                    },
                );
            }
        }

        let capture_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Capture Uniform Group"),
            layout: &capture_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &capture_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<CaptureUniforms>() as u64),
                }),
            }],
        });

        let common = include_str!("../shaders/capture_common.wgsl");
        let ggx = include_str!("../shaders/ggx_sampling.wgsl");

        let capture_pipeline =
            |label: &str, shader: &wgpu::ShaderModule, source: &wgpu::BindGroupLayout| {
                create_render_pipeline(
                    device,
                    &PipelineSpec {
                        label,
                        shader,
                        bind_group_layouts: &[&capture_layout, source],
                        color_formats: &[CUBE_FORMAT],
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        depth: DepthMode::Less,
                        depth_format,
                    },
                )
            };

        let equirect = capture_pipeline(
            "Equirect To Cube Pipeline",
            &create_shader(
                device,
                "Equirect To Cube Shader",
                &[common, include_str!("../shaders/equirect_to_cube.wgsl")],
            ),
            &source_2d_layout,
        );
        let irradiance = capture_pipeline(
            "Irradiance Pipeline",
            &create_shader(
                device,
                "Irradiance Shader",
                &[common, include_str!("../shaders/irradiance.wgsl")],
            ),
            &source_cube_layout,
        );
        let prefilter = capture_pipeline(
            "Prefilter Pipeline",
            &create_shader(
                device,
                "Prefilter Shader",
                &[common, ggx, include_str!("../shaders/prefilter.wgsl")],
            ),
            &source_cube_layout,
        );

        let brdf_shader = create_shader(
            device,
            "BRDF LUT Shader",
            &[ggx, include_str!("../shaders/brdf_lut.wgsl")],
        );
        let brdf_lut = create_render_pipeline(
            device,
            &PipelineSpec {
                label: "BRDF LUT Pipeline",
                shader: &brdf_shader,
                bind_group_layouts: &[],
                color_formats: &[BRDF_LUT_FORMAT],
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                depth: DepthMode::Disabled,
                depth_format,
            },
        );

        let downsample = capture_pipeline(
            "Cube Downsample Pipeline",
            &create_shader(
                device,
                "Cube Downsample Shader",
                &[common, include_str!("../shaders/cube_downsample.wgsl")],
            ),
            &source_cube_layout,
        );

        Self {
            basis,
            capture_group,
            source_2d_layout,
            source_cube_layout,
            sampler: linear_sampler(device, "Capture Sampler"),
            equirect,
            irradiance,
            prefilter,
            brdf_lut,
            downsample,
        }
    }

    #[must_use]
    pub fn basis(&self) -> &CaptureBasis {
        &self.basis
    }

    fn source_group(
        &self,
        ctx: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Capture Source Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Renders the cube six times into `mip` of `destination`, one face each.
    #[allow(clippy::too_many_arguments)]
    fn capture_faces(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipeline: &ScopedPipeline,
        source_group: &wgpu::BindGroup,
        cube: &GpuPrimitive,
        destination: &wgpu::Texture,
        depth_view: &wgpu::TextureView,
        mip: u32,
        slot_of: impl Fn(usize) -> u32,
    ) {
        for face in 0..6 {
            let target = face_view(destination, face as u32, mip);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Cube Capture Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&pipeline.pipeline);
            let offset = slot_of(face) * CAPTURE_SLOT_STRIDE as u32;
            pass.set_bind_group(0, &self.capture_group, &[offset]);
            pass.set_bind_group(1, source_group, &[]);
            cube.draw(&mut pass);
        }
    }

    fn allocate_cube(ctx: &GpuContext, kind: CubemapKind) -> Result<Tracked<CubemapAsset>> {
        CubemapAsset::render_target(ctx, kind).ok_or_else(|| PrismError::InvalidParameter {
            name: "cubemap.kind",
            reason: format!("{kind:?} is not a render target"),
        })
    }

    /// Stage 1: equirectangular HDR → 512² environment cube with a full mip chain.
    pub fn convert_equirect(
        &self,
        ctx: &GpuContext,
        targets: &mut RenderTargets,
        cube: &GpuPrimitive,
        hdr: &HdrImage,
    ) -> Result<Tracked<CubemapAsset>> {
        let environment = Self::allocate_cube(ctx, CubemapKind::EnvironmentCapture)?;
        let source = GpuTexture::from_hdr(&ctx.device, &ctx.queue, "Equirect Source", hdr);
        let source_group = self.source_group(ctx, &self.source_2d_layout, &source.view);
        let depth_view = targets.capture_depth(ctx, environment.face_size())?;

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Equirect To Cube"),
            });
        self.capture_faces(
            &mut encoder,
            &self.equirect,
            &source_group,
            cube,
            &environment.texture,
            depth_view,
            0,
            basis_slot,
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));

        self.fill_mip_chain(ctx, targets, cube, &environment)?;
        Ok(environment)
    }

    /// Captures mips `1..n` of `environment`, each from the level above it.
    fn fill_mip_chain(
        &self,
        ctx: &GpuContext,
        targets: &mut RenderTargets,
        cube: &GpuPrimitive,
        environment: &CubemapAsset,
    ) -> Result<()> {
        let size = environment.face_size();
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Environment Mip Chain"),
            });
        for mip in 1..environment.mip_level_count() {
            let previous = cube_level_view(&environment.texture, mip - 1);
            let source_group = self.source_group(ctx, &self.source_cube_layout, &previous);
            let depth_view = targets.capture_depth(ctx, (size >> mip).max(1))?;
            self.capture_faces(
                &mut encoder,
                &self.downsample,
                &source_group,
                cube,
                &environment.texture,
                depth_view,
                mip,
                basis_slot,
            );
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Stage 2: cosine-weighted convolution into a 32² irradiance cube.
    pub fn convolve_irradiance(
        &self,
        ctx: &GpuContext,
        targets: &mut RenderTargets,
        cube: &GpuPrimitive,
        environment: &CubemapAsset,
    ) -> Result<Tracked<CubemapAsset>> {
        let irradiance = Self::allocate_cube(ctx, CubemapKind::Irradiance)?;
        let source_group = self.source_group(ctx, &self.source_cube_layout, &environment.view);
        let depth_view = targets.capture_depth(ctx, irradiance.face_size())?;

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Irradiance Convolution"),
            });
        self.capture_faces(
            &mut encoder,
            &self.irradiance,
            &source_group,
            cube,
            &irradiance.texture,
            depth_view,
            0,
            basis_slot,
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));
        Ok(irradiance)
    }

    /// Stage 3: GGX prefilter, one roughness per mip (128² down to 8²).
    pub fn prefilter_specular(
        &self,
        ctx: &GpuContext,
        targets: &mut RenderTargets,
        cube: &GpuPrimitive,
        environment: &CubemapAsset,
    ) -> Result<Tracked<CubemapAsset>> {
        let prefiltered = Self::allocate_cube(ctx, CubemapKind::Prefiltered)?;
        debug_assert_eq!(prefiltered.mip_level_count(), PREFILTER_MIP_LEVELS);
        let source_group = self.source_group(ctx, &self.source_cube_layout, &environment.view);

        for step in prefilter_schedule() {
            let depth_view = targets.capture_depth(ctx, step.size)?;
            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Specular Prefilter"),
                });
            self.capture_faces(
                &mut encoder,
                &self.prefilter,
                &source_group,
                cube,
                &prefiltered.texture,
                depth_view,
                step.mip,
                |face| prefilter_slot(step.mip, face),
            );
            ctx.queue.submit(std::iter::once(encoder.finish()));
        }
        Ok(prefiltered)
    }

    /// Stage 4: split-sum BRDF table over (NdotV, roughness).
    #[must_use]
    pub fn bake_brdf_lut(&self, ctx: &GpuContext, quad: &GpuPrimitive) -> Tracked<GpuTexture> {
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("BRDF LUT"),
            size: wgpu::Extent3d {
                width: BRDF_LUT_SIZE,
                height: BRDF_LUT_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: BRDF_LUT_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("BRDF LUT"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("BRDF LUT Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.brdf_lut.pipeline);
            quad.draw(&mut pass);
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));

        ctx.track(GpuTexture { texture, view }, ResourceCategory::BrdfLut)
    }

    /// Runs all four stages on a decoded image.
    pub fn run(
        &self,
        ctx: &GpuContext,
        targets: &mut RenderTargets,
        primitives: &mut PrimitiveCache,
        source: AssetSource,
        hdr: &HdrImage,
    ) -> Result<EnvironmentSet> {
        primitives.ensure(ctx, [PrimitiveKind::Cube, PrimitiveKind::Quad]);
        let (Some(cube), Some(quad)) = (
            primitives.cached(PrimitiveKind::Cube),
            primitives.cached(PrimitiveKind::Quad),
        ) else {
            return Err(PrismError::InvalidParameter {
                name: "primitives",
                reason: "capture primitives missing".to_string(),
            });
        };

        let environment = self.convert_equirect(ctx, targets, cube, hdr)?;
        let irradiance = self.convolve_irradiance(ctx, targets, cube, &environment)?;
        let prefiltered = self.prefilter_specular(ctx, targets, cube, &environment)?;
        let brdf_lut = self.bake_brdf_lut(ctx, quad);
        targets.release_capture_depth();

        Ok(EnvironmentSet {
            source,
            environment,
            irradiance,
            prefiltered,
            brdf_lut,
        })
    }
}

/// Slot of the active environment set.
#[derive(Default)]
pub struct EnvironmentMaps {
    current: Slot<EnvironmentSet>,
}

impl EnvironmentMaps {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<&EnvironmentSet> {
        self.current.get()
    }

    /// Replaces the active environment with one derived from `source`.
    ///
    /// Pre: `source` decodes as HDR and fits in a device texture, otherwise the
    /// current set stays bound and the error is returned. Post: the old set is released and exactly
    /// one new set of {environment, irradiance, prefiltered, BRDF LUT} is live.
    pub fn rebuild(
        &mut self,
        ctx: &GpuContext,
        pipeline: &PrecomputePipeline,
        targets: &mut RenderTargets,
        primitives: &mut PrimitiveCache,
        source: &AssetSource,
    ) -> Result<&EnvironmentSet> {
        log::info!("Rebuilding environment from {source}");
        let started = std::time::Instant::now();

        let set = self.current.swap(
            || {
                let hdr = load_hdr_source(source)?;
                check_source_extent(ctx, &hdr)?;
                validate_extent(ctx, TargetRole::CaptureDepth, ENV_CUBE_SIZE, ENV_CUBE_SIZE)?;
                Ok(hdr)
            },
            |hdr| pipeline.run(ctx, targets, primitives, source.clone(), &hdr),
        );

        match set {
            Ok(set) => {
                log::info!(
                    "Environment {} ready in {:.1} ms",
                    set.source,
                    started.elapsed().as_secs_f64() * 1000.0
                );
                Ok(set)
            }
            Err(err) => {
                log::error!("Environment rebuild from {source} failed: {err}");
                Err(err)
            }
        }
    }
}

/// The equirect image is uploaded as one texture, so it must fit the device.
fn check_source_extent(ctx: &GpuContext, hdr: &HdrImage) -> Result<()> {
    let max = ctx.max_texture_dimension();
    if hdr.width > max || hdr.height > max {
        return Err(PrismError::InvalidParameter {
            name: "environment.source",
            reason: format!(
                "{}x{} exceeds device texture limit of {max}",
                hdr.width, hdr.height
            ),
        });
    }
    Ok(())
}
