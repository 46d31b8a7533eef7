//! Render-Target Manager
//!
//! Owns every off-screen attachment the frame paths draw into: the scene depth
//! buffer of the forward and PBR paths, the G-buffer, the two SSAO targets plus
//! their rotation noise, and the depth attachment used while capturing cubemap
//! faces.
//!
//! # Allocation discipline
//!
//! Every `init_*` call validates the requested extent against the device limits
//! *before* creating anything. A request that cannot produce a complete target
//! set is reported as [`PrismError::IncompleteTarget`] and leaves the previous
//! targets in place, so the frame loop keeps drawing into complete targets.
//!
//! | Role           | Format         | Sized to          |
//! |----------------|----------------|-------------------|
//! | `Position`     | `Rgba16Float`  | viewport          |
//! | `Normal`       | `Rgba16Float`  | viewport          |
//! | `Albedo`       | `Rgba8Unorm`   | viewport          |
//! | `Depth`        | depth format   | viewport          |
//! | `SceneDepth`   | depth format   | viewport          |
//! | `SsaoRaw`      | `R16Float`     | viewport          |
//! | `SsaoBlurred`  | `R16Float`     | viewport          |
//! | `CaptureDepth` | depth format   | capture face size |

use crate::errors::{PrismError, Result};
use crate::renderer::core::texture::{GpuTexture, to_f16_bytes, write_layer};
use crate::renderer::core::{GpuContext, ResourceCategory, Tracked};
use crate::resources::ssao::{NOISE_DIM, generate_ssao_noise};

pub const GBUFFER_POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const GBUFFER_NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const GBUFFER_ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const SSAO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R16Float;
pub const NOISE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Semantic role of an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetRole {
    Position,
    Normal,
    Albedo,
    Depth,
    SceneDepth,
    SsaoRaw,
    SsaoBlurred,
    CaptureDepth,
}

impl TargetRole {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Position => "G-Buffer Position",
            Self::Normal => "G-Buffer Normal",
            Self::Albedo => "G-Buffer Albedo",
            Self::Depth => "G-Buffer Depth",
            Self::SceneDepth => "Scene Depth",
            Self::SsaoRaw => "SSAO Raw",
            Self::SsaoBlurred => "SSAO Blurred",
            Self::CaptureDepth => "Capture Depth",
        }
    }
}

/// One attachment texture and its full view.
#[derive(Debug)]
pub struct RenderTarget {
    pub role: TargetRole,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl RenderTarget {
    fn create(
        ctx: &GpuContext,
        role: TargetRole,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Tracked<Self> {
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(role.label()),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        ctx.track(
            Self {
                role,
                texture,
                view,
            },
            ResourceCategory::RenderTarget,
        )
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

/// Position, normal, albedo and depth of the deferred geometry pass.
#[derive(Debug)]
pub struct GeometryBuffer {
    pub position: Tracked<RenderTarget>,
    pub normal: Tracked<RenderTarget>,
    pub albedo: Tracked<RenderTarget>,
    pub depth: Tracked<RenderTarget>,
}

/// Raw and blurred occlusion.
#[derive(Debug)]
pub struct SsaoTargets {
    pub raw: Tracked<RenderTarget>,
    pub blurred: Tracked<RenderTarget>,
}

/// Checks that an attachment of `width × height` can be complete on this device.
pub fn validate_extent(ctx: &GpuContext, role: TargetRole, width: u32, height: u32) -> Result<()> {
    let max = ctx.max_texture_dimension();
    let reason = if width == 0 || height == 0 {
        Some("zero-sized attachment".to_string())
    } else if width > max || height > max {
        Some(format!("exceeds device limit of {max}"))
    } else {
        None
    };

    match reason {
        Some(reason) => {
            let err = PrismError::IncompleteTarget {
                role,
                width,
                height,
                reason,
            };
            log::error!("{err}");
            Err(err)
        }
        None => Ok(()),
    }
}

/// Owner of all off-screen attachments.
pub struct RenderTargets {
    width: u32,
    height: u32,
    depth_format: wgpu::TextureFormat,
    noise_seed: u64,

    scene_depth: Option<Tracked<RenderTarget>>,
    gbuffer: Option<GeometryBuffer>,
    ssao: Option<SsaoTargets>,
    noise: Option<Tracked<GpuTexture>>,
    neutral_occlusion: Tracked<GpuTexture>,
    capture_depth: Option<Tracked<RenderTarget>>,
}

impl RenderTargets {
    /// Allocates every viewport-sized target at `width × height`.
    pub fn new(
        ctx: &GpuContext,
        width: u32,
        height: u32,
        depth_format: wgpu::TextureFormat,
        noise_seed: u64,
    ) -> Result<Self> {
        let neutral_occlusion = ctx.track(
            GpuTexture::solid(
                &ctx.device,
                &ctx.queue,
                "Neutral Occlusion",
                [255, 255, 255, 255],
                wgpu::TextureFormat::Rgba8Unorm,
            ),
            ResourceCategory::DefaultTexture,
        );

        let mut targets = Self {
            width: 0,
            height: 0,
            depth_format,
            noise_seed,
            scene_depth: None,
            gbuffer: None,
            ssao: None,
            noise: None,
            neutral_occlusion,
            capture_depth: None,
        };
        targets.allocate(ctx, width, height)?;
        Ok(targets)
    }

    fn allocate(&mut self, ctx: &GpuContext, width: u32, height: u32) -> Result<()> {
        validate_extent(ctx, TargetRole::SceneDepth, width, height)?;
        self.init_geometry_buffer(ctx, width, height)?;
        self.init_ssao_targets(ctx, width, height)?;
        self.scene_depth = None;
        self.scene_depth = Some(RenderTarget::create(
            ctx,
            TargetRole::SceneDepth,
            width,
            height,
            self.depth_format,
        ));
        self.width = width;
        self.height = height;
        log::info!("Render targets allocated at {width}x{height}");
        Ok(())
    }

    /// Allocates the G-buffer: position, normal, albedo and depth.
    ///
    /// On failure the previous G-buffer (if any) stays in place.
    pub fn init_geometry_buffer(
        &mut self,
        ctx: &GpuContext,
        width: u32,
        height: u32,
    ) -> Result<()> {
        for role in [
            TargetRole::Position,
            TargetRole::Normal,
            TargetRole::Albedo,
            TargetRole::Depth,
        ] {
            validate_extent(ctx, role, width, height)?;
        }

        // Release before re-creating.
        self.gbuffer = None;
        self.gbuffer = Some(GeometryBuffer {
            position: RenderTarget::create(
                ctx,
                TargetRole::Position,
                width,
                height,
                GBUFFER_POSITION_FORMAT,
            ),
            normal: RenderTarget::create(
                ctx,
                TargetRole::Normal,
                width,
                height,
                GBUFFER_NORMAL_FORMAT,
            ),
            albedo: RenderTarget::create(
                ctx,
                TargetRole::Albedo,
                width,
                height,
                GBUFFER_ALBEDO_FORMAT,
            ),
            depth: RenderTarget::create(ctx, TargetRole::Depth, width, height, self.depth_format),
        });
        log::debug!("G-buffer allocated at {width}x{height}");
        Ok(())
    }

    /// Allocates the raw and blurred occlusion targets, and the rotation noise
    /// on first use.
    pub fn init_ssao_targets(&mut self, ctx: &GpuContext, width: u32, height: u32) -> Result<()> {
        validate_extent(ctx, TargetRole::SsaoRaw, width, height)?;
        validate_extent(ctx, TargetRole::SsaoBlurred, width, height)?;

        self.ssao = None;
        self.ssao = Some(SsaoTargets {
            raw: RenderTarget::create(ctx, TargetRole::SsaoRaw, width, height, SSAO_FORMAT),
            blurred: RenderTarget::create(ctx, TargetRole::SsaoBlurred, width, height, SSAO_FORMAT),
        });

        if self.noise.is_none() {
            self.noise = Some(create_noise_texture(ctx, self.noise_seed));
        }
        log::debug!("SSAO targets allocated at {width}x{height}");
        Ok(())
    }

    /// Destroys and recreates every viewport-sized target.
    ///
    /// Returns `Ok(true)` when targets were reallocated. Zero sizes (minimised
    /// window) and unchanged sizes are no-ops.
    pub fn resize(&mut self, ctx: &GpuContext, width: u32, height: u32) -> Result<bool> {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {width}x{height}");
            return Ok(false);
        }
        if (width, height) == (self.width, self.height) {
            return Ok(false);
        }
        self.allocate(ctx, width, height)?;
        Ok(true)
    }

    /// The capture depth attachment at `size × size`, resized if needed.
    pub fn capture_depth(&mut self, ctx: &GpuContext, size: u32) -> Result<&wgpu::TextureView> {
        let current = self.capture_depth.as_ref().map(|t| t.size());
        if current != Some((size, size)) {
            validate_extent(ctx, TargetRole::CaptureDepth, size, size)?;
            self.capture_depth = None;
            self.capture_depth = Some(RenderTarget::create(
                ctx,
                TargetRole::CaptureDepth,
                size,
                size,
                self.depth_format,
            ));
        }
        self.capture_depth
            .as_ref()
            .map(|t| &t.view)
            .ok_or_else(|| PrismError::IncompleteTarget {
                role: TargetRole::CaptureDepth,
                width: size,
                height: size,
                reason: "capture depth missing".to_string(),
            })
    }

    /// Drops the capture attachment once precompute is done.
    pub fn release_capture_depth(&mut self) {
        self.capture_depth = None;
    }

    // === Accessors ===

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    #[must_use]
    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.depth_format
    }

    /// True when every viewport-sized target exists.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.scene_depth.is_some() && self.gbuffer.is_some() && self.ssao.is_some()
    }

    #[must_use]
    pub fn scene_depth(&self) -> Option<&RenderTarget> {
        self.scene_depth.as_deref()
    }

    #[must_use]
    pub fn gbuffer(&self) -> Option<&GeometryBuffer> {
        self.gbuffer.as_ref()
    }

    #[must_use]
    pub fn ssao(&self) -> Option<&SsaoTargets> {
        self.ssao.as_ref()
    }

    #[must_use]
    pub fn noise(&self) -> Option<&GpuTexture> {
        self.noise.as_deref()
    }

    /// 1×1 white occlusion fed to the lighting pass when SSAO is off.
    #[must_use]
    pub fn neutral_occlusion(&self) -> &GpuTexture {
        &self.neutral_occlusion
    }

    #[must_use]
    pub fn noise_seed(&self) -> u64 {
        self.noise_seed
    }
}

fn create_noise_texture(ctx: &GpuContext, seed: u64) -> Tracked<GpuTexture> {
    let texels: Vec<f32> = generate_ssao_noise(seed).into_iter().flatten().collect();
    let texture = crate::renderer::core::texture::create_2d(
        &ctx.device,
        "SSAO Noise",
        NOISE_DIM,
        NOISE_DIM,
        NOISE_FORMAT,
        1,
    );
    write_layer(
        &ctx.queue,
        &texture,
        0,
        NOISE_DIM,
        NOISE_DIM,
        &to_f16_bytes(&texels),
        8,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    ctx.track(GpuTexture { texture, view }, ResourceCategory::NoiseTexture)
}
