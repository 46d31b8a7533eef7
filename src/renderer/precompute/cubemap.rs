//! Cubemap assets and their face-size policy.

use crate::assets::image::PixelBuffer;
use crate::renderer::core::texture::{GpuTexture, HDR_FORMAT, cube_view};
use crate::renderer::core::{GpuContext, ResourceCategory, Tracked};

/// Face size of the captured environment cube.
pub const ENV_CUBE_SIZE: u32 = 512;
/// Face size of the diffuse irradiance cube.
pub const IRRADIANCE_SIZE: u32 = 32;
/// Face size of mip 0 of the specular prefiltered cube.
pub const PREFILTER_SIZE: u32 = 128;
/// Mip count of the specular prefiltered cube, independent of the source.
pub const PREFILTER_MIP_LEVELS: u32 = 5;

/// The four cubemap variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubemapKind {
    /// LDR six-face skybox, source resolution.
    Skybox,
    /// HDR environment converted from an equirectangular image, full mip chain.
    EnvironmentCapture,
    /// Cosine-convolved diffuse irradiance, single mip.
    Irradiance,
    /// GGX-prefiltered specular, one mip per roughness step.
    Prefiltered,
}

impl CubemapKind {
    /// Face size and mip count of a rendered variant.
    ///
    /// `Skybox` is never rendered; its size comes from the source faces.
    #[must_use]
    pub const fn render_policy(self) -> Option<(u32, u32)> {
        match self {
            Self::Skybox => None,
            Self::EnvironmentCapture => Some((ENV_CUBE_SIZE, full_mip_count(ENV_CUBE_SIZE))),
            Self::Irradiance => Some((IRRADIANCE_SIZE, 1)),
            Self::Prefiltered => Some((PREFILTER_SIZE, PREFILTER_MIP_LEVELS)),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Skybox => "Skybox Cube",
            Self::EnvironmentCapture => "Environment Cube",
            Self::Irradiance => "Irradiance Cube",
            Self::Prefiltered => "Prefiltered Cube",
        }
    }
}

/// Number of mips down to 1×1.
#[must_use]
pub const fn full_mip_count(size: u32) -> u32 {
    u32::BITS - size.leading_zeros()
}

/// Six-face cube texture with an optional mip chain.
#[derive(Debug)]
pub struct CubemapAsset {
    pub kind: CubemapKind,
    pub texture: wgpu::Texture,
    /// Cube view over every mip.
    pub view: wgpu::TextureView,
}

impl CubemapAsset {
    /// Allocates an HDR render-target cube sized by the variant's policy.
    #[must_use]
    pub fn render_target(ctx: &GpuContext, kind: CubemapKind) -> Option<Tracked<Self>> {
        let (size, mips) = kind.render_policy()?;
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(kind.label()),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 6,
            },
            mip_level_count: mips,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: HDR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = cube_view(&texture, kind.label());
        Some(ctx.track(Self { kind, texture, view }, ResourceCategory::Cubemap(kind)))
    }

    /// Uploads six LDR faces as a skybox.
    #[must_use]
    pub fn skybox(ctx: &GpuContext, faces: &[PixelBuffer; 6]) -> Tracked<Self> {
        let GpuTexture { texture, view } =
            GpuTexture::cube_from_faces(&ctx.device, &ctx.queue, "Skybox Cube", faces);
        ctx.track(
            Self {
                kind: CubemapKind::Skybox,
                texture,
                view,
            },
            ResourceCategory::Cubemap(CubemapKind::Skybox),
        )
    }

    #[inline]
    #[must_use]
    pub fn face_size(&self) -> u32 {
        self.texture.width()
    }

    #[inline]
    #[must_use]
    pub fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }
}
