//! Texture creation and upload helpers.

use half::f16;

use crate::assets::image::{HdrImage, PixelBuffer};

/// Color format of decoded albedo images and LDR skybox faces.
pub const LDR_SRGB_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
/// Color format of non-color data maps (normal, metallic, roughness, ao).
pub const LDR_LINEAR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
/// Filterable float format used for HDR sources and environment cubes.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// A texture together with its default view.
#[derive(Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    /// Uploads an RGBA8 image into a single-mip 2D texture of `format`.
    #[must_use]
    pub fn from_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        pixels: &PixelBuffer,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = create_2d(device, label, pixels.width, pixels.height, format, 1);
        write_layer(queue, &texture, 0, pixels.width, pixels.height, &pixels.data, 4);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// A 1×1 texture of a single color.
    #[must_use]
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        rgba: [u8; 4],
        format: wgpu::TextureFormat,
    ) -> Self {
        Self::from_pixels(device, queue, label, &PixelBuffer::solid(1, 1, rgba), format)
    }

    /// Uploads an HDR image as `Rgba16Float` (filterable on every backend).
    #[must_use]
    pub fn from_hdr(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &HdrImage,
    ) -> Self {
        let texture = create_2d(device, label, image.width, image.height, HDR_FORMAT, 1);
        let bytes = to_f16_bytes(&image.data);
        write_layer(queue, &texture, 0, image.width, image.height, &bytes, 8);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Uploads six square RGBA8 faces (+X, −X, +Y, −Y, +Z, −Z) into a cube texture.
    #[must_use]
    pub fn cube_from_faces(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        faces: &[PixelBuffer; 6],
    ) -> Self {
        let size = faces[0].width;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LDR_SRGB_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        for (layer, face) in faces.iter().enumerate() {
            write_layer(queue, &texture, layer as u32, size, size, &face.data, 4);
        }
        let view = cube_view(&texture, "Skybox Cube View");
        Self { texture, view }
    }
}

/// Packs `f32` texels as little-endian `f16`.
#[must_use]
pub fn to_f16_bytes(data: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(data.len() * 2);
    for &v in data {
        bytes.extend_from_slice(&f16::from_f32(v).to_le_bytes());
    }
    bytes
}

/// Creates a sampled 2D texture that can be written and read back.
#[must_use]
pub fn create_2d(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    mip_level_count: u32,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

/// Writes one array layer of mip 0.
pub fn write_layer(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    layer: u32,
    width: u32,
    height: u32,
    data: &[u8],
    bytes_per_pixel: u32,
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * bytes_per_pixel),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// Full cube view over all mips of a 6-layer texture.
#[must_use]
pub fn cube_view(texture: &wgpu::Texture, label: &str) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    })
}

/// Single-face, single-mip 2D view used as a render attachment.
#[must_use]
pub fn face_view(texture: &wgpu::Texture, layer: u32, mip: u32) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Cube Face View"),
        format: None,
        dimension: Some(wgpu::TextureViewDimension::D2),
        aspect: wgpu::TextureAspect::All,
        base_mip_level: mip,
        mip_level_count: Some(1),
        base_array_layer: layer,
        array_layer_count: Some(1),
        usage: Some(wgpu::TextureUsages::RENDER_ATTACHMENT),
    })
}

/// Cube view over the single mip `mip`, sampled while the next mip is rendered.
///
/// All six layers stay in the view: backends without per-layer sampled views
/// (GLES) can still bind it.
#[must_use]
pub fn cube_level_view(texture: &wgpu::Texture, mip: u32) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Cube Level View"),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        base_mip_level: mip,
        mip_level_count: Some(1),
        usage: Some(wgpu::TextureUsages::TEXTURE_BINDING),
        ..Default::default()
    })
}
