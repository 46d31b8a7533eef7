//! Synchronous GPU → CPU texture readback.
//!
//! Copies one layer/mip of a texture into a mappable buffer, waits for the map
//! and converts the texels to `f32`. Blocks the calling thread; meant for tests
//! and diagnostics, never for the frame loop.

use half::f16;

use crate::errors::{PrismError, Result};
use crate::renderer::core::GpuContext;

/// Texel layout as far as readback is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TexelKind {
    /// `channels` little-endian `f16` values.
    Half { channels: u32 },
    /// Four normalised `u8` values.
    Unorm8,
    /// One `f32` value.
    Float32,
}

impl TexelKind {
    fn of(format: wgpu::TextureFormat) -> Option<Self> {
        use wgpu::TextureFormat as F;
        match format {
            F::Rgba16Float => Some(Self::Half { channels: 4 }),
            F::Rg16Float => Some(Self::Half { channels: 2 }),
            F::R16Float => Some(Self::Half { channels: 1 }),
            F::Rgba8Unorm | F::Rgba8UnormSrgb | F::Bgra8Unorm | F::Bgra8UnormSrgb => {
                Some(Self::Unorm8)
            }
            F::Depth32Float | F::R32Float => Some(Self::Float32),
            _ => None,
        }
    }

    fn bytes_per_texel(self) -> u32 {
        match self {
            Self::Half { channels } => channels * 2,
            Self::Unorm8 | Self::Float32 => 4,
        }
    }

    fn decode(self, row: &[u8], out: &mut Vec<f32>) {
        match self {
            Self::Half { .. } => out.extend(
                row.chunks_exact(2)
                    .map(|b| f16::from_le_bytes([b[0], b[1]]).to_f32()),
            ),
            Self::Unorm8 => out.extend(row.iter().map(|&b| f32::from(b) / 255.0)),
            Self::Float32 => out.extend(
                row.chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            ),
        }
    }
}

/// Reads mip `mip` of array layer `layer` back as `f32` channel values.
///
/// The texture needs `COPY_SRC` usage.
pub fn read_texture(
    ctx: &GpuContext,
    texture: &wgpu::Texture,
    layer: u32,
    mip: u32,
) -> Result<Vec<f32>> {
    let kind = TexelKind::of(texture.format()).ok_or_else(|| {
        PrismError::Readback(format!("unsupported format {:?}", texture.format()))
    })?;
    if mip >= texture.mip_level_count() || layer >= texture.depth_or_array_layers() {
        return Err(PrismError::Readback(format!(
            "layer {layer} mip {mip} out of range"
        )));
    }

    let width = (texture.width() >> mip).max(1);
    let height = (texture.height() >> mip).max(1);
    let row_bytes = width * kind.bytes_per_texel();
    let padded_row_bytes = row_bytes.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

    let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: u64::from(padded_row_bytes) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
    let aspect = if texture.format().is_depth_stencil_format() {
        wgpu::TextureAspect::DepthOnly
    } else {
        wgpu::TextureAspect::All
    };
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: mip,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row_bytes),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    ctx.queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = flume::bounded(1);
    slice.map_async(wgpu::MapMode::Read, move |result| {
        // The receiver outlives the poll below.
        let _ = tx.send(result);
    });
    ctx.device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| PrismError::Readback(e.to_string()))?;
    rx.recv()
        .map_err(|e| PrismError::Readback(e.to_string()))?
        .map_err(|e| PrismError::Readback(e.to_string()))?;

    let mut values = Vec::with_capacity((width * height * 4) as usize);
    {
        let mapped = slice.get_mapped_range();
        for row in mapped.chunks_exact(padded_row_bytes as usize) {
            kind.decode(&row[..row_bytes as usize], &mut values);
        }
    }
    buffer.unmap();
    Ok(values)
}
