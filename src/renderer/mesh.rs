//! GPU side of the active model.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::assets::image::PixelBuffer;
use crate::assets::mesh::MeshData;
use crate::renderer::core::texture::LDR_SRGB_FORMAT;
use crate::renderer::core::{GpuContext, GpuTexture, ResourceCategory, Tracked};
use crate::renderer::frame::scope::PassScope;

const WHITE: [u8; 4] = [255, 255, 255, 255];

/// One index range with its albedo bind group.
#[derive(Debug)]
pub struct GpuSubMesh {
    pub index_range: Range<u32>,
    pub albedo: Tracked<GpuTexture>,
    pub bind_group: wgpu::BindGroup,
}

/// Vertex/index buffers of a loaded mesh plus one albedo binding per submesh.
#[derive(Debug)]
pub struct GpuMesh {
    pub name: String,
    pub vertex_buffer: Tracked<wgpu::Buffer>,
    pub index_buffer: Tracked<wgpu::Buffer>,
    pub submeshes: Vec<GpuSubMesh>,
}

impl GpuMesh {
    /// Uploads `mesh`. `layout` is the albedo layout shared by the forward and
    /// geometry pipelines: texture at binding 0, sampler at binding 1.
    #[must_use]
    pub fn upload(
        ctx: &GpuContext,
        mesh: &MeshData,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let vertex_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertices", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let submeshes = mesh
            .submeshes
            .iter()
            .enumerate()
            .map(|(i, sub)| {
                let label = format!("{} Albedo {i}", mesh.name);
                let texture = match &sub.albedo {
                    Some(pixels) => GpuTexture::from_pixels(
                        &ctx.device,
                        &ctx.queue,
                        &label,
                        pixels,
                        LDR_SRGB_FORMAT,
                    ),
                    None => GpuTexture::from_pixels(
                        &ctx.device,
                        &ctx.queue,
                        &label,
                        &PixelBuffer::solid(1, 1, WHITE),
                        LDR_SRGB_FORMAT,
                    ),
                };
                let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&label),
                    layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&texture.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(sampler),
                        },
                    ],
                });
                GpuSubMesh {
                    index_range: sub.index_range.clone(),
                    albedo: ctx.track(texture, ResourceCategory::MeshTexture),
                    bind_group,
                }
            })
            .collect();

        log::debug!(
            "Uploaded mesh '{}' ({} vertices, {} submeshes)",
            mesh.name,
            mesh.geometry.vertices.len(),
            mesh.submeshes.len()
        );

        Self {
            name: mesh.name.clone(),
            vertex_buffer: ctx.track(vertex_buffer, ResourceCategory::MeshBuffer),
            index_buffer: ctx.track(index_buffer, ResourceCategory::MeshBuffer),
            submeshes,
        }
    }

    /// Draws every submesh, binding its albedo group at `albedo_group`.
    pub fn draw(&self, pass: &mut PassScope<'_>, albedo_group: u32) {
        pass.raw().set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.raw()
            .set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        for sub in &self.submeshes {
            pass.set_bind_group(albedo_group, &sub.bind_group);
            pass.raw().draw_indexed(sub.index_range.clone(), 0, 0..1);
        }
    }

    /// Draws the geometry only; the caller binds whatever material it needs.
    pub fn draw_untextured(&self, pass: &mut PassScope<'_>) {
        pass.raw().set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.raw()
            .set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        for sub in &self.submeshes {
            pass.raw().draw_indexed(sub.index_range.clone(), 0, 0..1);
        }
    }
}
