//! Geometry Primitive Cache
//!
//! Lazily uploads the builtin primitives and hands out the same buffers for the
//! rest of the process. The cache lives in the renderer (one per device), so
//! there is no global state and no teardown API: buffers go away with the
//! renderer.

use wgpu::util::DeviceExt;

use crate::renderer::core::{GpuContext, ResourceCategory, Tracked};
use crate::resources::geometry::{Geometry, Vertex};
use crate::resources::primitives::PrimitiveKind;

/// Immutable vertex/index buffer pair of one primitive.
#[derive(Debug)]
pub struct GpuPrimitive {
    pub kind: PrimitiveKind,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub topology: wgpu::PrimitiveTopology,
}

impl GpuPrimitive {
    /// Uploads `geometry` once.
    #[must_use]
    pub fn upload(device: &wgpu::Device, kind: PrimitiveKind, geometry: &Geometry) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertices", kind.label())),
            contents: bytemuck::cast_slice::<Vertex, u8>(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", kind.label())),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            kind,
            vertex_buffer,
            index_buffer,
            index_count: geometry.index_count(),
            topology: geometry.topology,
        }
    }

    /// Binds both buffers at slot 0 and issues one indexed draw.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.draw_instanced(pass, 1);
    }

    /// Same as [`draw`](Self::draw) with `instances` instances.
    pub fn draw_instanced(&self, pass: &mut wgpu::RenderPass<'_>, instances: u32) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..instances);
    }
}

/// One lazily-filled slot per [`PrimitiveKind`].
///
/// Generic over the cached value so the caching contract can be exercised
/// without a device.
#[derive(Debug)]
pub struct PrimitiveCache<P = Tracked<GpuPrimitive>> {
    slots: [Option<P>; PrimitiveKind::ALL.len()],
}

impl<P> Default for PrimitiveCache<P> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl<P> PrimitiveCache<P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `kind`, running `build` only on the first request.
    pub fn get_or_insert_with(
        &mut self,
        kind: PrimitiveKind,
        build: impl FnOnce(PrimitiveKind) -> P,
    ) -> &P {
        self.slots[kind.index()].get_or_insert_with(|| build(kind))
    }

    /// The cached value, if `kind` was built already.
    #[inline]
    #[must_use]
    pub fn cached(&self, kind: PrimitiveKind) -> Option<&P> {
        self.slots[kind.index()].as_ref()
    }

    #[must_use]
    pub fn is_built(&self, kind: PrimitiveKind) -> bool {
        self.slots[kind.index()].is_some()
    }
}

impl PrimitiveCache<Tracked<GpuPrimitive>> {
    /// Builds and uploads `kind` on first use; later calls return the cached handle.
    pub fn get(&mut self, ctx: &GpuContext, kind: PrimitiveKind) -> &Tracked<GpuPrimitive> {
        self.get_or_insert_with(kind, |kind| {
            log::debug!("Uploading primitive {}", kind.label());
            let geometry = kind.build();
            ctx.track(
                GpuPrimitive::upload(&ctx.device, kind, &geometry),
                ResourceCategory::PrimitiveBuffer,
            )
        })
    }

    /// Makes sure every kind in `kinds` is uploaded.
    pub fn ensure(&mut self, ctx: &GpuContext, kinds: impl IntoIterator<Item = PrimitiveKind>) {
        for kind in kinds {
            self.get(ctx, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn second_request_does_not_rebuild() {
        let builds = Cell::new(0);
        let mut cache: PrimitiveCache<u32> = PrimitiveCache::new();

        for _ in 0..5 {
            let value = *cache.get_or_insert_with(PrimitiveKind::Sphere, |_| {
                builds.set(builds.get() + 1);
                7
            });
            assert_eq!(value, 7);
        }

        assert_eq!(builds.get(), 1);
        assert!(cache.is_built(PrimitiveKind::Sphere));
        assert!(cache.cached(PrimitiveKind::Quad).is_none());
    }
}
