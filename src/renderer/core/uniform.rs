//! Typed uniform buffers.
//!
//! A [`UniformBuffer<T>`] owns one GPU buffer holding a single `T`, the bind
//! group exposing it at binding 0, and a CPU copy of the last value written.
//! Writing an unchanged value is skipped.

use bytemuck::Pod;

#[derive(Debug)]
pub struct UniformBuffer<T: Pod + PartialEq> {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    last: Option<T>,
}

impl<T: Pod + PartialEq> UniformBuffer<T> {
    /// Allocates the buffer and binds it at binding 0 of `layout`.
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &str, layout: &wgpu::BindGroupLayout) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<T>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            buffer,
            bind_group,
            last: None,
        }
    }

    /// Uploads `value` unless it equals the last uploaded one.
    pub fn write(&mut self, queue: &wgpu::Queue, value: &T) {
        if self.last.as_ref() == Some(value) {
            return;
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
        self.last = Some(*value);
    }

    #[inline]
    #[must_use]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.last.as_ref()
    }
}
