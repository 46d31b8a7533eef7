//! The five-texture material bound by the PBR path.

use crate::assets::material::{DecodedMaterial, MaterialChannel};
use crate::renderer::core::pipeline::{sampler_entry, texture_entry};
use crate::renderer::core::texture::{LDR_LINEAR_FORMAT, LDR_SRGB_FORMAT};
use crate::renderer::core::{GpuContext, GpuTexture, ResourceCategory, Tracked};

/// Binding of the shared sampler, after the five maps.
pub const MATERIAL_SAMPLER_BINDING: u32 = 5;

/// Layout: albedo, normal, metallic, roughness, ao at bindings 0–4, sampler at 5.
#[must_use]
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let mut entries: Vec<wgpu::BindGroupLayoutEntry> = (0..MaterialChannel::ALL.len() as u32)
        .map(|binding| texture_entry(binding, wgpu::TextureViewDimension::D2, true))
        .collect();
    entries.push(sampler_entry(MATERIAL_SAMPLER_BINDING));
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("PBR Material Layout"),
        entries: &entries,
    })
}

/// Uploaded maps of one material, bound as a unit.
#[derive(Debug)]
pub struct MaterialTextureSet {
    pub name: String,
    pub textures: [Tracked<GpuTexture>; 5],
    pub bind_group: wgpu::BindGroup,
    /// Channels bound to their neutral default.
    pub fallbacks: Vec<MaterialChannel>,
}

impl MaterialTextureSet {
    #[must_use]
    pub fn upload(
        ctx: &GpuContext,
        decoded: DecodedMaterial,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let textures = MaterialChannel::ALL.map(|channel| {
            let format = if channel.is_color() {
                LDR_SRGB_FORMAT
            } else {
                LDR_LINEAR_FORMAT
            };
            let pixels = &decoded.maps[channel as usize];
            let label = format!("{} {}", decoded.name, channel.label());
            ctx.track(
                GpuTexture::from_pixels(&ctx.device, &ctx.queue, &label, pixels, format),
                ResourceCategory::MaterialTexture,
            )
        });

        let mut entries: Vec<wgpu::BindGroupEntry<'_>> = textures
            .iter()
            .enumerate()
            .map(|(binding, texture)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: MATERIAL_SAMPLER_BINDING,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Material", decoded.name)),
            layout,
            entries: &entries,
        });

        log::debug!(
            "Material '{}' uploaded ({} neutral maps)",
            decoded.name,
            decoded.fallbacks.len()
        );

        Self {
            name: decoded.name,
            textures,
            bind_group,
            fallbacks: decoded.fallbacks,
        }
    }
}
