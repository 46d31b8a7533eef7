//! PBR material presets and their CPU-side decoding.

use serde::Deserialize;

use crate::assets::AssetSource;
use crate::assets::image::{PixelBuffer, load_ldr_source};

/// The five maps of a PBR material, in binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialChannel {
    Albedo,
    Normal,
    Metallic,
    Roughness,
    AmbientOcclusion,
}

impl MaterialChannel {
    pub const ALL: [Self; 5] = [
        Self::Albedo,
        Self::Normal,
        Self::Metallic,
        Self::Roughness,
        Self::AmbientOcclusion,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Albedo => "albedo",
            Self::Normal => "normal",
            Self::Metallic => "metallic",
            Self::Roughness => "roughness",
            Self::AmbientOcclusion => "ao",
        }
    }

    /// Texel bound when the map is missing or fails to decode.
    #[must_use]
    pub const fn neutral(self) -> [u8; 4] {
        match self {
            Self::Normal => [128, 128, 255, 255],
            _ => [255, 255, 255, 255],
        }
    }

    /// Only albedo holds color; the other maps are linear data.
    #[must_use]
    pub const fn is_color(self) -> bool {
        matches!(self, Self::Albedo)
    }
}

/// Sources of the five maps of one material.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MaterialPreset {
    pub name: String,
    pub albedo: AssetSource,
    pub normal: AssetSource,
    pub metallic: AssetSource,
    pub roughness: AssetSource,
    pub ao: AssetSource,
}

impl MaterialPreset {
    #[must_use]
    pub fn source(&self, channel: MaterialChannel) -> &AssetSource {
        match channel {
            MaterialChannel::Albedo => &self.albedo,
            MaterialChannel::Normal => &self.normal,
            MaterialChannel::Metallic => &self.metallic,
            MaterialChannel::Roughness => &self.roughness,
            MaterialChannel::AmbientOcclusion => &self.ao,
        }
    }
}

/// Five decoded maps, with the channels that fell back to their neutral texel.
#[derive(Debug, Clone)]
pub struct DecodedMaterial {
    pub name: String,
    pub maps: [PixelBuffer; 5],
    pub fallbacks: Vec<MaterialChannel>,
}

/// Decodes every map independently. A map that cannot be loaded is replaced
/// by a 1×1 texture of [`MaterialChannel::neutral`].
#[must_use]
pub fn decode_material(preset: &MaterialPreset) -> DecodedMaterial {
    let mut fallbacks = Vec::new();
    let maps = MaterialChannel::ALL.map(|channel| {
        let source = preset.source(channel);
        match load_ldr_source(source) {
            Ok(pixels) => pixels,
            Err(err) => {
                log::warn!(
                    "Material '{}': {} map {source} unavailable ({err}), using neutral default",
                    preset.name,
                    channel.label()
                );
                fallbacks.push(channel);
                PixelBuffer::solid(1, 1, channel.neutral())
            }
        }
    });
    DecodedMaterial {
        name: preset.name.clone(),
        maps,
        fallbacks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(normal: &str) -> MaterialPreset {
        MaterialPreset {
            name: "test".into(),
            albedo: "builtin:checker".into(),
            normal: normal.into(),
            metallic: "builtin:white".into(),
            roughness: "builtin:brushed".into(),
            ao: "missing/ao.png".into(),
        }
    }

    #[test]
    fn missing_maps_fall_back_to_neutral() {
        let decoded = decode_material(&preset("builtin:nope"));
        assert_eq!(
            decoded.fallbacks,
            vec![MaterialChannel::Normal, MaterialChannel::AmbientOcclusion]
        );
        assert_eq!(decoded.maps[1].data, vec![128, 128, 255, 255]);
        assert_eq!(decoded.maps[4].data, vec![255, 255, 255, 255]);
        assert_eq!(decoded.maps[0].width, 64);
    }
}
