//! Asset sources and CPU-side decoding.
//!
//! Everything here produces plain CPU data ([`PixelBuffer`], [`HdrImage`],
//! [`MeshData`]); GPU upload happens in the renderer. Paths are opaque strings
//! taken from configuration: `builtin:<name>` selects a procedural asset, any
//! other string is a file path.

pub mod image;
pub mod material;
pub mod mesh;
pub mod procedural;

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

pub use image::{HdrImage, PixelBuffer, load_cube_faces, load_hdr, load_ldr};
pub use material::{MaterialChannel, MaterialPreset};
pub use mesh::{MeshData, MeshLoader, ProceduralMeshLoader, SubMesh};

const BUILTIN_PREFIX: &str = "builtin:";

/// Where an asset comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum AssetSource {
    /// A generated asset, addressed by name.
    Builtin(String),
    /// A file on disk.
    File(PathBuf),
}

impl AssetSource {
    #[must_use]
    pub fn builtin(name: &str) -> Self {
        Self::Builtin(name.to_string())
    }
}

impl From<String> for AssetSource {
    fn from(value: String) -> Self {
        match value.strip_prefix(BUILTIN_PREFIX) {
            Some(name) => Self::Builtin(name.to_string()),
            None => Self::File(PathBuf::from(value)),
        }
    }
}

impl From<&str> for AssetSource {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(name) => write!(f, "{BUILTIN_PREFIX}{name}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_prefix_is_parsed() {
        assert_eq!(
            AssetSource::from("builtin:sky"),
            AssetSource::Builtin("sky".into())
        );
        assert_eq!(
            AssetSource::from("assets/hdr/loft.hdr"),
            AssetSource::File(PathBuf::from("assets/hdr/loft.hdr"))
        );
        assert_eq!(AssetSource::builtin("studio").to_string(), "builtin:studio");
    }
}
