//! Image decoding into raw pixel buffers.
//!
//! Decoding is delegated to the `image` crate. LDR images are always expanded to
//! RGBA8 and HDR images to RGBA32F so the renderer deals with exactly two texel
//! layouts.

use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::assets::AssetSource;
use crate::assets::procedural;
use crate::errors::{PrismError, Result};

/// Decoded 8-bit RGBA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 texels, row-major, top row first.
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// A `width × height` image filled with a single color.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

/// Decoded high dynamic range image.
#[derive(Debug, Clone, PartialEq)]
pub struct HdrImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA32F texels, row-major, top row first.
    pub data: Vec<f32>,
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PrismError::AssetNotFound(path.display().to_string()))
    }
}

/// Decodes an 8-bit image file (PNG, JPEG, ...).
pub fn load_ldr(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    ensure_exists(path)?;

    let rgba = image::open(path)?.into_rgba8();
    Ok(PixelBuffer {
        width: rgba.width(),
        height: rgba.height(),
        data: rgba.into_raw(),
    })
}

/// Decodes a high dynamic range image (Radiance HDR or OpenEXR).
///
/// The format is sniffed from the file contents, not the extension; anything
/// else is reported as [`PrismError::NotHdr`].
pub fn load_hdr(path: impl AsRef<Path>) -> Result<HdrImage> {
    let path = path.as_ref();
    ensure_exists(path)?;

    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    match reader.format() {
        Some(ImageFormat::Hdr | ImageFormat::OpenExr) => {}
        _ => return Err(PrismError::NotHdr(path.display().to_string())),
    }

    let rgba = reader.decode()?.into_rgba32f();
    Ok(HdrImage {
        width: rgba.width(),
        height: rgba.height(),
        data: rgba.into_raw(),
    })
}

/// Loads an LDR image from either a file or a builtin generator.
pub fn load_ldr_source(source: &AssetSource) -> Result<PixelBuffer> {
    match source {
        AssetSource::File(path) => load_ldr(path),
        AssetSource::Builtin(name) => procedural::texture(name)
            .ok_or_else(|| PrismError::AssetNotFound(source.to_string())),
    }
}

/// Loads an HDR environment from either a file or a builtin generator.
pub fn load_hdr_source(source: &AssetSource) -> Result<HdrImage> {
    match source {
        AssetSource::File(path) => load_hdr(path),
        AssetSource::Builtin(name) => procedural::environment(name)
            .ok_or_else(|| PrismError::AssetNotFound(source.to_string())),
    }
}

/// Face file stems in cubemap layer order: +X, −X, +Y, −Y, +Z, −Z.
pub const CUBE_FACE_NAMES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

const FACE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn find_face(dir: &Path, stem: &str) -> Result<PathBuf> {
    FACE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
        .ok_or_else(|| PrismError::AssetNotFound(dir.join(stem).display().to_string()))
}

/// Loads the six faces of a skybox.
///
/// Any missing or undecodable face fails the whole set. All faces must be square
/// and share one size.
pub fn load_cube_faces(source: &AssetSource) -> Result<[PixelBuffer; 6]> {
    let faces: [PixelBuffer; 6] = match source {
        AssetSource::Builtin(name) => procedural::skybox_faces(name)
            .ok_or_else(|| PrismError::AssetNotFound(source.to_string()))?,
        AssetSource::File(dir) => {
            let mut faces = Vec::with_capacity(6);
            for stem in CUBE_FACE_NAMES {
                faces.push(load_ldr(find_face(dir, stem)?)?);
            }
            faces
                .try_into()
                .map_err(|_| PrismError::ImageDecodeError("expected six cube faces".into()))?
        }
    };

    let size = faces[0].width;
    if let Some(bad) = faces.iter().position(|f| !f.is_square() || f.width != size) {
        return Err(PrismError::ImageDecodeError(format!(
            "cube face '{}' of {source} is {}x{}, expected {size}x{size}",
            CUBE_FACE_NAMES[bad], faces[bad].width, faces[bad].height
        )));
    }
    Ok(faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let err = load_hdr("does/not/exist.hdr").unwrap_err();
        assert!(matches!(err, PrismError::AssetNotFound(_)));
    }

    #[test]
    fn ldr_file_is_not_hdr() {
        let dir = std::env::temp_dir().join(format!("prism-not-hdr-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fake.hdr");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let err = load_hdr(&path).unwrap_err();
        assert!(matches!(err, PrismError::NotHdr(_)), "got {err:?}");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_skybox_face_fails_whole_set() {
        let dir = std::env::temp_dir().join(format!("prism-faces-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for stem in &CUBE_FACE_NAMES[..5] {
            image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]))
                .save(dir.join(format!("{stem}.png")))
                .unwrap();
        }

        let err = load_cube_faces(&AssetSource::File(dir.clone())).unwrap_err();
        assert!(matches!(err, PrismError::AssetNotFound(ref p) if p.contains("back")));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn solid_buffer_has_rgba_layout() {
        let buf = PixelBuffer::solid(2, 3, [1, 2, 3, 4]);
        assert_eq!(buf.data.len(), 24);
        assert_eq!(&buf.data[20..], &[1, 2, 3, 4]);
    }
}
