//! Viewer Configuration
//!
//! [`ViewerConfig`] is the one on-disk format the viewer reads: a JSON file
//! listing the assets the viewer cycles through and the initial selections.
//! Every field has a default, so a partial file (or no file at all) works.
//! [`ViewerConfig::default`] uses only `builtin:` assets and needs no files.
//!
//! ```json
//! {
//!   "window": { "title": "Prism", "width": 1600, "height": 900 },
//!   "environments": ["assets/hdr/loft.hdr", "builtin:studio"],
//!   "initial": { "environment": 0 },
//!   "renderer": { "path": "deferred", "vsync": false }
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::assets::{AssetSource, MaterialPreset};
use crate::errors::{PrismError, Result};
use crate::renderer::RendererSettings;
use crate::renderer::frame::ShadingPath;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Prism Viewer".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Index into each preset list selected at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitialSelection {
    pub model: usize,
    pub skybox: usize,
    pub environment: usize,
    pub material: usize,
}

/// Optional overrides of [`RendererSettings`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererOverrides {
    pub path: Option<ShadingPath>,
    pub vsync: Option<bool>,
    /// Linear RGBA.
    pub clear_color: Option<[f64; 4]>,
    pub ssao_seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub models: Vec<AssetSource>,
    /// Directories holding `right/left/top/bottom/front/back` images.
    pub skyboxes: Vec<AssetSource>,
    /// Radiance HDR or OpenEXR files.
    pub environments: Vec<AssetSource>,
    pub materials: Vec<MaterialPreset>,
    pub initial: InitialSelection,
    pub renderer: RendererOverrides,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let builtin = AssetSource::builtin;
        Self {
            window: WindowConfig::default(),
            models: ["cube", "sphere", "torus", "pair"].map(builtin).to_vec(),
            skyboxes: ["sky", "dusk"].map(builtin).to_vec(),
            environments: ["sky", "studio"].map(builtin).to_vec(),
            materials: vec![
                MaterialPreset {
                    name: "checker".to_string(),
                    albedo: builtin("checker"),
                    normal: builtin("flat_normal"),
                    metallic: builtin("white"),
                    roughness: builtin("gradient"),
                    ao: builtin("white"),
                },
                MaterialPreset {
                    name: "brushed".to_string(),
                    albedo: builtin("brushed"),
                    normal: builtin("flat_normal"),
                    metallic: builtin("black"),
                    roughness: builtin("brushed"),
                    ao: builtin("white"),
                },
            ],
            initial: InitialSelection::default(),
            renderer: RendererOverrides::default(),
        }
    }
}

impl ViewerConfig {
    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PrismError::AssetNotFound(path.display().to_string()),
            _ => PrismError::IoError(e),
        })?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects empty preset lists, out-of-range initial indices, a zero-sized
    /// window and model files.
    ///
    /// Models are generated in-process, so only `builtin:` model sources load.
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(PrismError::Config(format!(
                "window size {}x{} is empty",
                self.window.width, self.window.height
            )));
        }
        if let Some(file) = self.models.iter().find(|m| matches!(m, AssetSource::File(_))) {
            return Err(PrismError::Config(format!(
                "model '{file}' is a file; models must be builtin sources"
            )));
        }
        check_selection("models", self.models.len(), self.initial.model)?;
        check_selection("skyboxes", self.skyboxes.len(), self.initial.skybox)?;
        check_selection("environments", self.environments.len(), self.initial.environment)?;
        check_selection("materials", self.materials.len(), self.initial.material)?;
        Ok(())
    }

    /// Default settings with the overrides of this file applied.
    #[must_use]
    pub fn renderer_settings(&self) -> RendererSettings {
        let mut settings = RendererSettings::default();
        let overrides = &self.renderer;
        if let Some(path) = overrides.path {
            settings.initial_path = path;
        }
        if let Some(vsync) = overrides.vsync {
            settings.vsync = vsync;
        }
        if let Some([r, g, b, a]) = overrides.clear_color {
            settings.clear_color = wgpu::Color { r, g, b, a };
        }
        if overrides.ssao_seed.is_some() {
            settings.ssao_seed = overrides.ssao_seed;
        }
        settings
    }
}

fn check_selection(list: &str, len: usize, index: usize) -> Result<()> {
    if len == 0 {
        return Err(PrismError::Config(format!("'{list}' must not be empty")));
    }
    if index >= len {
        return Err(PrismError::Config(format!(
            "initial {list} index {index} is out of range (0..{len})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.materials.len(), 2);
        assert!(
            config
                .models
                .iter()
                .all(|m| matches!(m, AssetSource::Builtin(_)))
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ViewerConfig::from_json(r#"{ "renderer": { "path": "forward" } }"#).unwrap();
        assert_eq!(config.window, WindowConfig::default());
        assert_eq!(config.renderer_settings().initial_path, ShadingPath::Forward);
    }
}
