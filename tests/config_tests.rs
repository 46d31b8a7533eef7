//! Viewer Configuration Tests
//!
//! Tests for:
//! - JSON parsing with defaults for omitted sections
//! - Validation of preset lists, initial selections and model sources
//! - Renderer overrides
//! - Loading from disk

use std::path::PathBuf;

use prism::assets::AssetSource;
use prism::config::ViewerConfig;
use prism::errors::PrismError;
use prism::renderer::frame::ShadingPath;

#[test]
fn empty_document_equals_defaults() {
    let config = ViewerConfig::from_json("{}").unwrap();
    let default = ViewerConfig::default();
    assert_eq!(config.models, default.models);
    assert_eq!(config.environments, default.environments);
    assert_eq!(config.window.title, "Prism Viewer");
}

#[test]
fn asset_lists_accept_files_and_builtins() {
    let config = ViewerConfig::from_json(
        r#"{
            "environments": ["assets/hdr/loft.hdr", "builtin:studio"],
            "initial": { "environment": 1 }
        }"#,
    )
    .unwrap();

    assert_eq!(
        config.environments,
        [
            AssetSource::File(PathBuf::from("assets/hdr/loft.hdr")),
            AssetSource::builtin("studio"),
        ]
    );
    assert_eq!(config.initial.environment, 1);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = ViewerConfig::from_json(r#"{ "windw": { "width": 10 } }"#).unwrap_err();
    assert!(matches!(err, PrismError::JsonError(_)));
}

#[test]
fn out_of_range_selection_is_a_config_error() {
    let err = ViewerConfig::from_json(r#"{ "initial": { "skybox": 5 } }"#).unwrap_err();
    assert!(matches!(err, PrismError::Config(_)));
}

#[test]
fn empty_preset_list_is_a_config_error() {
    let err = ViewerConfig::from_json(r#"{ "models": [] }"#).unwrap_err();
    assert!(matches!(err, PrismError::Config(_)));
}

#[test]
fn model_files_are_a_config_error() {
    let err = ViewerConfig::from_json(r#"{ "models": ["builtin:cube", "models/bunny.obj"] }"#)
        .unwrap_err();
    let PrismError::Config(message) = err else {
        panic!("expected a config error, got {err:?}");
    };
    assert!(message.contains("models/bunny.obj"), "{message}");

    let config = ViewerConfig::from_json(r#"{ "models": ["builtin:pair"] }"#).unwrap();
    assert_eq!(config.models, [AssetSource::builtin("pair")]);
}

#[test]
fn zero_window_is_a_config_error() {
    let err =
        ViewerConfig::from_json(r#"{ "window": { "width": 0, "height": 600 } }"#).unwrap_err();
    assert!(matches!(err, PrismError::Config(_)));
}

#[test]
fn renderer_overrides_apply_on_top_of_defaults() {
    let config = ViewerConfig::from_json(
        r#"{
            "renderer": {
                "path": "deferred",
                "vsync": false,
                "clear_color": [0.0, 0.0, 0.0, 1.0],
                "ssao_seed": 1234
            }
        }"#,
    )
    .unwrap();

    let settings = config.renderer_settings();
    assert_eq!(settings.initial_path, ShadingPath::Deferred);
    assert!(!settings.vsync);
    assert_eq!(settings.clear_color, wgpu::Color::BLACK);
    assert_eq!(settings.ssao_seed, Some(1234));
    assert_eq!(settings.effective_ssao_seed(), 1234);
}

#[test]
fn load_reads_file_from_disk() {
    let path = std::env::temp_dir().join(format!("prism-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "renderer": { "path": "pbr" } }"#).unwrap();

    let config = ViewerConfig::load(&path);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.unwrap().renderer_settings().initial_path, ShadingPath::Pbr);
}

#[test]
fn missing_file_is_asset_not_found() {
    let err = ViewerConfig::load("/nonexistent/prism/viewer.json").unwrap_err();
    assert!(matches!(err, PrismError::AssetNotFound(_)));
}
