//! Resource Rebind Controller Tests
//!
//! GPU-backed; every test returns early when no adapter is available.
//!
//! Tests for:
//! - Model, skybox and material swaps leave exactly one live set
//! - Failed swaps keep the previous occupant bound
//! - Staged environment swaps run only when acknowledged

use prism::assets::{AssetSource, MaterialPreset, ProceduralMeshLoader};
use prism::config::ViewerConfig;
use prism::errors::PrismError;
use prism::renderer::core::{GpuContext, ResourceCategory};
use prism::renderer::precompute::cubemap::CubemapKind;
use prism::renderer::{Renderer, RendererSettings};

const COLOR: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn setup() -> Option<(GpuContext, Renderer)> {
    let settings = RendererSettings {
        ssao_seed: Some(7),
        ..RendererSettings::default()
    };
    let ctx = pollster::block_on(GpuContext::headless(&settings)).ok()?;
    let renderer = Renderer::new(&ctx, settings, COLOR, 32, 32).ok()?;
    Some((ctx, renderer))
}

fn builtin_material(index: usize) -> MaterialPreset {
    ViewerConfig::default().materials[index].clone()
}

// ============================================================================
// Model
// ============================================================================

#[test]
fn model_swap_releases_previous_mesh() {
    let Some((ctx, mut renderer)) = setup() else { return };
    let loader = ProceduralMeshLoader;

    renderer
        .request_model(&ctx, &loader, &AssetSource::builtin("cube"))
        .unwrap();
    renderer
        .request_model(&ctx, &loader, &AssetSource::builtin("pair"))
        .unwrap();

    let model = renderer.rebind().model().unwrap();
    assert_eq!(model.name, "pair");
    assert_eq!(ctx.ledger.live(ResourceCategory::MeshBuffer), 2);
    assert_eq!(
        ctx.ledger.live(ResourceCategory::MeshTexture),
        model.submeshes.len()
    );
}

#[test]
fn failed_model_swap_keeps_current_model() {
    let Some((ctx, mut renderer)) = setup() else { return };
    let loader = ProceduralMeshLoader;
    renderer
        .request_model(&ctx, &loader, &AssetSource::builtin("torus"))
        .unwrap();

    let err = renderer
        .request_model(&ctx, &loader, &AssetSource::from("models/missing.obj"))
        .unwrap_err();
    assert!(matches!(err, PrismError::AssetNotFound(_)));

    assert_eq!(renderer.rebind().model().unwrap().name, "torus");
    assert_eq!(ctx.ledger.live(ResourceCategory::MeshBuffer), 2);
}

// ============================================================================
// Skybox
// ============================================================================

#[test]
fn skybox_swap_keeps_one_cube() {
    let Some((ctx, mut renderer)) = setup() else { return };
    renderer
        .request_skybox(&ctx, &AssetSource::builtin("sky"))
        .unwrap();
    renderer
        .request_skybox(&ctx, &AssetSource::builtin("dusk"))
        .unwrap();

    let skybox = ResourceCategory::Cubemap(CubemapKind::Skybox);
    assert_eq!(ctx.ledger.live(skybox), 1);
    assert_eq!(ctx.ledger.allocations(skybox), 2);
}

#[test]
fn missing_skybox_faces_keep_current_skybox() {
    let Some((ctx, mut renderer)) = setup() else { return };
    renderer
        .request_skybox(&ctx, &AssetSource::builtin("sky"))
        .unwrap();
    let id = renderer.rebind().skybox().unwrap().id();

    assert!(
        renderer
            .request_skybox(&ctx, &AssetSource::from("/nonexistent/skybox"))
            .is_err()
    );
    assert_eq!(renderer.rebind().skybox().unwrap().id(), id);
}

// ============================================================================
// Material
// ============================================================================

#[test]
fn material_swap_keeps_five_textures() {
    let Some((ctx, mut renderer)) = setup() else { return };
    renderer.request_material(&ctx, &builtin_material(0)).unwrap();
    renderer.request_material(&ctx, &builtin_material(1)).unwrap();

    let material = renderer.rebind().material().unwrap();
    assert_eq!(material.name, "brushed");
    assert!(material.fallbacks.is_empty());
    assert_eq!(ctx.ledger.live(ResourceCategory::MaterialTexture), 5);
}

#[test]
fn missing_material_maps_fall_back_to_defaults() {
    let Some((ctx, mut renderer)) = setup() else { return };
    let mut preset = builtin_material(0);
    preset.normal = AssetSource::from("/nonexistent/normal.png");
    preset.ao = AssetSource::builtin("no-such-texture");

    renderer.request_material(&ctx, &preset).unwrap();

    let material = renderer.rebind().material().unwrap();
    assert_eq!(material.fallbacks.len(), 2);
    assert_eq!(ctx.ledger.live(ResourceCategory::MaterialTexture), 5);
}

// ============================================================================
// Environment
// ============================================================================

#[test]
fn environment_swap_waits_for_acknowledgement() {
    let Some((ctx, mut renderer)) = setup() else { return };
    renderer
        .load_environment(&ctx, &AssetSource::builtin("sky"))
        .unwrap();

    renderer.request_environment(AssetSource::builtin("studio"));
    assert_eq!(
        renderer.rebind().pending_environment(),
        Some(&AssetSource::builtin("studio"))
    );
    // Still the old one until acknowledged.
    assert_eq!(
        renderer.rebind().environment().unwrap().source,
        AssetSource::builtin("sky")
    );

    assert!(renderer.acknowledge_environment_swap(&ctx).unwrap());
    assert!(renderer.rebind().pending_environment().is_none());
    assert_eq!(
        renderer.rebind().environment().unwrap().source,
        AssetSource::builtin("studio")
    );
    assert_eq!(ctx.ledger.live(ResourceCategory::BrdfLut), 1);

    // Nothing staged: no-op.
    assert!(!renderer.acknowledge_environment_swap(&ctx).unwrap());
}

#[test]
fn later_request_replaces_staged_one() {
    let Some((ctx, mut renderer)) = setup() else { return };
    renderer.request_environment(AssetSource::builtin("sky"));
    renderer.request_environment(AssetSource::builtin("studio"));

    assert!(renderer.acknowledge_environment_swap(&ctx).unwrap());
    assert_eq!(
        renderer.rebind().environment().unwrap().source,
        AssetSource::builtin("studio")
    );
    assert_eq!(
        ctx.ledger
            .allocations(ResourceCategory::Cubemap(CubemapKind::Irradiance)),
        1
    );
}

#[test]
fn failed_environment_swap_consumes_request() {
    let Some((ctx, mut renderer)) = setup() else { return };
    renderer
        .load_environment(&ctx, &AssetSource::builtin("sky"))
        .unwrap();

    renderer.request_environment(AssetSource::builtin("missing"));
    assert!(renderer.acknowledge_environment_swap(&ctx).is_err());
    assert!(renderer.rebind().pending_environment().is_none());
    assert_eq!(
        renderer.rebind().environment().unwrap().source,
        AssetSource::builtin("sky")
    );
}
