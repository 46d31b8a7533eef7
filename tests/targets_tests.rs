//! Render-Target Manager Tests
//!
//! GPU-backed; every test returns early when no adapter is available.
//!
//! Tests for:
//! - Allocation of the G-buffer, SSAO targets and scene depth
//! - Resize: destroy-then-recreate, zero and unchanged sizes ignored
//! - Incomplete targets rejected without touching the current set
//! - Rotation noise upload and seed stability

use prism::errors::PrismError;
use prism::renderer::RendererSettings;
use prism::renderer::core::readback::read_texture;
use prism::renderer::core::{GpuContext, ResourceCategory};
use prism::renderer::targets::{
    GBUFFER_ALBEDO_FORMAT, GBUFFER_POSITION_FORMAT, RenderTargets, SSAO_FORMAT, TargetRole,
};

const DEPTH: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Scene depth + four G-buffer attachments + raw and blurred SSAO.
const VIEWPORT_TARGETS: usize = 7;

fn gpu() -> Option<GpuContext> {
    pollster::block_on(GpuContext::headless(&RendererSettings::default())).ok()
}

#[test]
fn new_allocates_every_viewport_target() {
    let Some(ctx) = gpu() else { return };
    let targets = RenderTargets::new(&ctx, 64, 48, DEPTH, 1).unwrap();

    assert!(targets.is_complete());
    assert_eq!(targets.size(), (64, 48));
    assert_eq!(ctx.ledger.live(ResourceCategory::RenderTarget), VIEWPORT_TARGETS);
    assert_eq!(ctx.ledger.live(ResourceCategory::NoiseTexture), 1);

    let gbuffer = targets.gbuffer().unwrap();
    assert_eq!(gbuffer.position.size(), (64, 48));
    assert_eq!(gbuffer.position.texture.format(), GBUFFER_POSITION_FORMAT);
    assert_eq!(gbuffer.albedo.texture.format(), GBUFFER_ALBEDO_FORMAT);
    assert_eq!(gbuffer.depth.texture.format(), DEPTH);
    assert_eq!(targets.ssao().unwrap().raw.texture.format(), SSAO_FORMAT);
}

#[test]
fn resize_recreates_targets_without_leaking() {
    let Some(ctx) = gpu() else { return };
    let mut targets = RenderTargets::new(&ctx, 64, 64, DEPTH, 1).unwrap();
    let allocated = ctx.ledger.allocations(ResourceCategory::RenderTarget);

    assert!(targets.resize(&ctx, 128, 96).unwrap());
    assert_eq!(targets.size(), (128, 96));
    assert_eq!(targets.gbuffer().unwrap().normal.size(), (128, 96));
    assert_eq!(targets.ssao().unwrap().blurred.size(), (128, 96));
    assert_eq!(ctx.ledger.live(ResourceCategory::RenderTarget), VIEWPORT_TARGETS);
    assert_eq!(
        ctx.ledger.allocations(ResourceCategory::RenderTarget),
        allocated + VIEWPORT_TARGETS as u64
    );
    // The noise tile does not depend on the viewport.
    assert_eq!(ctx.ledger.allocations(ResourceCategory::NoiseTexture), 1);
}

#[test]
fn zero_and_unchanged_sizes_are_ignored() {
    let Some(ctx) = gpu() else { return };
    let mut targets = RenderTargets::new(&ctx, 32, 32, DEPTH, 1).unwrap();
    let allocated = ctx.ledger.allocations(ResourceCategory::RenderTarget);

    assert!(!targets.resize(&ctx, 0, 600).unwrap());
    assert!(!targets.resize(&ctx, 32, 32).unwrap());
    assert_eq!(targets.size(), (32, 32));
    assert_eq!(ctx.ledger.allocations(ResourceCategory::RenderTarget), allocated);
}

#[test]
fn oversized_resize_is_incomplete_and_keeps_current_set() {
    let Some(ctx) = gpu() else { return };
    let mut targets = RenderTargets::new(&ctx, 32, 32, DEPTH, 1).unwrap();
    let too_big = ctx.max_texture_dimension() + 1;

    let err = targets.resize(&ctx, too_big, 32).unwrap_err();
    assert!(matches!(err, PrismError::IncompleteTarget { width, .. } if width == too_big));
    assert!(targets.is_complete());
    assert_eq!(targets.size(), (32, 32));
    assert_eq!(ctx.ledger.live(ResourceCategory::RenderTarget), VIEWPORT_TARGETS);
}

#[test]
fn zero_sized_construction_fails() {
    let Some(ctx) = gpu() else { return };
    let err = RenderTargets::new(&ctx, 0, 0, DEPTH, 1).err().unwrap();
    assert!(matches!(
        err,
        PrismError::IncompleteTarget {
            role: TargetRole::SceneDepth,
            ..
        }
    ));
}

#[test]
fn capture_depth_follows_requested_size() {
    let Some(ctx) = gpu() else { return };
    let mut targets = RenderTargets::new(&ctx, 16, 16, DEPTH, 1).unwrap();

    targets.capture_depth(&ctx, 128).unwrap();
    targets.capture_depth(&ctx, 128).unwrap();
    assert_eq!(ctx.ledger.live(ResourceCategory::RenderTarget), VIEWPORT_TARGETS + 1);

    targets.capture_depth(&ctx, 64).unwrap();
    assert_eq!(ctx.ledger.live(ResourceCategory::RenderTarget), VIEWPORT_TARGETS + 1);

    targets.release_capture_depth();
    assert_eq!(ctx.ledger.live(ResourceCategory::RenderTarget), VIEWPORT_TARGETS);
}

#[test]
fn noise_tile_matches_seed() {
    let Some(ctx) = gpu() else { return };
    let a = RenderTargets::new(&ctx, 16, 16, DEPTH, 42).unwrap();
    let b = RenderTargets::new(&ctx, 16, 16, DEPTH, 42).unwrap();

    let noise_a = read_texture(&ctx, &a.noise().unwrap().texture, 0, 0).unwrap();
    let noise_b = read_texture(&ctx, &b.noise().unwrap().texture, 0, 0).unwrap();
    assert_eq!(noise_a.len(), 4 * 4 * 4);
    assert_eq!(noise_a, noise_b);
    // Rotation vectors live in the tangent plane.
    assert!(noise_a.chunks_exact(4).all(|t| t[2] == 0.0));
}
