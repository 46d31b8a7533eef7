//! Frame Pipeline Selector Tests
//!
//! Tests for:
//! - Pass order of the forward, deferred and PBR paths
//! - SSAO toggle: inserted passes and the occlusion source of the lighting pass
//! - Depth modes and load policies per pass
//! - Primitives each plan needs
//! - Validated setters of ShadingPathState

use prism::renderer::core::DepthMode;
use prism::renderer::frame::{
    DepthAttachment, FramePlan, LightMode, LoadPolicy, OcclusionSource, PassKind, PassTarget,
    ShadingPath, ShadingPathState,
};
use prism::resources::primitives::PrimitiveKind;

fn kinds(plan: &FramePlan) -> Vec<PassKind> {
    plan.passes.iter().map(|p| p.kind).collect()
}

fn state(path: ShadingPath) -> ShadingPathState {
    ShadingPathState::new(path)
}

// ============================================================================
// Pass sequences
// ============================================================================

#[test]
fn forward_draws_mesh_then_skybox() {
    let plan = FramePlan::build(&state(ShadingPath::Forward));
    assert_eq!(kinds(&plan), [PassKind::ForwardMesh, PassKind::ForwardSkybox]);

    let mesh = plan.passes[0];
    assert_eq!(mesh.depth, DepthMode::Less);
    assert_eq!(mesh.load, LoadPolicy::Clear);
    assert_eq!(mesh.depth_attachment, DepthAttachment::Scene);

    let sky = plan.passes[1];
    assert_eq!(sky.depth, DepthMode::LessEqual);
    assert_eq!(sky.load, LoadPolicy::Load);
}

#[test]
fn deferred_with_ssao_runs_five_passes() {
    let mut s = state(ShadingPath::Deferred);
    s.set_ssao_enabled(true);
    let plan = FramePlan::build(&s);

    assert_eq!(
        kinds(&plan),
        [
            PassKind::GeometryBuffer,
            PassKind::SsaoOcclusion,
            PassKind::SsaoBlur,
            PassKind::DeferredLighting,
            PassKind::LightMarkers,
        ]
    );
    assert_eq!(plan.occlusion, OcclusionSource::Blurred);
    assert_eq!(plan.passes[1].target, PassTarget::SsaoRaw);
    assert_eq!(plan.passes[2].target, PassTarget::SsaoBlurred);
}

#[test]
fn deferred_without_ssao_uses_neutral_occlusion() {
    let mut s = state(ShadingPath::Deferred);
    s.set_ssao_enabled(false);
    let plan = FramePlan::build(&s);

    assert!(!plan.contains(PassKind::SsaoOcclusion));
    assert!(!plan.contains(PassKind::SsaoBlur));
    assert_eq!(plan.occlusion, OcclusionSource::Neutral);
    assert_eq!(
        kinds(&plan),
        [PassKind::GeometryBuffer, PassKind::DeferredLighting, PassKind::LightMarkers]
    );
}

#[test]
fn light_markers_reuse_geometry_depth() {
    let plan = FramePlan::build(&state(ShadingPath::Deferred));
    let geometry = plan.passes.first().copied().unwrap();
    let markers = plan.passes.last().copied().unwrap();

    assert_eq!(geometry.depth_attachment, DepthAttachment::GeometryBuffer);
    assert_eq!(markers.depth_attachment, DepthAttachment::GeometryBuffer);
    assert_eq!(markers.load, LoadPolicy::Load);
    assert_eq!(markers.target, PassTarget::Swapchain);
}

#[test]
fn screen_space_passes_disable_depth() {
    let mut s = state(ShadingPath::Deferred);
    s.set_ssao_enabled(true);
    let plan = FramePlan::build(&s);
    for pass in &plan.passes {
        if matches!(
            pass.kind,
            PassKind::SsaoOcclusion | PassKind::SsaoBlur | PassKind::DeferredLighting
        ) {
            assert_eq!(pass.depth, DepthMode::Disabled, "{:?}", pass.kind);
            assert_eq!(pass.depth_attachment, DepthAttachment::None);
        }
    }
}

#[test]
fn pbr_draws_mesh_then_background() {
    let plan = FramePlan::build(&state(ShadingPath::Pbr));
    assert_eq!(kinds(&plan), [PassKind::PbrMesh, PassKind::PbrBackground]);
    assert_eq!(plan.passes[1].depth, DepthMode::LessEqual);
    assert!(!plan.probe_sphere);
}

#[test]
fn switching_path_changes_next_plan_only() {
    let mut s = state(ShadingPath::Forward);
    let before = FramePlan::build(&s);
    s.set_path(ShadingPath::Pbr);
    assert_eq!(before.path, ShadingPath::Forward);
    assert_eq!(FramePlan::build(&s).path, ShadingPath::Pbr);
}

// ============================================================================
// Primitives
// ============================================================================

#[test]
fn required_primitives_per_path() {
    let forward = FramePlan::build(&state(ShadingPath::Forward));
    assert_eq!(forward.required_primitives().as_slice(), [PrimitiveKind::Cube]);

    let mut deferred_state = state(ShadingPath::Deferred);
    deferred_state.set_ssao_enabled(true);
    let deferred = FramePlan::build(&deferred_state);
    assert_eq!(
        deferred.required_primitives().as_slice(),
        [PrimitiveKind::Quad, PrimitiveKind::Cube]
    );

    let mut pbr_state = state(ShadingPath::Pbr);
    pbr_state.set_probe_sphere(true);
    let pbr = FramePlan::build(&pbr_state);
    assert!(pbr.probe_sphere);
    assert_eq!(
        pbr.required_primitives().as_slice(),
        [PrimitiveKind::Sphere, PrimitiveKind::Cube]
    );
}

#[test]
fn probe_sphere_flag_ignored_outside_pbr() {
    let mut s = state(ShadingPath::Forward);
    s.set_probe_sphere(true);
    let plan = FramePlan::build(&s);
    assert!(!plan.probe_sphere);
    assert!(!plan.required_primitives().contains(&PrimitiveKind::Sphere));
}

// ============================================================================
// State setters
// ============================================================================

#[test]
fn light_mode_toggles() {
    let mut s = state(ShadingPath::Forward);
    assert_eq!(s.light_mode(), LightMode::Point);
    s.set_light_mode(s.light_mode().toggled());
    assert_eq!(s.light_mode(), LightMode::Directional);
}

#[test]
fn pbr_scalars_are_clamped_and_validated() {
    let mut s = state(ShadingPath::Pbr);
    s.set_metallic(2.0).unwrap();
    s.set_roughness(-0.5).unwrap();
    assert_eq!(s.metallic(), 1.0);
    assert_eq!(s.roughness(), 0.0);

    assert!(s.set_metallic(f32::NAN).is_err());
    assert_eq!(s.metallic(), 1.0);
}
