//! Fixed capture basis and the prefilter mip schedule.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::renderer::precompute::cubemap::{PREFILTER_MIP_LEVELS, PREFILTER_SIZE};

pub const CAPTURE_FOV_Y: f32 = std::f32::consts::FRAC_PI_2;
pub const CAPTURE_NEAR: f32 = 0.1;
pub const CAPTURE_FAR: f32 = 10.0;

/// Six view matrices (+X, −X, +Y, −Y, +Z, −Z) and one 90° projection.
///
/// The projection flips Y: wgpu rows grow downward, and the flip makes every
/// rendered face land in the texel order cube sampling expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureBasis {
    pub projection: Mat4,
    pub views: [Mat4; 6],
}

impl Default for CaptureBasis {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBasis {
    #[must_use]
    pub fn new() -> Self {
        let projection = Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0))
            * Mat4::perspective_rh(CAPTURE_FOV_Y, 1.0, CAPTURE_NEAR, CAPTURE_FAR);

        let look = |target: Vec3, up: Vec3| Mat4::look_at_rh(Vec3::ZERO, target, up);
        let views = [
            look(Vec3::X, Vec3::NEG_Y),
            look(Vec3::NEG_X, Vec3::NEG_Y),
            look(Vec3::Y, Vec3::Z),
            look(Vec3::NEG_Y, Vec3::NEG_Z),
            look(Vec3::Z, Vec3::NEG_Y),
            look(Vec3::NEG_Z, Vec3::NEG_Y),
        ];
        Self { projection, views }
    }

    #[inline]
    #[must_use]
    pub fn view_projection(&self, face: usize) -> Mat4 {
        self.projection * self.views[face]
    }
}

/// One prefilter step: which mip, its face size and the roughness it encodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrefilterMip {
    pub mip: u32,
    pub size: u32,
    pub roughness: f32,
}

/// 128, 64, 32, 16, 8 with roughness `mip / (levels - 1)`.
pub fn prefilter_schedule() -> impl Iterator<Item = PrefilterMip> {
    (0..PREFILTER_MIP_LEVELS).map(|mip| PrefilterMip {
        mip,
        size: (PREFILTER_SIZE >> mip).max(1),
        roughness: mip as f32 / (PREFILTER_MIP_LEVELS - 1) as f32,
    })
}

/// Per-draw capture parameters, one per dynamic-offset slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CaptureUniforms {
    pub view_projection: Mat4,
    pub roughness: f32,
    /// Face size of the environment cube being convolved.
    pub source_resolution: f32,
    pub _pad: [f32; 2],
}

/// Dynamic-offset stride of [`CaptureUniforms`] slots.
pub const CAPTURE_SLOT_STRIDE: u64 = 256;

/// Slot of the plain basis draw for `face` (stages 1 and 2).
#[must_use]
pub const fn basis_slot(face: usize) -> u32 {
    face as u32
}

/// Slot of prefilter draw `(mip, face)`.
#[must_use]
pub const fn prefilter_slot(mip: u32, face: usize) -> u32 {
    6 + mip * 6 + face as u32
}

/// Total slot count: six basis slots plus six per prefilter mip.
pub const CAPTURE_SLOT_COUNT: u32 = 6 + PREFILTER_MIP_LEVELS * 6;
