//! Fixed light rig of the three shading paths.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

/// Most lights the deferred lighting pass accumulates.
pub const MAX_DEFERRED_LIGHTS: usize = 32;
/// Direct lights of the PBR path.
pub const PBR_LIGHT_COUNT: usize = 4;

const DEFERRED_LIGHT_SEED: u64 = 13;

/// Point light with constant/linear/quadratic attenuation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels in.
    pub direction: Vec3,
    pub color: Vec3,
}

/// All lights the viewer shades with.
#[derive(Debug, Clone)]
pub struct LightRig {
    pub forward_point: PointLight,
    pub forward_directional: DirectionalLight,
    pub deferred: Vec<PointLight>,
    /// Unattenuated radiance sources; only position and color are used.
    pub pbr: [PointLight; PBR_LIGHT_COUNT],
}

impl Default for LightRig {
    fn default() -> Self {
        Self::new(MAX_DEFERRED_LIGHTS)
    }
}

impl LightRig {
    /// Builds the rig with `deferred_count` scattered lights (capped at
    /// [`MAX_DEFERRED_LIGHTS`]). The scatter is seeded and repeatable.
    #[must_use]
    pub fn new(deferred_count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(DEFERRED_LIGHT_SEED);
        let deferred = (0..deferred_count.min(MAX_DEFERRED_LIGHTS))
            .map(|_| PointLight {
                position: Vec3::new(
                    rng.random_range(-3.0..3.0),
                    rng.random_range(-4.0..2.0),
                    rng.random_range(-3.0..3.0),
                ),
                color: Vec3::new(
                    rng.random_range(0.5..1.0),
                    rng.random_range(0.5..1.0),
                    rng.random_range(0.5..1.0),
                ),
                constant: 1.0,
                linear: 0.7,
                quadratic: 1.8,
            })
            .collect();

        let pbr_light = |x: f32, y: f32| PointLight {
            position: Vec3::new(x, y, 10.0),
            color: Vec3::splat(300.0),
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        };

        Self {
            forward_point: PointLight {
                position: Vec3::new(1.2, 1.0, 2.0),
                color: Vec3::ONE,
                constant: 1.0,
                linear: 0.09,
                quadratic: 0.032,
            },
            forward_directional: DirectionalLight {
                direction: Vec3::new(-0.2, -1.0, -0.3),
                color: Vec3::ONE,
            },
            deferred,
            pbr: [
                pbr_light(-10.0, 10.0),
                pbr_light(10.0, 10.0),
                pbr_light(-10.0, -10.0),
                pbr_light(10.0, -10.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deferred_lights_are_capped_and_repeatable() {
        let a = LightRig::new(100);
        let b = LightRig::new(100);
        assert_eq!(a.deferred.len(), MAX_DEFERRED_LIGHTS);
        assert_eq!(a.deferred, b.deferred);
    }
}
