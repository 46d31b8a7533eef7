use glam::{Mat4, Vec3};

use crate::errors::Result;
use crate::resources::ssao::checked;

/// Placement of the viewed model.
///
/// The model sits one unit below the origin, scaled uniformly and rotated by
/// `angle` around the axis formed by the enabled X/Y/Z toggles.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTransform {
    scale: f32,
    angle: f32,
    axes: [bool; 3],
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            scale: 2.0,
            angle: 0.0,
            axes: [false, true, false],
        }
    }
}

impl ModelTransform {
    pub const SCALE_RANGE: (f32, f32) = (0.01, 5.0);
    /// Radians.
    pub const ANGLE_RANGE: (f32, f32) = (0.0, 6.0);
    pub const OFFSET: Vec3 = Vec3::new(0.0, -1.0, 0.0);

    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) -> Result<()> {
        self.scale = checked("model.scale", scale, Self::SCALE_RANGE)?;
        Ok(())
    }

    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn set_angle(&mut self, angle: f32) -> Result<()> {
        self.angle = checked("model.angle", angle, Self::ANGLE_RANGE)?;
        Ok(())
    }

    #[must_use]
    pub fn axes(&self) -> [bool; 3] {
        self.axes
    }

    pub fn set_axes(&mut self, x: bool, y: bool, z: bool) {
        self.axes = [x, y, z];
    }

    /// `translate(OFFSET) * rotate(angle, axis) * scale`. With no axis enabled
    /// the rotation is skipped.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        let axis = Vec3::new(
            f32::from(u8::from(self.axes[0])),
            f32::from(u8::from(self.axes[1])),
            f32::from(u8::from(self.axes[2])),
        );
        let rotation = match axis.try_normalize() {
            Some(axis) => Mat4::from_axis_angle(axis, self.angle),
            None => Mat4::IDENTITY,
        };
        Mat4::from_translation(Self::OFFSET) * rotation * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_places_model_below_origin() {
        let m = ModelTransform::default().matrix();
        let origin = m.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-6);
        let unit_x = m.transform_vector3(Vec3::X);
        assert!((unit_x.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn no_axis_means_no_rotation() {
        let mut t = ModelTransform::default();
        t.set_axes(false, false, false);
        t.set_angle(1.0).unwrap();
        let dir = t.matrix().transform_vector3(Vec3::X);
        assert!((dir - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn rejects_nan_scale() {
        let mut t = ModelTransform::default();
        assert!(t.set_scale(f32::NAN).is_err());
        assert_eq!(t.scale(), 2.0);
        t.set_scale(50.0).unwrap();
        assert_eq!(t.scale(), 5.0);
    }
}
