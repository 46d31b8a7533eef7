use glam::{Mat4, Vec3};

use crate::resources::input::{InputSnapshot, Key, MouseButton};

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;
pub const MIN_FOV_DEGREES: f32 = 1.0;
pub const MAX_FOV_DEGREES: f32 = 45.0;

const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Free-flying camera: WASD moves along the view axes, the mouse turns the
/// view while the left button is held, and the scroll wheel zooms.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub position: Vec3,
    /// Degrees, -90 looks down −Z.
    pub yaw: f32,
    /// Degrees, clamped to ±89.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,

    pub move_speed: f32,
    pub look_sensitivity: f32,

    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0))
    }
}

impl FlyCamera {
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            yaw: -90.0,
            pitch: 0.0,
            fov: MAX_FOV_DEGREES,
            move_speed: 2.5,
            look_sensitivity: 0.1,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_vectors();
        camera
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize_or(Vec3::NEG_Z);
        self.right = self.front.cross(Vec3::Y).normalize_or(Vec3::X);
        self.up = self.right.cross(self.front).normalize_or(Vec3::Y);
    }

    /// Applies one frame of input.
    pub fn update(&mut self, input: &InputSnapshot, dt: f32) {
        let step = self.move_speed * dt;
        if input.get_key(Key::W) {
            self.position += self.front * step;
        }
        if input.get_key(Key::S) {
            self.position -= self.front * step;
        }
        if input.get_key(Key::A) {
            self.position -= self.right * step;
        }
        if input.get_key(Key::D) {
            self.position += self.right * step;
        }

        if input.get_mouse_button(MouseButton::Left) {
            let delta = input.mouse_delta();
            // Window y grows downward.
            self.turn(delta.x, -delta.y);
        }

        let scroll = input.scroll_delta();
        if scroll != 0.0 {
            self.zoom(scroll);
        }
    }

    /// Rotates by a mouse offset in pixels.
    pub fn turn(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.look_sensitivity;
        self.pitch = (self.pitch + dy * self.look_sensitivity)
            .clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
        self.update_vectors();
    }

    /// Narrows the field of view for positive `amount`.
    pub fn zoom(&mut self, amount: f32) {
        self.fov = (self.fov - amount).clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES);
    }

    #[must_use]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    #[must_use]
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect.max(f32::EPSILON), NEAR_PLANE, FAR_PLANE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::input::ButtonState;

    #[test]
    fn starts_looking_down_negative_z() {
        let camera = FlyCamera::default();
        assert!((camera.front() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = FlyCamera::default();
        camera.zoom(100.0);
        assert_eq!(camera.fov, MIN_FOV_DEGREES);
        camera.zoom(-100.0);
        assert_eq!(camera.fov, MAX_FOV_DEGREES);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = FlyCamera::default();
        camera.turn(0.0, 10_000.0);
        assert_eq!(camera.pitch, 89.0);
    }

    #[test]
    fn forward_key_moves_along_front() {
        let mut camera = FlyCamera::default();
        let mut input = InputSnapshot::new();
        input.inject_key(Key::W, ButtonState::Pressed);
        camera.update(&input, 1.0);
        assert!((camera.position - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-4);
    }
}
