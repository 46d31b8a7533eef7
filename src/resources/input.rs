//! Platform-agnostic input state
//!
//! Defines the per-frame input snapshot the viewer reads. It does not depend on
//! any windowing library; [`crate::app::input_adapter`] translates winit events
//! into these types.

use glam::Vec2;
use rustc_hash::FxHashSet;

/// Keyboard keys the viewer reacts to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    // Movement
    W,
    A,
    S,
    D,

    // Toggles and swaps
    B,
    E,
    K,
    L,
    M,
    O,
    P,
    T,

    // Path selection
    Key1,
    Key2,
    Key3,

    // Control keys
    Enter,
    Escape,
}

/// Mouse button enumeration
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Button state
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Keys, buttons and pointer motion accumulated over one frame.
///
/// Held state persists across frames; the "just pressed" sets and the deltas
/// are cleared by [`InputSnapshot::start_frame`].
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pressed_keys: FxHashSet<Key>,
    just_pressed_keys: FxHashSet<Key>,

    pressed_mouse: FxHashSet<MouseButton>,

    mouse_position: Vec2,
    mouse_delta: Vec2,
    scroll_delta: f32,
}

impl InputSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== System API (called by the platform adapter) ==========

    /// Clears transient state at the start of each frame.
    pub fn start_frame(&mut self) {
        self.just_pressed_keys.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    pub fn inject_key(&mut self, key: Key, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                // Auto-repeat delivers Pressed again; only the first counts as "down".
                if self.pressed_keys.insert(key) {
                    self.just_pressed_keys.insert(key);
                }
            }
            ButtonState::Released => {
                self.pressed_keys.remove(&key);
            }
        }
    }

    pub fn inject_mouse_button(&mut self, button: MouseButton, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                self.pressed_mouse.insert(button);
            }
            ButtonState::Released => {
                self.pressed_mouse.remove(&button);
            }
        }
    }

    /// Records a new cursor position; the delta accumulates until the next frame.
    pub fn inject_mouse_position(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        self.mouse_delta += new_pos - self.mouse_position;
        self.mouse_position = new_pos;
    }

    pub fn inject_scroll(&mut self, delta: f32) {
        self.scroll_delta += delta;
    }

    // ========== Query API ==========

    #[inline]
    #[must_use]
    pub fn get_key(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// True only on the frame the key went down.
    #[inline]
    #[must_use]
    pub fn get_key_down(&self, key: Key) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    #[inline]
    #[must_use]
    pub fn get_mouse_button(&self, button: MouseButton) -> bool {
        self.pressed_mouse.contains(&button)
    }

    #[inline]
    #[must_use]
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    #[inline]
    #[must_use]
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_is_edge_triggered() {
        let mut input = InputSnapshot::new();
        input.inject_key(Key::O, ButtonState::Pressed);
        assert!(input.get_key_down(Key::O));

        input.start_frame();
        input.inject_key(Key::O, ButtonState::Pressed);
        assert!(input.get_key(Key::O));
        assert!(!input.get_key_down(Key::O));
    }

    #[test]
    fn deltas_reset_each_frame() {
        let mut input = InputSnapshot::new();
        input.inject_mouse_position(10.0, 5.0);
        input.inject_mouse_position(12.0, 4.0);
        input.inject_scroll(1.5);
        assert_eq!(input.mouse_delta(), Vec2::new(12.0, 4.0));
        assert!((input.scroll_delta() - 1.5).abs() < f32::EPSILON);

        input.start_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert!(input.scroll_delta().abs() < f32::EPSILON);
    }
}
