/// Polled input state
///
/// Owned by the application, filled from window events and handed to the
/// frame update by reference. Deltas accumulate until [`InputState::begin_frame`].

use glam::Vec2;
use rustc_hash::FxHashSet;

use crate::input::{ButtonState, Key, MouseButton};

#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed_keys: FxHashSet<Key>,
    pressed_buttons: FxHashSet<MouseButton>,
    mouse_position: Vec2,
    /// Cursor movement since the last frame (window coordinates)
    mouse_delta: Vec2,
    /// Device motion since the last frame, unaffected by cursor clamping
    raw_delta: Vec2,
    /// Lines scrolled since the last frame, positive away from the user
    scroll_delta: f32,
    cursor_inside: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the per-frame deltas
    pub fn begin_frame(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.raw_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    // ===== EVENT INJECTION =====

    pub fn on_key(&mut self, key: Key, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                self.pressed_keys.insert(key);
            }
            ButtonState::Released => {
                self.pressed_keys.remove(&key);
            }
        }
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                self.pressed_buttons.insert(button);
            }
            ButtonState::Released => {
                self.pressed_buttons.remove(&button);
            }
        }
    }

    pub fn on_cursor_moved(&mut self, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        if self.cursor_inside {
            self.mouse_delta += position - self.mouse_position;
        }
        self.mouse_position = position;
    }

    pub fn on_cursor_entered(&mut self) {
        self.cursor_inside = true;
    }

    /// Leaving the window releases held mouse buttons
    pub fn on_cursor_left(&mut self) {
        self.cursor_inside = false;
        self.pressed_buttons.clear();
    }

    pub fn on_scroll(&mut self, lines: f32) {
        self.scroll_delta += lines;
    }

    pub fn on_raw_motion(&mut self, dx: f32, dy: f32) {
        self.raw_delta += Vec2::new(dx, dy);
    }

    /// Focus lost: nothing stays pressed
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
        self.pressed_buttons.clear();
    }

    // ===== QUERIES =====

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    pub fn raw_delta(&self) -> Vec2 {
        self.raw_delta
    }

    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    pub fn cursor_inside(&self) -> bool {
        self.cursor_inside
    }

    pub fn pressed_key_count(&self) -> usize {
        self.pressed_keys.len()
    }
}
