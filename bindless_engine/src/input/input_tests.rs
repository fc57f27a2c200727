//! Unit tests for input state and winit translation

use super::*;
use winit::dpi::PhysicalPosition;
use winit::event::{DeviceId, ElementState, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::keyboard::KeyCode;

fn device_id() -> DeviceId {
    DeviceId::dummy()
}

// ============================================================================
// Translation
// ============================================================================

#[test]
fn test_translate_letters_and_digits() {
    assert_eq!(translate_key_code(KeyCode::KeyW), Some(Key::W));
    assert_eq!(translate_key_code(KeyCode::KeyZ), Some(Key::Z));
    assert_eq!(translate_key_code(KeyCode::Digit0), Some(Key::Digit0));
    assert_eq!(translate_key_code(KeyCode::Numpad9), Some(Key::Numpad9));
}

#[test]
fn test_translate_control_keys() {
    assert_eq!(translate_key_code(KeyCode::Escape), Some(Key::Escape));
    assert_eq!(translate_key_code(KeyCode::ShiftLeft), Some(Key::ShiftLeft));
    assert_eq!(translate_key_code(KeyCode::ArrowUp), Some(Key::ArrowUp));
    assert_eq!(translate_key_code(KeyCode::F12), Some(Key::F12));
}

#[test]
fn test_translate_untracked_key_is_none() {
    assert_eq!(translate_key_code(KeyCode::CapsLock), None);
    assert_eq!(translate_key_code(KeyCode::PrintScreen), None);
    assert_eq!(translate_key_code(KeyCode::F24), None);
}

#[test]
fn test_translate_mouse_buttons() {
    assert_eq!(translate_mouse_button(winit::event::MouseButton::Left), Some(MouseButton::Left));
    assert_eq!(translate_mouse_button(winit::event::MouseButton::Middle), Some(MouseButton::Middle));
    assert_eq!(translate_mouse_button(winit::event::MouseButton::Back), None);
    assert_eq!(translate_mouse_button(winit::event::MouseButton::Other(7)), None);
}

#[test]
fn test_translate_element_state() {
    assert_eq!(translate_element_state(ElementState::Pressed), ButtonState::Pressed);
    assert_eq!(translate_element_state(ElementState::Released), ButtonState::Released);
}

// ============================================================================
// InputState
// ============================================================================

#[test]
fn test_key_press_and_release() {
    let mut input = InputState::new();
    input.on_key(Key::W, ButtonState::Pressed);
    input.on_key(Key::A, ButtonState::Pressed);
    assert!(input.is_key_pressed(Key::W));
    assert_eq!(input.pressed_key_count(), 2);

    input.on_key(Key::W, ButtonState::Released);
    assert!(!input.is_key_pressed(Key::W));
    assert!(input.is_key_pressed(Key::A));
}

#[test]
fn test_repeated_press_counts_once() {
    let mut input = InputState::new();
    input.on_key(Key::Space, ButtonState::Pressed);
    input.on_key(Key::Space, ButtonState::Pressed);
    assert_eq!(input.pressed_key_count(), 1);
}

#[test]
fn test_mouse_delta_only_inside_window() {
    let mut input = InputState::new();
    input.on_cursor_moved(10.0, 10.0);
    assert_eq!(input.mouse_delta(), glam::Vec2::ZERO);

    input.on_cursor_entered();
    input.on_cursor_moved(15.0, 7.0);
    input.on_cursor_moved(20.0, 9.0);
    assert_eq!(input.mouse_position(), glam::Vec2::new(20.0, 9.0));
    assert_eq!(input.mouse_delta(), glam::Vec2::new(10.0, -1.0));
}

#[test]
fn test_begin_frame_clears_deltas_but_keeps_held_state() {
    let mut input = InputState::new();
    input.on_cursor_entered();
    input.on_cursor_moved(5.0, 5.0);
    input.on_cursor_moved(6.0, 5.0);
    input.on_scroll(2.0);
    input.on_raw_motion(3.0, -1.0);
    input.on_key(Key::D, ButtonState::Pressed);
    input.on_mouse_button(MouseButton::Right, ButtonState::Pressed);

    input.begin_frame();

    assert_eq!(input.mouse_delta(), glam::Vec2::ZERO);
    assert_eq!(input.raw_delta(), glam::Vec2::ZERO);
    assert_eq!(input.scroll_delta(), 0.0);
    assert!(input.is_key_pressed(Key::D));
    assert!(input.is_button_pressed(MouseButton::Right));
    assert_eq!(input.mouse_position(), glam::Vec2::new(6.0, 5.0));
}

#[test]
fn test_cursor_left_releases_buttons() {
    let mut input = InputState::new();
    input.on_cursor_entered();
    input.on_mouse_button(MouseButton::Left, ButtonState::Pressed);
    input.on_cursor_left();
    assert!(!input.cursor_inside());
    assert!(!input.is_button_pressed(MouseButton::Left));
}

#[test]
fn test_release_all() {
    let mut input = InputState::new();
    input.on_key(Key::Q, ButtonState::Pressed);
    input.on_mouse_button(MouseButton::Middle, ButtonState::Pressed);
    input.release_all();
    assert_eq!(input.pressed_key_count(), 0);
    assert!(!input.is_button_pressed(MouseButton::Middle));
}

// ============================================================================
// Window events
// ============================================================================

#[test]
fn test_process_mouse_wheel_line_and_pixel() {
    let mut input = InputState::new();
    let lines = WindowEvent::MouseWheel {
        device_id: device_id(),
        delta: MouseScrollDelta::LineDelta(0.0, 1.5),
        phase: TouchPhase::Moved,
    };
    let pixels = WindowEvent::MouseWheel {
        device_id: device_id(),
        delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 50.0)),
        phase: TouchPhase::Moved,
    };
    assert!(process_window_event(&mut input, &lines));
    assert!(process_window_event(&mut input, &pixels));
    assert!((input.scroll_delta() - 2.0).abs() < 1e-6);
}

#[test]
fn test_process_cursor_events() {
    let mut input = InputState::new();
    process_window_event(&mut input, &WindowEvent::CursorEntered { device_id: device_id() });
    process_window_event(
        &mut input,
        &WindowEvent::CursorMoved { device_id: device_id(), position: PhysicalPosition::new(32.0, 48.0) },
    );
    process_window_event(
        &mut input,
        &WindowEvent::MouseInput {
            device_id: device_id(),
            state: ElementState::Pressed,
            button: winit::event::MouseButton::Left,
        },
    );
    assert!(input.cursor_inside());
    assert_eq!(input.mouse_position(), glam::Vec2::new(32.0, 48.0));
    assert!(input.is_button_pressed(MouseButton::Left));
}

#[test]
fn test_non_input_event_is_ignored() {
    let mut input = InputState::new();
    assert!(!process_window_event(&mut input, &WindowEvent::Focused(true)));
    assert!(!process_window_event(&mut input, &WindowEvent::RedrawRequested));
}
