//! Input state and winit event translation

pub mod key;
pub mod input_state;
pub mod translate;

pub use key::{ButtonState, Key, MouseButton};
pub use input_state::InputState;
pub use translate::{
    process_window_event, translate_element_state, translate_key_code, translate_mouse_button,
};

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
