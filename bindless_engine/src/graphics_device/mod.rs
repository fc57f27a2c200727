/// Graphics device module - GPU boundary types and traits

// Module declarations
pub mod graphics_device;
pub mod buffer;
pub mod texture;
pub mod descriptor_set;
pub mod command_list;
pub mod pipeline;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use buffer::*;
pub use texture::*;
pub use descriptor_set::*;
pub use command_list::*;
pub use pipeline::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
