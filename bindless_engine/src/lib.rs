/*!
# Bindless Engine

Core types for a bindless rendering engine.

This crate owns everything that does not need a GPU: the bindless resource
manager (arena pools, double-buffered frame resources, texture table,
descriptor binding mirror), the frame loop state machine and the input
layer. The graphics backend (Vulkan) implements the traits defined here.

## Architecture

- **GraphicsDevice**: factory trait for buffers, textures, descriptor sets, pipelines
- **ResourceManager**: bindless handles over the shared GPU buffers
- **FrameDriver**: `WaitFence -> Acquire -> Record -> Submit -> Present` over a `FrameBackend`
- **InputState** / **EventQueue**: application-owned input and window notifications
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod graphics_device;
pub mod resource;
pub mod frame;
pub mod input;
pub mod mesh;

// Main bindless namespace module
pub mod bindless {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::*;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Render sub-module with the device traits and descriptors
    pub mod render {
        pub use crate::graphics_device::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod frame {
        pub use crate::frame::*;
    }

    pub mod input {
        pub use crate::input::*;
    }

    pub mod mesh {
        pub use crate::mesh::*;
    }
}

// Re-export math library at crate root
pub use glam;
