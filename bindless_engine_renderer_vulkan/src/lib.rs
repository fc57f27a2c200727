/*!
# Bindless Engine - Vulkan Backend

Vulkan 1.3 implementation of the bindless_engine GPU boundary.

This crate implements `GraphicsDevice` and `FrameBackend` using the Ash library
for Vulkan bindings and gpu-allocator for memory management. It relies on
descriptor indexing, dynamic rendering and synchronization2; devices without
them are rejected at creation.

# Example

```no_run
use bindless_engine::bindless::Config;
use bindless_engine_renderer_vulkan::bindless::VulkanGraphicsDevice;
# fn run(window: &winit::window::Window) -> bindless_engine::bindless::Result<()> {
let mut device = VulkanGraphicsDevice::new(window, &Config::default())?;
let frame_backend = device.create_frame_backend(640, 480, 2)?;
# Ok(())
# }
```
*/

// Resources
mod vulkan_context;
mod vulkan_buffer;
mod vulkan_texture;
mod vulkan_sampler;
mod vulkan_descriptor_set;
mod vulkan_pipeline;

// Synchronization and transfers
mod vulkan_access;
mod vulkan_transfer;

// Frame loop
mod vulkan_command_list;
mod vulkan_swapchain;
mod vulkan_frame;

mod vulkan_debug;
mod vulkan_graphics_device;

/// Public API of the Vulkan backend
pub mod bindless {
    pub use crate::vulkan_graphics_device::VulkanGraphicsDevice;
    pub use crate::vulkan_frame::{VulkanFrameBackend, CLEAR_COLOR, DEPTH_FORMAT};
    pub use crate::vulkan_debug::{print_validation_stats_report, ValidationStats};

    /// Access-type barrier helpers, usable outside the backend
    pub mod sync {
        pub use crate::vulkan_access::{
            barrier_masks, create_buffer_memory_barrier, create_image_memory_barrier,
            create_memory_barrier, full_range, resolve_layout, AccessInfo, AccessType, BarrierMasks,
            ImageLayout,
        };
        pub use crate::vulkan_transfer::{TransferOp, TransferPlan};
    }

    /// The immutable sampler table baked into the bindless layout
    pub mod samplers {
        pub use crate::vulkan_sampler::{sampler_table, ImmutableSampler, SamplerAddressing, SAMPLER_COUNT};
    }
}
