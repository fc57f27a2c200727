/// GpuContext - Shared GPU state for all Vulkan objects
///
/// Contains everything needed for GPU operations:
/// - Instance and device for Vulkan API calls
/// - Allocator for memory management
/// - Graphics queue for submission
/// - Command pool and fence for one-shot uploads
///
/// Every buffer, texture, pipeline and swapchain holds an `Arc<GpuContext>`,
/// so the device is only destroyed after the last of them is gone.

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use std::mem::ManuallyDrop;
use std::sync::Mutex;

use bindless_engine::bindless::Result;
use bindless_engine::{engine_err, engine_warn};

use crate::vulkan_debug::DebugState;

pub struct GpuContext {
    /// Loader, kept alive as long as the instance
    #[allow(dead_code)]
    pub(crate) entry: ash::Entry,

    pub(crate) instance: ash::Instance,

    pub(crate) physical_device: vk::PhysicalDevice,

    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator
    /// Wrapped in ManuallyDrop so it is released BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Mutex<Allocator>>,

    pub graphics_queue: vk::Queue,

    pub graphics_queue_family: u32,

    /// Surface extension loader (shared by the swapchain)
    pub(crate) surface_loader: ash::khr::surface::Instance,

    /// One-shot upload command buffer and its completion fence
    pub(crate) upload: Mutex<UploadContext>,

    pub(crate) debug_utils_loader: Option<ash::ext::debug_utils::Instance>,

    pub(crate) debug_messenger: Option<vk::DebugUtilsMessengerEXT>,

    /// User data of the messenger callback, freed after the messenger
    pub(crate) debug_state: Option<Box<DebugState>>,
}

/// Command pool, buffer and fence used by synchronous uploads
pub(crate) struct UploadContext {
    pub(crate) command_pool: vk::CommandPool,
    pub(crate) command_buffer: vk::CommandBuffer,
    pub(crate) fence: vk::Fence,
}

impl UploadContext {
    pub(crate) fn new(device: &ash::Device, queue_family: u32) -> Result<Self> {
        let pool_info = vk::CommandPoolCreateInfo::default()
            .flags(
                vk::CommandPoolCreateFlags::TRANSIENT
                    | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
            )
            .queue_family_index(queue_family);

        unsafe {
            let command_pool = device
                .create_command_pool(&pool_info, None)
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to create upload command pool: {:?}", e))?;

            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let command_buffer = match device.allocate_command_buffers(&alloc_info) {
                Ok(buffers) => buffers[0],
                Err(e) => {
                    device.destroy_command_pool(command_pool, None);
                    return Err(engine_err!("bindless::vulkan", "Failed to allocate upload command buffer: {:?}", e));
                }
            };

            let fence = match device.create_fence(&vk::FenceCreateInfo::default(), None) {
                Ok(fence) => fence,
                Err(e) => {
                    device.destroy_command_pool(command_pool, None);
                    return Err(engine_err!("bindless::vulkan", "Failed to create upload fence: {:?}", e));
                }
            };

            Ok(Self { command_pool, command_buffer, fence })
        }
    }

    /// # Safety
    ///
    /// The device must be idle with respect to the upload command buffer.
    pub(crate) unsafe fn destroy(&self, device: &ash::Device) {
        device.destroy_fence(self.fence, None);
        device.destroy_command_pool(self.command_pool, None);
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self.device.device_wait_idle() {
                engine_warn!("bindless::vulkan", "device_wait_idle failed during teardown: {:?}", e);
            }

            match self.upload.lock() {
                Ok(upload) => upload.destroy(&self.device),
                Err(poisoned) => poisoned.into_inner().destroy(&self.device),
            }

            // Allocator must go before the device
            ManuallyDrop::drop(&mut self.allocator);

            self.device.destroy_device(None);

            if let (Some(loader), Some(messenger)) = (&self.debug_utils_loader, self.debug_messenger) {
                loader.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}
