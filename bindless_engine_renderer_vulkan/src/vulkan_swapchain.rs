/// Swapchain - presentation to the window surface
///
/// Owns the surface, the swapchain, its image views and one
/// render-finished semaphore per swapchain image. Acquire and present report
/// `SUBOPTIMAL`/`OUT_OF_DATE` as outcomes instead of errors so the frame
/// driver can schedule a rebuild.

use bindless_engine::bindless::{Result, Error};
use bindless_engine::bindless::frame::{AcquireOutcome, PresentOutcome};
use bindless_engine::{engine_debug, engine_err, engine_error, engine_warn};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Preferred back buffer format
pub(crate) fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.iter().find(|f| f.format == vk::Format::B8G8R8A8_SRGB))
        .or_else(|| formats.first())
        .copied()
}

/// FIFO when vsync is on, otherwise MAILBOX then IMMEDIATE, falling back to FIFO
pub(crate) fn choose_present_mode(vsync: bool, available: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if vsync {
        return vk::PresentModeKHR::FIFO;
    }
    [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE]
        .into_iter()
        .find(|mode| available.contains(mode))
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

/// Surface extent, or the window size clamped to the surface limits when
/// the surface lets the swapchain decide
pub(crate) fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, width: u32, height: u32) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        caps.current_extent
    } else {
        vk::Extent2D {
            width: width.clamp(caps.min_image_extent.width, caps.max_image_extent.width),
            height: height.clamp(caps.min_image_extent.height, caps.max_image_extent.height),
        }
    }
}

/// `min_image_count + 1`, capped by `max_image_count` when it is bounded
pub(crate) fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        count.min(caps.max_image_count)
    } else {
        count
    }
}

/// Vulkan swapchain implementation
pub struct Swapchain {
    ctx: Arc<GpuContext>,
    surface: vk::SurfaceKHR,
    swapchain_loader: ash::khr::swapchain::Device,
    swapchain: vk::SwapchainKHR,
    pub(crate) images: Vec<vk::Image>,
    pub(crate) image_views: Vec<vk::ImageView>,
    pub(crate) format: vk::Format,
    pub(crate) extent: vk::Extent2D,
    vsync: bool,
    /// One per swapchain image: presentation of image `i` waits on entry `i`
    render_finished: Vec<vk::Semaphore>,
}

impl Swapchain {
    /// Create a swapchain for `surface`, taking ownership of the surface
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        surface: vk::SurfaceKHR,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<Self> {
        let swapchain_loader = ash::khr::swapchain::Device::new(&ctx.instance, &ctx.device);
        let mut swapchain = Self {
            ctx,
            surface,
            swapchain_loader,
            swapchain: vk::SwapchainKHR::null(),
            images: Vec::new(),
            image_views: Vec::new(),
            format: vk::Format::UNDEFINED,
            extent: vk::Extent2D { width, height },
            vsync,
            render_finished: Vec::new(),
        };
        swapchain.build(width, height)?;
        Ok(swapchain)
    }

    pub(crate) fn image_count(&self) -> usize {
        self.images.len()
    }

    pub(crate) fn render_finished_semaphore(&self, image_index: u32) -> vk::Semaphore {
        self.render_finished[image_index as usize]
    }

    /// (Re)create the swapchain, retiring the current one
    fn build(&mut self, width: u32, height: u32) -> Result<()> {
        let ctx = Arc::clone(&self.ctx);
        unsafe {
            let caps = ctx.surface_loader
                .get_physical_device_surface_capabilities(ctx.physical_device, self.surface)
                .map_err(|e| {
                    engine_error!("bindless::vulkan", "Failed to get surface capabilities: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface capabilities: {:?}", e))
                })?;

            let formats = ctx.surface_loader
                .get_physical_device_surface_formats(ctx.physical_device, self.surface)
                .map_err(|e| {
                    engine_error!("bindless::vulkan", "Failed to query surface formats: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
                })?;
            let surface_format = choose_surface_format(&formats)
                .ok_or_else(|| Error::InitializationFailed("Surface reports no formats".to_string()))?;

            let present_modes = ctx.surface_loader
                .get_physical_device_surface_present_modes(ctx.physical_device, self.surface)
                .map_err(|e| {
                    engine_error!("bindless::vulkan", "Failed to query present modes: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get present modes: {:?}", e))
                })?;
            let present_mode = choose_present_mode(self.vsync, &present_modes);

            let extent = choose_extent(&caps, width, height);
            let old_swapchain = self.swapchain;

            let create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(self.surface)
                .min_image_count(choose_image_count(&caps))
                .image_format(surface_format.format)
                .image_color_space(surface_format.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(caps.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(present_mode)
                .clipped(true)
                .old_swapchain(old_swapchain);

            let swapchain = self.swapchain_loader
                .create_swapchain(&create_info, None)
                .map_err(|e| {
                    engine_error!("bindless::vulkan", "Failed to create swapchain: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
                })?;

            self.destroy_views_and_semaphores();
            if old_swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(old_swapchain, None);
            }
            self.swapchain = swapchain;
            self.format = surface_format.format;
            self.extent = extent;

            self.images = self.swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to get swapchain images: {:?}", e))?;

            for &image in &self.images {
                let view_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(surface_format.format)
                    .components(vk::ComponentMapping {
                        r: vk::ComponentSwizzle::IDENTITY,
                        g: vk::ComponentSwizzle::IDENTITY,
                        b: vk::ComponentSwizzle::IDENTITY,
                        a: vk::ComponentSwizzle::IDENTITY,
                    })
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });
                let view = ctx.device.create_image_view(&view_info, None)
                    .map_err(|e| engine_err!("bindless::vulkan", "Failed to create swapchain image view: {:?}", e))?;
                self.image_views.push(view);

                let semaphore = ctx.device.create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
                    .map_err(|e| engine_err!("bindless::vulkan", "Failed to create render-finished semaphore: {:?}", e))?;
                self.render_finished.push(semaphore);
            }

            engine_debug!(
                "bindless::vulkan",
                "Swapchain {}x{}, {} images, {:?}, {:?}",
                extent.width,
                extent.height,
                self.images.len(),
                surface_format.format,
                present_mode
            );
        }
        Ok(())
    }

    unsafe fn destroy_views_and_semaphores(&mut self) {
        for view in self.image_views.drain(..) {
            self.ctx.device.destroy_image_view(view, None);
        }
        for semaphore in self.render_finished.drain(..) {
            self.ctx.device.destroy_semaphore(semaphore, None);
        }
    }

    /// Acquire the next image, signaling `image_ready` when it can be written
    pub(crate) fn acquire(&mut self, image_ready: vk::Semaphore) -> Result<AcquireOutcome> {
        let result = unsafe {
            self.swapchain_loader.acquire_next_image(self.swapchain, u64::MAX, image_ready, vk::Fence::null())
        };
        match result {
            Ok((image_index, suboptimal)) => Ok(AcquireOutcome::Acquired { image_index, suboptimal }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(e) => Err(engine_err!("bindless::vulkan", "Failed to acquire next swapchain image: {:?}", e)),
        }
    }

    /// Present `image_index` once its render-finished semaphore is signaled
    pub(crate) fn present(&mut self, image_index: u32) -> Result<PresentOutcome> {
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [self.render_finished_semaphore(image_index)];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        match unsafe { self.swapchain_loader.queue_present(self.ctx.graphics_queue, &present_info) } {
            Ok(false) => Ok(PresentOutcome::Presented),
            Ok(true) | Err(vk::Result::SUBOPTIMAL_KHR) => Ok(PresentOutcome::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
            Err(e) => Err(engine_err!("bindless::vulkan", "Failed to present swapchain image: {:?}", e)),
        }
    }

    /// Rebuild for a new window size
    pub(crate) fn recreate(&mut self, width: u32, height: u32) -> Result<()> {
        unsafe {
            self.ctx.device.device_wait_idle()
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to wait idle before swapchain recreate: {:?}", e))?;
        }
        self.build(width, height)
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self.ctx.device.device_wait_idle() {
                engine_warn!("bindless::vulkan", "device_wait_idle failed before swapchain teardown: {:?}", e);
            }
            self.destroy_views_and_semaphores();
            if self.swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(self.swapchain, None);
            }
            self.ctx.surface_loader.destroy_surface(self.surface, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_swapchain_tests.rs"]
mod tests;
