/// Frame backend - per-slot command buffers, fences and render targets
///
/// Implements the presentation side of the frame loop on top of the
/// swapchain. Each frame renders into a multisampled color target that is
/// resolved into the swapchain image, with a transient depth target.

use bindless_engine::bindless::{Result, Error};
use bindless_engine::bindless::frame::{AcquireOutcome, FrameBackend, PresentOutcome};
use bindless_engine::bindless::render::{
    CommandList as RendererCommandList, Rect2D, TextureDesc, TextureFormat, TextureUsage, Viewport,
};
use bindless_engine::{engine_debug, engine_err, engine_warn};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_access::{create_image_memory_barrier, full_range, AccessType, ImageLayout};
use crate::vulkan_command_list::CommandList;
use crate::vulkan_context::GpuContext;
use crate::vulkan_swapchain::Swapchain;
use crate::vulkan_texture::{format_from_vk, Texture};

/// Depth format of every frame
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::D32_SFLOAT_S8_UINT;

/// Background color of every frame
pub const CLEAR_COLOR: [f32; 4] = [0.95, 0.77, 0.33, 0.0];

/// Command recording and synchronization state of one frame slot
struct FrameSlot {
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
    /// Signaled when the slot's last submission has finished
    in_flight: vk::Fence,
    /// Signaled by acquire, waited by the slot's submission
    image_ready: vk::Semaphore,
}

impl FrameSlot {
    fn new(device: &ash::Device, queue_family: u32) -> Result<Self> {
        unsafe {
            let pool_info = vk::CommandPoolCreateInfo::default()
                .flags(vk::CommandPoolCreateFlags::TRANSIENT)
                .queue_family_index(queue_family);
            let command_pool = device.create_command_pool(&pool_info, None)
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to create frame command pool: {:?}", e))?;

            let mut slot = Self {
                command_pool,
                command_buffer: vk::CommandBuffer::null(),
                in_flight: vk::Fence::null(),
                image_ready: vk::Semaphore::null(),
            };

            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let created = device.allocate_command_buffers(&alloc_info)
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to allocate frame command buffer: {:?}", e))
                .and_then(|buffers| {
                    slot.command_buffer = buffers[0];
                    // Signaled so the first wait on a fresh slot returns at once
                    let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);
                    slot.in_flight = device.create_fence(&fence_info, None)
                        .map_err(|e| engine_err!("bindless::vulkan", "Failed to create frame fence: {:?}", e))?;
                    slot.image_ready = device.create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
                        .map_err(|e| engine_err!("bindless::vulkan", "Failed to create image-ready semaphore: {:?}", e))?;
                    Ok(())
                });

            match created {
                Ok(()) => Ok(slot),
                Err(e) => {
                    slot.destroy(device);
                    Err(e)
                }
            }
        }
    }

    unsafe fn destroy(&self, device: &ash::Device) {
        if self.image_ready != vk::Semaphore::null() {
            device.destroy_semaphore(self.image_ready, None);
        }
        if self.in_flight != vk::Fence::null() {
            device.destroy_fence(self.in_flight, None);
        }
        device.destroy_command_pool(self.command_pool, None);
    }
}

/// Multisampled color (when MSAA is on) and depth targets sized to the swapchain
struct RenderTargets {
    color: Option<Texture>,
    depth: Texture,
}

impl RenderTargets {
    fn new(ctx: &Arc<GpuContext>, color_format: TextureFormat, extent: vk::Extent2D, samples: u32) -> Result<Self> {
        let color = if samples > 1 {
            Some(Texture::new(
                Arc::clone(ctx),
                &TextureDesc {
                    name: "msaa_color".to_string(),
                    width: extent.width,
                    height: extent.height,
                    format: color_format,
                    mip_levels: 1,
                    usage: TextureUsage::COLOR_ATTACHMENT | TextureUsage::TRANSIENT_ATTACHMENT,
                },
                samples,
            )?)
        } else {
            None
        };

        let depth = Texture::new(
            Arc::clone(ctx),
            &TextureDesc {
                name: "depth".to_string(),
                width: extent.width,
                height: extent.height,
                format: DEPTH_FORMAT,
                mip_levels: 1,
                usage: TextureUsage::DEPTH_STENCIL_ATTACHMENT | TextureUsage::TRANSIENT_ATTACHMENT,
            },
            samples,
        )?;

        Ok(Self { color, depth })
    }
}

/// Vulkan implementation of the frame loop's presentation side
pub struct VulkanFrameBackend {
    ctx: Arc<GpuContext>,
    swapchain: Swapchain,
    slots: Vec<FrameSlot>,
    targets: RenderTargets,
    color_format: TextureFormat,
    samples: u32,
}

impl VulkanFrameBackend {
    pub(crate) fn new(ctx: Arc<GpuContext>, swapchain: Swapchain, frames_in_flight: usize, samples: u32) -> Result<Self> {
        if frames_in_flight == 0 {
            return Err(Error::InitializationFailed("frames_in_flight must be at least 1".to_string()));
        }

        let color_format = format_from_vk(swapchain.format).ok_or_else(|| {
            Error::InitializationFailed(format!("Unsupported swapchain format {:?}", swapchain.format))
        })?;

        let mut slots = Vec::with_capacity(frames_in_flight);
        for _ in 0..frames_in_flight {
            match FrameSlot::new(&ctx.device, ctx.graphics_queue_family) {
                Ok(slot) => slots.push(slot),
                Err(e) => {
                    for slot in &slots {
                        unsafe { slot.destroy(&ctx.device) };
                    }
                    return Err(e);
                }
            }
        }

        let targets = match RenderTargets::new(&ctx, color_format, swapchain.extent, samples) {
            Ok(targets) => targets,
            Err(e) => {
                for slot in &slots {
                    unsafe { slot.destroy(&ctx.device) };
                }
                return Err(e);
            }
        };

        engine_debug!(
            "bindless::vulkan",
            "Frame backend: {} slots, {} swapchain images, {}x MSAA",
            frames_in_flight,
            swapchain.image_count(),
            samples
        );

        Ok(Self {
            ctx,
            swapchain,
            slots,
            targets,
            color_format,
            samples,
        })
    }

    /// Format pipelines must render to
    pub fn color_format(&self) -> TextureFormat {
        self.color_format
    }

    pub fn depth_format(&self) -> TextureFormat {
        DEPTH_FORMAT
    }

    /// Rasterization samples pipelines must use
    pub fn samples(&self) -> u32 {
        self.samples
    }

    fn slot(&self, slot: usize) -> Result<&FrameSlot> {
        self.slots
            .get(slot)
            .ok_or_else(|| Error::InvalidResource(format!("Frame slot {} out of range ({})", slot, self.slots.len())))
    }

    fn check_image(&self, image_index: u32) -> Result<()> {
        if image_index as usize >= self.swapchain.image_count() {
            return Err(Error::InvalidResource(format!(
                "Swapchain image {} out of range ({})",
                image_index,
                self.swapchain.image_count()
            )));
        }
        Ok(())
    }

    unsafe fn barrier(
        &self,
        cmd: vk::CommandBuffer,
        prev: AccessType,
        next: AccessType,
        discard: bool,
        image: vk::Image,
        aspect: vk::ImageAspectFlags,
    ) -> Result<()> {
        let barrier = create_image_memory_barrier(
            &[prev],
            &[next],
            ImageLayout::Optimal,
            ImageLayout::Optimal,
            discard,
            image,
            full_range(aspect, 1),
            vk::QUEUE_FAMILY_IGNORED,
            vk::QUEUE_FAMILY_IGNORED,
        )?;
        let barriers = [barrier];
        let dependency = vk::DependencyInfo::default().image_memory_barriers(&barriers);
        self.ctx.device.cmd_pipeline_barrier2(cmd, &dependency);
        Ok(())
    }

    unsafe fn record_rendering(
        &self,
        cmd: vk::CommandBuffer,
        image_index: u32,
        draw: &mut dyn FnMut(&mut dyn RendererCommandList, (u32, u32)) -> Result<()>,
    ) -> Result<()> {
        let device = &self.ctx.device;
        let swapchain_image = self.swapchain.images[image_index as usize];
        let swapchain_view = self.swapchain.image_views[image_index as usize];
        let extent = self.swapchain.extent;

        self.barrier(
            cmd,
            AccessType::WriteColorAttachment,
            AccessType::WriteColorAttachment,
            true,
            swapchain_image,
            vk::ImageAspectFlags::COLOR,
        )?;
        if let Some(color) = &self.targets.color {
            self.barrier(
                cmd,
                AccessType::WriteColorAttachment,
                AccessType::WriteColorAttachment,
                true,
                color.image,
                vk::ImageAspectFlags::COLOR,
            )?;
        }
        self.barrier(
            cmd,
            AccessType::WriteDepthStencilAttachment,
            AccessType::WriteDepthStencilAttachment,
            true,
            self.targets.depth.image,
            self.targets.depth.aspect,
        )?;

        let clear_color = vk::ClearValue {
            color: vk::ClearColorValue { float32: CLEAR_COLOR },
        };
        let clear_depth = vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue { depth: 1.0, stencil: 0 },
        };

        let color_attachment = match &self.targets.color {
            Some(color) => vk::RenderingAttachmentInfo::default()
                .image_view(color.view)
                .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                .resolve_mode(vk::ResolveModeFlags::AVERAGE)
                .resolve_image_view(swapchain_view)
                .resolve_image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::DONT_CARE)
                .clear_value(clear_color),
            None => vk::RenderingAttachmentInfo::default()
                .image_view(swapchain_view)
                .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::STORE)
                .clear_value(clear_color),
        };
        let depth_attachment = vk::RenderingAttachmentInfo::default()
            .image_view(self.targets.depth.view)
            .image_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::DONT_CARE)
            .clear_value(clear_depth);

        let color_attachments = [color_attachment];
        let rendering_info = vk::RenderingInfo::default()
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            })
            .layer_count(1)
            .color_attachments(&color_attachments)
            .depth_attachment(&depth_attachment);

        device.cmd_begin_rendering(cmd, &rendering_info);

        let mut command_list = CommandList::new(device, cmd);
        let mut draw_all = || -> Result<()> {
            command_list.set_viewport(Viewport::flipped(extent.width, extent.height))?;
            command_list.set_scissor(Rect2D::from_extent(extent.width, extent.height))?;
            draw(&mut command_list, (extent.width, extent.height))
        };
        let drawn = draw_all();

        // Close the scope even when the recorder failed
        device.cmd_end_rendering(cmd);
        drawn?;

        self.barrier(
            cmd,
            AccessType::WriteColorAttachment,
            AccessType::ReadPresent,
            false,
            swapchain_image,
            vk::ImageAspectFlags::COLOR,
        )
    }
}

impl FrameBackend for VulkanFrameBackend {
    fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    fn extent(&self) -> (u32, u32) {
        (self.swapchain.extent.width, self.swapchain.extent.height)
    }

    fn wait_for_slot(&mut self, slot: usize) -> Result<()> {
        let fence = self.slot(slot)?.in_flight;
        unsafe {
            self.ctx.device
                .wait_for_fences(&[fence], true, u64::MAX)
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to wait for frame fence {}: {:?}", slot, e))
        }
    }

    fn acquire_image(&mut self, slot: usize) -> Result<AcquireOutcome> {
        let image_ready = self.slot(slot)?.image_ready;
        self.swapchain.acquire(image_ready)
    }

    fn record_frame(
        &mut self,
        slot: usize,
        image_index: u32,
        draw: &mut dyn FnMut(&mut dyn RendererCommandList, (u32, u32)) -> Result<()>,
    ) -> Result<()> {
        self.check_image(image_index)?;
        let frame = self.slot(slot)?;
        let (pool, cmd) = (frame.command_pool, frame.command_buffer);

        unsafe {
            self.ctx.device
                .reset_command_pool(pool, vk::CommandPoolResetFlags::empty())
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to reset frame command pool: {:?}", e))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            self.ctx.device
                .begin_command_buffer(cmd, &begin_info)
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to begin frame command buffer: {:?}", e))?;

            let recorded = self.record_rendering(cmd, image_index, draw);
            let ended = self.ctx.device
                .end_command_buffer(cmd)
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to end frame command buffer: {:?}", e));
            recorded?;
            ended
        }
    }

    fn submit(&mut self, slot: usize, image_index: u32) -> Result<()> {
        self.check_image(image_index)?;
        let frame = self.slot(slot)?;

        let wait_infos = [vk::SemaphoreSubmitInfo::default()
            .semaphore(frame.image_ready)
            .stage_mask(vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT)];
        let signal_infos = [vk::SemaphoreSubmitInfo::default()
            .semaphore(self.swapchain.render_finished_semaphore(image_index))
            .stage_mask(vk::PipelineStageFlags2::ALL_COMMANDS)];
        let command_buffer_infos = [vk::CommandBufferSubmitInfo::default().command_buffer(frame.command_buffer)];
        let submit = vk::SubmitInfo2::default()
            .wait_semaphore_infos(&wait_infos)
            .command_buffer_infos(&command_buffer_infos)
            .signal_semaphore_infos(&signal_infos);

        unsafe {
            self.ctx.device
                .reset_fences(&[frame.in_flight])
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to reset frame fence {}: {:?}", slot, e))?;
            self.ctx.device
                .queue_submit2(self.ctx.graphics_queue, &[submit], frame.in_flight)
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to submit frame: {:?}", e))
        }
    }

    fn present(&mut self, _slot: usize, image_index: u32) -> Result<PresentOutcome> {
        self.check_image(image_index)?;
        self.swapchain.present(image_index)
    }

    fn recreate(&mut self, width: u32, height: u32) -> Result<()> {
        self.swapchain.recreate(width, height)?;
        let format = format_from_vk(self.swapchain.format).ok_or_else(|| {
            Error::InitializationFailed(format!("Unsupported swapchain format {:?}", self.swapchain.format))
        })?;
        if format != self.color_format {
            engine_warn!(
                "bindless::vulkan",
                "Swapchain format changed from {:?} to {:?}, pipelines must be rebuilt",
                self.color_format,
                format
            );
            self.color_format = format;
        }
        self.targets = RenderTargets::new(&self.ctx, self.color_format, self.swapchain.extent, self.samples)?;
        Ok(())
    }

    fn wait_idle(&mut self) -> Result<()> {
        unsafe {
            self.ctx.device
                .device_wait_idle()
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to wait for device idle: {:?}", e))
        }
    }
}

impl Drop for VulkanFrameBackend {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self.ctx.device.device_wait_idle() {
                engine_warn!("bindless::vulkan", "device_wait_idle failed before frame teardown: {:?}", e);
            }
            for slot in self.slots.drain(..) {
                slot.destroy(&self.ctx.device);
            }
        }
    }
}
