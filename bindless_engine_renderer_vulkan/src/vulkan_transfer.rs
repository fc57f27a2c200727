/// Synchronous staging uploads
///
/// Each upload copies the payload into a host-visible staging buffer,
/// records the transfer into the context's one-shot command buffer, submits
/// it and waits on the upload fence. The staging buffer is dropped before
/// the call returns.
///
/// Image uploads are expressed as a [`TransferPlan`]: a list of barriers,
/// one buffer-to-image copy and the mip blits, built without touching the
/// device so the ordering can be checked on its own.

use ash::vk;
use bindless_engine::bindless::{
    Error, Result,
    render::{check_buffer_range, mip_extent, BufferDesc, BufferUsage, MemoryLocation, Buffer as _},
};
use bindless_engine::{engine_debug, engine_err};

use crate::vulkan_access::{
    create_buffer_memory_barrier, create_image_memory_barrier, AccessType, ImageLayout,
};
use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_texture::Texture;

use std::sync::Arc;

/// One step of an image upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOp {
    /// Layout/visibility transition over `mip_count` levels from `base_mip`
    Barrier {
        prev: AccessType,
        next: AccessType,
        discard: bool,
        base_mip: u32,
        mip_count: u32,
    },
    /// Staging buffer (offset 0, tightly packed) into `mip`
    CopyBufferToImage { mip: u32, width: u32, height: u32 },
    /// Linear downsample of one level into the next
    Blit {
        src_mip: u32,
        dst_mip: u32,
        src_extent: (u32, u32),
        dst_extent: (u32, u32),
    },
}

/// Ordered list of operations that uploads level 0 and fills the mip chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    ops: Vec<TransferOp>,
}

impl TransferPlan {
    /// Plan for a `width x height` image with `mip_levels` levels
    ///
    /// After the plan runs every level is readable from any shader stage.
    pub fn for_image(width: u32, height: u32, mip_levels: u32) -> Self {
        let mips = mip_levels.max(1);
        let mut ops = Vec::with_capacity(4 + 2 * mips as usize);

        ops.push(TransferOp::Barrier {
            prev: AccessType::WriteHost,
            next: AccessType::WriteTransfer,
            discard: true,
            base_mip: 0,
            mip_count: mips,
        });
        ops.push(TransferOp::CopyBufferToImage { mip: 0, width, height });

        if mips > 1 {
            ops.push(TransferOp::Barrier {
                prev: AccessType::WriteTransfer,
                next: AccessType::ReadTransfer,
                discard: false,
                base_mip: 0,
                mip_count: 1,
            });

            for level in 1..mips {
                ops.push(TransferOp::Blit {
                    src_mip: level - 1,
                    dst_mip: level,
                    src_extent: mip_extent(width, height, level - 1),
                    dst_extent: mip_extent(width, height, level),
                });
                ops.push(TransferOp::Barrier {
                    prev: AccessType::WriteTransfer,
                    next: AccessType::ReadTransfer,
                    discard: false,
                    base_mip: level,
                    mip_count: 1,
                });
            }
        }

        // Every level ends in the same state, whichever path it took
        let last = if mips > 1 { AccessType::ReadTransfer } else { AccessType::WriteTransfer };
        ops.push(TransferOp::Barrier {
            prev: last,
            next: AccessType::ReadAnyShader,
            discard: false,
            base_mip: 0,
            mip_count: mips,
        });

        Self { ops }
    }

    pub fn ops(&self) -> &[TransferOp] {
        &self.ops
    }

    /// Record the plan into `cmd`
    ///
    /// # Safety
    ///
    /// `cmd` must be recording, `staging` must hold the level 0 texels and
    /// `image` must have been created with `TRANSFER_SRC | TRANSFER_DST`.
    pub unsafe fn record(
        &self,
        device: &ash::Device,
        cmd: vk::CommandBuffer,
        staging: vk::Buffer,
        image: vk::Image,
        aspect: vk::ImageAspectFlags,
    ) -> Result<()> {
        for op in &self.ops {
            match *op {
                TransferOp::Barrier { prev, next, discard, base_mip, mip_count } => {
                    let barrier = create_image_memory_barrier(
                        &[prev],
                        &[next],
                        ImageLayout::Optimal,
                        ImageLayout::Optimal,
                        discard,
                        image,
                        vk::ImageSubresourceRange {
                            aspect_mask: aspect,
                            base_mip_level: base_mip,
                            level_count: mip_count,
                            base_array_layer: 0,
                            layer_count: 1,
                        },
                        vk::QUEUE_FAMILY_IGNORED,
                        vk::QUEUE_FAMILY_IGNORED,
                    )?;
                    let barriers = [barrier];
                    let dependency = vk::DependencyInfo::default().image_memory_barriers(&barriers);
                    device.cmd_pipeline_barrier2(cmd, &dependency);
                }
                TransferOp::CopyBufferToImage { mip, width, height } => {
                    let region = vk::BufferImageCopy::default()
                        .buffer_offset(0)
                        .buffer_row_length(0)
                        .buffer_image_height(0)
                        .image_subresource(layers(aspect, mip))
                        .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
                        .image_extent(vk::Extent3D { width, height, depth: 1 });
                    device.cmd_copy_buffer_to_image(
                        cmd,
                        staging,
                        image,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        &[region],
                    );
                }
                TransferOp::Blit { src_mip, dst_mip, src_extent, dst_extent } => {
                    let blit = vk::ImageBlit::default()
                        .src_subresource(layers(aspect, src_mip))
                        .src_offsets([
                            vk::Offset3D { x: 0, y: 0, z: 0 },
                            vk::Offset3D { x: src_extent.0 as i32, y: src_extent.1 as i32, z: 1 },
                        ])
                        .dst_subresource(layers(aspect, dst_mip))
                        .dst_offsets([
                            vk::Offset3D { x: 0, y: 0, z: 0 },
                            vk::Offset3D { x: dst_extent.0 as i32, y: dst_extent.1 as i32, z: 1 },
                        ]);
                    device.cmd_blit_image(
                        cmd,
                        image,
                        vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                        image,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        &[blit],
                        vk::Filter::LINEAR,
                    );
                }
            }
        }
        Ok(())
    }
}

fn layers(aspect: vk::ImageAspectFlags, mip: u32) -> vk::ImageSubresourceLayers {
    vk::ImageSubresourceLayers {
        aspect_mask: aspect,
        mip_level: mip,
        base_array_layer: 0,
        layer_count: 1,
    }
}

/// Host-visible copy of `data`, dropped by the caller once the GPU is done
fn create_staging(ctx: &Arc<GpuContext>, data: &[u8]) -> Result<Buffer> {
    let staging = Buffer::new(
        Arc::clone(ctx),
        &BufferDesc {
            name: "staging".to_string(),
            size: data.len() as u64,
            usage: BufferUsage::TRANSFER_SRC,
            location: MemoryLocation::CpuToGpu,
        },
    )?;
    staging.update(0, data)?;
    Ok(staging)
}

/// Record with `record`, submit on the graphics queue and block until done
fn submit_and_wait<F>(ctx: &GpuContext, record: F) -> Result<()>
where
    F: FnOnce(vk::CommandBuffer) -> Result<()>,
{
    let upload = ctx
        .upload
        .lock()
        .map_err(|_| engine_err!("bindless::vulkan", "Upload context lock poisoned"))?;
    let cmd = upload.command_buffer;

    unsafe {
        ctx.device
            .reset_command_buffer(cmd, vk::CommandBufferResetFlags::empty())
            .map_err(|e| engine_err!("bindless::vulkan", "Failed to reset upload command buffer: {:?}", e))?;

        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        ctx.device
            .begin_command_buffer(cmd, &begin_info)
            .map_err(|e| engine_err!("bindless::vulkan", "Failed to begin upload command buffer: {:?}", e))?;

        if let Err(e) = record(cmd) {
            // Leave the buffer in a resettable state
            ctx.device.end_command_buffer(cmd).ok();
            return Err(e);
        }

        ctx.device
            .end_command_buffer(cmd)
            .map_err(|e| engine_err!("bindless::vulkan", "Failed to end upload command buffer: {:?}", e))?;

        let command_buffer_infos = [vk::CommandBufferSubmitInfo::default().command_buffer(cmd)];
        let submit = vk::SubmitInfo2::default().command_buffer_infos(&command_buffer_infos);
        ctx.device
            .queue_submit2(ctx.graphics_queue, &[submit], upload.fence)
            .map_err(|e| engine_err!("bindless::vulkan", "Failed to submit upload: {:?}", e))?;

        ctx.device
            .wait_for_fences(&[upload.fence], true, u64::MAX)
            .map_err(|e| engine_err!("bindless::vulkan", "Failed to wait for upload fence: {:?}", e))?;
        ctx.device
            .reset_fences(&[upload.fence])
            .map_err(|e| engine_err!("bindless::vulkan", "Failed to reset upload fence: {:?}", e))?;
    }

    Ok(())
}

/// Copy `data` into a device-local buffer at `offset`
pub(crate) fn upload_to_buffer(ctx: &Arc<GpuContext>, dst: &Buffer, offset: u64, data: &[u8]) -> Result<()> {
    check_buffer_range(dst.size, offset, data.len() as u64)?;
    if data.is_empty() {
        return Ok(());
    }

    let staging = create_staging(ctx, data)?;

    submit_and_wait(ctx, |cmd| {
        let region = vk::BufferCopy::default()
            .src_offset(0)
            .dst_offset(offset)
            .size(data.len() as u64);

        // Uploaded ranges are read as vertices, storage data or indices
        let barrier = create_buffer_memory_barrier(
            &[AccessType::WriteTransfer],
            &[AccessType::ReadAnyShader, AccessType::ReadIndexBuffer],
            dst.buffer,
            offset,
            data.len() as u64,
            vk::QUEUE_FAMILY_IGNORED,
            vk::QUEUE_FAMILY_IGNORED,
        )?;
        let barriers = [barrier];

        unsafe {
            ctx.device.cmd_copy_buffer(cmd, staging.buffer, dst.buffer, &[region]);
            let dependency = vk::DependencyInfo::default().buffer_memory_barriers(&barriers);
            ctx.device.cmd_pipeline_barrier2(cmd, &dependency);
        }
        Ok(())
    })?;

    engine_debug!("bindless::vulkan", "Uploaded {} bytes at offset {}", data.len(), offset);
    Ok(())
}

/// Upload RGBA8 level 0 and blit the rest of the chain
pub(crate) fn upload_to_image(ctx: &Arc<GpuContext>, dst: &Texture, data: &[u8]) -> Result<()> {
    let info = &dst.info;
    let expected = info.width as u64 * info.height as u64 * 4;
    if data.len() as u64 != expected {
        return Err(Error::InvalidResource(format!(
            "Texture payload is {} bytes, expected {} for {}x{}",
            data.len(),
            expected,
            info.width,
            info.height
        )));
    }
    if info.format.is_depth() {
        return Err(Error::InvalidResource("Cannot upload texels into a depth texture".to_string()));
    }

    let plan = TransferPlan::for_image(info.width, info.height, info.mip_levels);
    let staging = create_staging(ctx, data)?;

    submit_and_wait(ctx, |cmd| unsafe {
        plan.record(&ctx.device, cmd, staging.buffer, dst.image, dst.aspect)
    })?;

    engine_debug!(
        "bindless::vulkan",
        "Uploaded {}x{} texture with {} mip levels",
        info.width,
        info.height,
        info.mip_levels
    );
    Ok(())
}

#[cfg(test)]
#[path = "vulkan_transfer_tests.rs"]
mod tests;
