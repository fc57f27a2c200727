/// Access types and synchronization2 barrier derivation
///
/// Every GPU use of a resource is described by an [`AccessType`]. A barrier
/// is derived from the list of accesses before it and the list after it:
/// stages are always ORed in, access masks only where a write has to be made
/// visible. A write must be the only access in its list.

use ash::vk;
use bindless_engine::bindless::{Error, Result};

/// One way the GPU (or host) touches a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessType {
    None,
    ReadIndirectBuffer,
    ReadIndexBuffer,
    ReadVertexBuffer,
    ReadVertexShader,
    ReadFragmentShader,
    ReadFragmentShaderColorInputAttachment,
    ReadFragmentShaderDepthStencilInputAttachment,
    ReadColorAttachment,
    ReadDepthStencilAttachment,
    ReadComputeShader,
    ReadAnyShader,
    ReadTransfer,
    ReadHost,
    ReadPresent,
    WriteVertexShader,
    WriteFragmentShader,
    WriteColorAttachment,
    WriteDepthStencilAttachment,
    WriteComputeShader,
    WriteAnyShader,
    WriteTransfer,
    WriteHostPreinitialized,
    WriteHost,
    ReadWriteColorAttachment,
    General,
}

/// Stage, access mask and canonical image layout of an [`AccessType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessInfo {
    pub stage: vk::PipelineStageFlags2,
    pub access: vk::AccessFlags2,
    pub layout: vk::ImageLayout,
}

/// How image layouts are chosen for a barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout {
    /// `GENERAL` for everything except presentation
    General,
    /// The access table's canonical layout
    Optimal,
}

impl AccessType {
    /// Whether this access writes the resource
    pub fn is_write(self) -> bool {
        matches!(
            self,
            AccessType::WriteVertexShader
                | AccessType::WriteFragmentShader
                | AccessType::WriteColorAttachment
                | AccessType::WriteDepthStencilAttachment
                | AccessType::WriteComputeShader
                | AccessType::WriteAnyShader
                | AccessType::WriteTransfer
                | AccessType::WriteHostPreinitialized
                | AccessType::WriteHost
                | AccessType::ReadWriteColorAttachment
                | AccessType::General
        )
    }

    pub fn info(self) -> AccessInfo {
        use vk::AccessFlags2 as A;
        use vk::ImageLayout as L;
        use vk::PipelineStageFlags2 as S;

        let (stage, access, layout) = match self {
            AccessType::None => (S::NONE, A::NONE, L::UNDEFINED),
            AccessType::ReadIndirectBuffer => {
                (S::DRAW_INDIRECT, A::INDIRECT_COMMAND_READ, L::UNDEFINED)
            }
            AccessType::ReadIndexBuffer => (S::INDEX_INPUT, A::INDEX_READ, L::UNDEFINED),
            AccessType::ReadVertexBuffer => {
                (S::VERTEX_ATTRIBUTE_INPUT, A::VERTEX_ATTRIBUTE_READ, L::UNDEFINED)
            }
            AccessType::ReadVertexShader => {
                (S::VERTEX_SHADER, A::SHADER_READ, L::SHADER_READ_ONLY_OPTIMAL)
            }
            AccessType::ReadFragmentShader => {
                (S::FRAGMENT_SHADER, A::SHADER_READ, L::SHADER_READ_ONLY_OPTIMAL)
            }
            AccessType::ReadFragmentShaderColorInputAttachment => (
                S::FRAGMENT_SHADER,
                A::INPUT_ATTACHMENT_READ,
                L::SHADER_READ_ONLY_OPTIMAL,
            ),
            AccessType::ReadFragmentShaderDepthStencilInputAttachment => (
                S::FRAGMENT_SHADER,
                A::INPUT_ATTACHMENT_READ,
                L::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
            ),
            AccessType::ReadColorAttachment => (
                S::COLOR_ATTACHMENT_OUTPUT,
                A::COLOR_ATTACHMENT_READ,
                L::COLOR_ATTACHMENT_OPTIMAL,
            ),
            AccessType::ReadDepthStencilAttachment => (
                S::EARLY_FRAGMENT_TESTS | S::LATE_FRAGMENT_TESTS,
                A::DEPTH_STENCIL_ATTACHMENT_READ,
                L::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
            ),
            AccessType::ReadComputeShader => {
                (S::COMPUTE_SHADER, A::SHADER_READ, L::SHADER_READ_ONLY_OPTIMAL)
            }
            AccessType::ReadAnyShader => {
                (S::ALL_COMMANDS, A::SHADER_READ, L::SHADER_READ_ONLY_OPTIMAL)
            }
            AccessType::ReadTransfer => (S::TRANSFER, A::TRANSFER_READ, L::TRANSFER_SRC_OPTIMAL),
            AccessType::ReadHost => (S::HOST, A::HOST_READ, L::GENERAL),
            AccessType::ReadPresent => (S::NONE, A::NONE, L::PRESENT_SRC_KHR),
            AccessType::WriteVertexShader => (S::VERTEX_SHADER, A::SHADER_WRITE, L::GENERAL),
            AccessType::WriteFragmentShader => (S::FRAGMENT_SHADER, A::SHADER_WRITE, L::GENERAL),
            AccessType::WriteColorAttachment => (
                S::COLOR_ATTACHMENT_OUTPUT,
                A::COLOR_ATTACHMENT_WRITE,
                L::COLOR_ATTACHMENT_OPTIMAL,
            ),
            AccessType::WriteDepthStencilAttachment => (
                S::EARLY_FRAGMENT_TESTS | S::LATE_FRAGMENT_TESTS,
                A::DEPTH_STENCIL_ATTACHMENT_WRITE,
                L::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
            ),
            AccessType::WriteComputeShader => (S::COMPUTE_SHADER, A::SHADER_WRITE, L::GENERAL),
            AccessType::WriteAnyShader => (S::ALL_COMMANDS, A::SHADER_WRITE, L::GENERAL),
            AccessType::WriteTransfer => (S::TRANSFER, A::TRANSFER_WRITE, L::TRANSFER_DST_OPTIMAL),
            AccessType::WriteHostPreinitialized => (S::HOST, A::HOST_WRITE, L::PREINITIALIZED),
            AccessType::WriteHost => (S::HOST, A::HOST_WRITE, L::GENERAL),
            AccessType::ReadWriteColorAttachment => (
                S::COLOR_ATTACHMENT_OUTPUT,
                A::COLOR_ATTACHMENT_READ | A::COLOR_ATTACHMENT_WRITE,
                L::COLOR_ATTACHMENT_OPTIMAL,
            ),
            AccessType::General => (
                S::ALL_COMMANDS,
                A::MEMORY_READ | A::MEMORY_WRITE,
                L::GENERAL,
            ),
        };

        AccessInfo { stage, access, layout }
    }

    /// Layout this access needs under the given layout policy
    pub fn layout(self, policy: ImageLayout) -> vk::ImageLayout {
        match policy {
            ImageLayout::General => match self {
                AccessType::ReadPresent => vk::ImageLayout::PRESENT_SRC_KHR,
                _ => vk::ImageLayout::GENERAL,
            },
            ImageLayout::Optimal => self.info().layout,
        }
    }
}

/// Masks derived from a pair of access lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierMasks {
    pub src_stage: vk::PipelineStageFlags2,
    pub src_access: vk::AccessFlags2,
    pub dst_stage: vk::PipelineStageFlags2,
    pub dst_access: vk::AccessFlags2,
}

fn check_write_alone(accesses: &[AccessType], side: &str) -> Result<()> {
    if accesses.len() > 1 && accesses.iter().any(|a| a.is_write()) {
        return Err(Error::InvalidBarrier(format!(
            "{} access list {:?} mixes a write with other accesses",
            side, accesses
        )));
    }
    Ok(())
}

/// Stage and access masks for `prev -> next`
pub fn barrier_masks(prev: &[AccessType], next: &[AccessType]) -> Result<BarrierMasks> {
    check_write_alone(prev, "previous")?;
    check_write_alone(next, "next")?;

    let mut masks = BarrierMasks {
        src_stage: vk::PipelineStageFlags2::NONE,
        src_access: vk::AccessFlags2::NONE,
        dst_stage: vk::PipelineStageFlags2::NONE,
        dst_access: vk::AccessFlags2::NONE,
    };

    let mut prev_wrote = false;
    for access in prev {
        let info = access.info();
        masks.src_stage |= info.stage;
        if access.is_write() {
            masks.src_access |= info.access;
            prev_wrote = true;
        }
    }

    for access in next {
        let info = access.info();
        masks.dst_stage |= info.stage;
        // read -> read only needs execution ordering
        if prev_wrote {
            masks.dst_access |= info.access;
        }
    }

    Ok(masks)
}

/// The single layout every access in `accesses` agrees on
pub fn resolve_layout(accesses: &[AccessType], policy: ImageLayout) -> Result<vk::ImageLayout> {
    let mut resolved: Option<vk::ImageLayout> = None;
    for access in accesses {
        let layout = access.layout(policy);
        match resolved {
            None => resolved = Some(layout),
            Some(current) if current != layout => {
                return Err(Error::InvalidBarrier(format!(
                    "Access list {:?} needs both {:?} and {:?}",
                    accesses, current, layout
                )));
            }
            Some(_) => {}
        }
    }
    Ok(resolved.unwrap_or(vk::ImageLayout::UNDEFINED))
}

/// Global memory barrier
pub fn create_memory_barrier(
    prev: &[AccessType],
    next: &[AccessType],
) -> Result<vk::MemoryBarrier2<'static>> {
    let masks = barrier_masks(prev, next)?;
    Ok(vk::MemoryBarrier2::default()
        .src_stage_mask(masks.src_stage)
        .src_access_mask(masks.src_access)
        .dst_stage_mask(masks.dst_stage)
        .dst_access_mask(masks.dst_access))
}

/// Buffer range barrier, optionally transferring queue family ownership
#[allow(clippy::too_many_arguments)]
pub fn create_buffer_memory_barrier(
    prev: &[AccessType],
    next: &[AccessType],
    buffer: vk::Buffer,
    offset: vk::DeviceSize,
    size: vk::DeviceSize,
    src_queue_family: u32,
    dst_queue_family: u32,
) -> Result<vk::BufferMemoryBarrier2<'static>> {
    let masks = barrier_masks(prev, next)?;
    Ok(vk::BufferMemoryBarrier2::default()
        .src_stage_mask(masks.src_stage)
        .src_access_mask(masks.src_access)
        .dst_stage_mask(masks.dst_stage)
        .dst_access_mask(masks.dst_access)
        .src_queue_family_index(src_queue_family)
        .dst_queue_family_index(dst_queue_family)
        .buffer(buffer)
        .offset(offset)
        .size(size))
}

/// Image barrier with a layout transition
///
/// `discard` throws the previous contents away (old layout `UNDEFINED`).
#[allow(clippy::too_many_arguments)]
pub fn create_image_memory_barrier(
    prev: &[AccessType],
    next: &[AccessType],
    old_layout: ImageLayout,
    new_layout: ImageLayout,
    discard: bool,
    image: vk::Image,
    range: vk::ImageSubresourceRange,
    src_queue_family: u32,
    dst_queue_family: u32,
) -> Result<vk::ImageMemoryBarrier2<'static>> {
    let masks = barrier_masks(prev, next)?;
    let old = resolve_layout(prev, old_layout)?;
    let new = resolve_layout(next, new_layout)?;

    Ok(vk::ImageMemoryBarrier2::default()
        .src_stage_mask(masks.src_stage)
        .src_access_mask(masks.src_access)
        .dst_stage_mask(masks.dst_stage)
        .dst_access_mask(masks.dst_access)
        .old_layout(if discard { vk::ImageLayout::UNDEFINED } else { old })
        .new_layout(new)
        .src_queue_family_index(src_queue_family)
        .dst_queue_family_index(dst_queue_family)
        .image(image)
        .subresource_range(range))
}

/// Whole-resource subresource range for `aspect`
pub fn full_range(aspect: vk::ImageAspectFlags, mip_levels: u32) -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask: aspect,
        base_mip_level: 0,
        level_count: mip_levels,
        base_array_layer: 0,
        layer_count: 1,
    }
}

#[cfg(test)]
#[path = "vulkan_access_tests.rs"]
mod tests;
