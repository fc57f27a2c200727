//! Unit tests for the access table and barrier derivation
//!
//! Pure mask/layout logic, no GPU required.

use super::*;
use ash::vk;
use bindless_engine::bindless::Error;

fn color_range() -> vk::ImageSubresourceRange {
    full_range(vk::ImageAspectFlags::COLOR, 1)
}

// ============================================================================
// ACCESS TABLE
// ============================================================================

#[test]
fn test_write_classification() {
    assert!(AccessType::WriteTransfer.is_write());
    assert!(AccessType::WriteHost.is_write());
    assert!(AccessType::ReadWriteColorAttachment.is_write());
    assert!(AccessType::General.is_write());
    assert!(!AccessType::ReadTransfer.is_write());
    assert!(!AccessType::ReadPresent.is_write());
    assert!(!AccessType::None.is_write());
}

#[test]
fn test_table_entries() {
    let info = AccessType::WriteTransfer.info();
    assert_eq!(info.stage, vk::PipelineStageFlags2::TRANSFER);
    assert_eq!(info.access, vk::AccessFlags2::TRANSFER_WRITE);
    assert_eq!(info.layout, vk::ImageLayout::TRANSFER_DST_OPTIMAL);

    let info = AccessType::ReadAnyShader.info();
    assert_eq!(info.stage, vk::PipelineStageFlags2::ALL_COMMANDS);
    assert_eq!(info.layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);

    let info = AccessType::WriteDepthStencilAttachment.info();
    assert_eq!(
        info.stage,
        vk::PipelineStageFlags2::EARLY_FRAGMENT_TESTS | vk::PipelineStageFlags2::LATE_FRAGMENT_TESTS
    );
    assert_eq!(info.layout, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

    assert_eq!(AccessType::ReadPresent.info().layout, vk::ImageLayout::PRESENT_SRC_KHR);
    assert_eq!(AccessType::None.info().stage, vk::PipelineStageFlags2::NONE);
}

#[test]
fn test_general_layout_policy() {
    assert_eq!(AccessType::ReadFragmentShader.layout(ImageLayout::General), vk::ImageLayout::GENERAL);
    assert_eq!(AccessType::WriteTransfer.layout(ImageLayout::General), vk::ImageLayout::GENERAL);
    assert_eq!(AccessType::ReadPresent.layout(ImageLayout::General), vk::ImageLayout::PRESENT_SRC_KHR);
    assert_eq!(
        AccessType::ReadFragmentShader.layout(ImageLayout::Optimal),
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL
    );
}

// ============================================================================
// MASKS
// ============================================================================

#[test]
fn test_write_then_read_makes_write_visible() {
    let masks = barrier_masks(&[AccessType::WriteTransfer], &[AccessType::ReadFragmentShader]).unwrap();
    assert_eq!(masks.src_stage, vk::PipelineStageFlags2::TRANSFER);
    assert_eq!(masks.src_access, vk::AccessFlags2::TRANSFER_WRITE);
    assert_eq!(masks.dst_stage, vk::PipelineStageFlags2::FRAGMENT_SHADER);
    assert_eq!(masks.dst_access, vk::AccessFlags2::SHADER_READ);
}

#[test]
fn test_read_then_read_is_execution_only() {
    let masks = barrier_masks(
        &[AccessType::ReadVertexShader, AccessType::ReadFragmentShader],
        &[AccessType::ReadTransfer],
    )
    .unwrap();
    assert_eq!(
        masks.src_stage,
        vk::PipelineStageFlags2::VERTEX_SHADER | vk::PipelineStageFlags2::FRAGMENT_SHADER
    );
    assert_eq!(masks.src_access, vk::AccessFlags2::NONE);
    assert_eq!(masks.dst_stage, vk::PipelineStageFlags2::TRANSFER);
    assert_eq!(masks.dst_access, vk::AccessFlags2::NONE);
}

#[test]
fn test_read_then_write_has_no_access_masks() {
    let masks = barrier_masks(&[AccessType::ReadTransfer], &[AccessType::WriteTransfer]).unwrap();
    assert_eq!(masks.src_access, vk::AccessFlags2::NONE);
    assert_eq!(masks.dst_access, vk::AccessFlags2::NONE);
    assert_eq!(masks.dst_stage, vk::PipelineStageFlags2::TRANSFER);
}

#[test]
fn test_empty_lists_give_none() {
    let masks = barrier_masks(&[], &[]).unwrap();
    assert_eq!(masks.src_stage, vk::PipelineStageFlags2::NONE);
    assert_eq!(masks.dst_stage, vk::PipelineStageFlags2::NONE);
    assert_eq!(resolve_layout(&[], ImageLayout::Optimal).unwrap(), vk::ImageLayout::UNDEFINED);
}

#[test]
fn test_write_mixed_with_other_access_is_rejected() {
    let result = barrier_masks(
        &[AccessType::WriteTransfer, AccessType::ReadTransfer],
        &[AccessType::ReadAnyShader],
    );
    assert!(matches!(result, Err(Error::InvalidBarrier(_))));

    let result = barrier_masks(
        &[AccessType::ReadTransfer],
        &[AccessType::ReadFragmentShader, AccessType::WriteColorAttachment],
    );
    assert!(matches!(result, Err(Error::InvalidBarrier(_))));
}

// ============================================================================
// IMAGE BARRIERS
// ============================================================================

#[test]
fn test_image_barrier_layouts() {
    let barrier = create_image_memory_barrier(
        &[AccessType::WriteTransfer],
        &[AccessType::ReadAnyShader],
        ImageLayout::Optimal,
        ImageLayout::Optimal,
        false,
        vk::Image::null(),
        color_range(),
        vk::QUEUE_FAMILY_IGNORED,
        vk::QUEUE_FAMILY_IGNORED,
    )
    .unwrap();
    assert_eq!(barrier.old_layout, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
    assert_eq!(barrier.new_layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
    assert_eq!(barrier.src_access_mask, vk::AccessFlags2::TRANSFER_WRITE);
}

#[test]
fn test_discard_forces_undefined_old_layout() {
    let barrier = create_image_memory_barrier(
        &[AccessType::WriteColorAttachment],
        &[AccessType::WriteColorAttachment],
        ImageLayout::Optimal,
        ImageLayout::Optimal,
        true,
        vk::Image::null(),
        color_range(),
        vk::QUEUE_FAMILY_IGNORED,
        vk::QUEUE_FAMILY_IGNORED,
    )
    .unwrap();
    assert_eq!(barrier.old_layout, vk::ImageLayout::UNDEFINED);
    assert_eq!(barrier.new_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
}

#[test]
fn test_present_transition() {
    let barrier = create_image_memory_barrier(
        &[AccessType::WriteColorAttachment],
        &[AccessType::ReadPresent],
        ImageLayout::Optimal,
        ImageLayout::Optimal,
        false,
        vk::Image::null(),
        color_range(),
        vk::QUEUE_FAMILY_IGNORED,
        vk::QUEUE_FAMILY_IGNORED,
    )
    .unwrap();
    assert_eq!(barrier.old_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
    assert_eq!(barrier.new_layout, vk::ImageLayout::PRESENT_SRC_KHR);
    assert_eq!(barrier.dst_stage_mask, vk::PipelineStageFlags2::NONE);
    assert_eq!(barrier.dst_access_mask, vk::AccessFlags2::NONE);
}

#[test]
fn test_mixed_layouts_are_rejected() {
    let result = create_image_memory_barrier(
        &[AccessType::WriteTransfer],
        &[AccessType::ReadTransfer, AccessType::ReadFragmentShader],
        ImageLayout::Optimal,
        ImageLayout::Optimal,
        false,
        vk::Image::null(),
        color_range(),
        vk::QUEUE_FAMILY_IGNORED,
        vk::QUEUE_FAMILY_IGNORED,
    );
    assert!(matches!(result, Err(Error::InvalidBarrier(_))));
}

#[test]
fn test_general_policy_accepts_mixed_reads() {
    let barrier = create_image_memory_barrier(
        &[AccessType::WriteTransfer],
        &[AccessType::ReadTransfer, AccessType::ReadFragmentShader],
        ImageLayout::General,
        ImageLayout::General,
        false,
        vk::Image::null(),
        color_range(),
        vk::QUEUE_FAMILY_IGNORED,
        vk::QUEUE_FAMILY_IGNORED,
    )
    .unwrap();
    assert_eq!(barrier.old_layout, vk::ImageLayout::GENERAL);
    assert_eq!(barrier.new_layout, vk::ImageLayout::GENERAL);
}

// ============================================================================
// BUFFER / MEMORY BARRIERS
// ============================================================================

#[test]
fn test_buffer_barrier_carries_range_and_families() {
    let barrier = create_buffer_memory_barrier(
        &[AccessType::WriteTransfer],
        &[AccessType::ReadVertexShader],
        vk::Buffer::null(),
        256,
        1024,
        0,
        2,
    )
    .unwrap();
    assert_eq!(barrier.offset, 256);
    assert_eq!(barrier.size, 1024);
    assert_eq!(barrier.src_queue_family_index, 0);
    assert_eq!(barrier.dst_queue_family_index, 2);
    assert_eq!(barrier.dst_access_mask, vk::AccessFlags2::SHADER_READ);
}

#[test]
fn test_memory_barrier_host_write() {
    let barrier = create_memory_barrier(&[AccessType::WriteHost], &[AccessType::ReadIndexBuffer]).unwrap();
    assert_eq!(barrier.src_stage_mask, vk::PipelineStageFlags2::HOST);
    assert_eq!(barrier.src_access_mask, vk::AccessFlags2::HOST_WRITE);
    assert_eq!(barrier.dst_stage_mask, vk::PipelineStageFlags2::INDEX_INPUT);
    assert_eq!(barrier.dst_access_mask, vk::AccessFlags2::INDEX_READ);
}
