/// CommandList - draw commands inside a frame's dynamic rendering scope
///
/// Handed to the draw recorder by the frame backend between
/// `vkCmdBeginRendering` and `vkCmdEndRendering`. It borrows the slot's
/// command buffer for the duration of the callback only.

use bindless_engine::bindless::{Result, Error};
use bindless_engine::bindless::render::{
    CommandList as RendererCommandList,
    Pipeline as RendererPipeline,
    Buffer as RendererBuffer,
    DescriptorSet as RendererDescriptorSet,
    Texture as RendererTexture,
    Viewport, Rect2D,
};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_buffer::Buffer;
use crate::vulkan_descriptor_set::DescriptorSet;
use crate::vulkan_pipeline::{Pipeline, PUSH_CONSTANT_STAGES};
use crate::vulkan_texture::Texture;

pub(crate) fn as_vulkan_pipeline(pipeline: &Arc<dyn RendererPipeline>) -> Result<&Pipeline> {
    pipeline
        .as_any()
        .downcast_ref::<Pipeline>()
        .ok_or_else(|| Error::InvalidResource("Pipeline was not created by the Vulkan device".to_string()))
}

pub(crate) fn as_vulkan_buffer(buffer: &Arc<dyn RendererBuffer>) -> Result<&Buffer> {
    buffer
        .as_any()
        .downcast_ref::<Buffer>()
        .ok_or_else(|| Error::InvalidResource("Buffer was not created by the Vulkan device".to_string()))
}

pub(crate) fn as_vulkan_texture(texture: &Arc<dyn RendererTexture>) -> Result<&Texture> {
    texture
        .as_any()
        .downcast_ref::<Texture>()
        .ok_or_else(|| Error::InvalidResource("Texture was not created by the Vulkan device".to_string()))
}

pub(crate) fn as_vulkan_descriptor_set(set: &Arc<dyn RendererDescriptorSet>) -> Result<&DescriptorSet> {
    set.as_any()
        .downcast_ref::<DescriptorSet>()
        .ok_or_else(|| Error::InvalidResource("Descriptor set was not created by the Vulkan device".to_string()))
}

/// Vulkan command list implementation
pub struct CommandList<'a> {
    device: &'a ash::Device,
    command_buffer: vk::CommandBuffer,
    /// Layout and push constant size of the bound pipeline
    bound_pipeline: Option<(vk::PipelineLayout, u32)>,
}

impl<'a> CommandList<'a> {
    /// Wrap a command buffer that is recording inside a rendering scope
    pub(crate) fn new(device: &'a ash::Device, command_buffer: vk::CommandBuffer) -> Self {
        Self {
            device,
            command_buffer,
            bound_pipeline: None,
        }
    }

    fn bound_layout(&self) -> Result<(vk::PipelineLayout, u32)> {
        self.bound_pipeline
            .ok_or_else(|| Error::InvalidResource("No pipeline bound".to_string()))
    }
}

impl RendererCommandList for CommandList<'_> {
    fn bind_pipeline(&mut self, pipeline: &Arc<dyn RendererPipeline>) -> Result<()> {
        let vk_pipeline = as_vulkan_pipeline(pipeline)?;
        unsafe {
            self.device.cmd_bind_pipeline(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                vk_pipeline.pipeline,
            );
        }
        self.bound_pipeline = Some((vk_pipeline.pipeline_layout, vk_pipeline.push_constant_size));
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        let vk_viewport = vk::Viewport {
            x: viewport.x,
            y: viewport.y,
            width: viewport.width,
            height: viewport.height,
            min_depth: viewport.min_depth,
            max_depth: viewport.max_depth,
        };
        unsafe {
            self.device.cmd_set_viewport(self.command_buffer, 0, &[vk_viewport]);
        }
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        let vk_scissor = vk::Rect2D {
            offset: vk::Offset2D { x: scissor.x, y: scissor.y },
            extent: vk::Extent2D { width: scissor.width, height: scissor.height },
        };
        unsafe {
            self.device.cmd_set_scissor(self.command_buffer, 0, &[vk_scissor]);
        }
        Ok(())
    }

    fn bind_descriptor_set(
        &mut self,
        pipeline: &Arc<dyn RendererPipeline>,
        set: &Arc<dyn RendererDescriptorSet>,
    ) -> Result<()> {
        let vk_pipeline = as_vulkan_pipeline(pipeline)?;
        let vk_set = as_vulkan_descriptor_set(set)?;
        unsafe {
            self.device.cmd_bind_descriptor_sets(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                vk_pipeline.pipeline_layout,
                0, // first_set
                &[vk_set.set],
                &[], // dynamic_offsets
            );
        }
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: &Arc<dyn RendererBuffer>, offset: u64) -> Result<()> {
        let vk_buffer = as_vulkan_buffer(buffer)?;
        unsafe {
            self.device.cmd_bind_index_buffer(
                self.command_buffer,
                vk_buffer.buffer,
                offset,
                vk::IndexType::UINT32,
            );
        }
        Ok(())
    }

    fn push_constants(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        let (layout, size) = self.bound_layout()?;
        let end = offset as u64 + data.len() as u64;
        if end > size as u64 {
            return Err(Error::InvalidResource(format!(
                "Push constants {}..{} exceed the pipeline's {} byte range",
                offset, end, size
            )));
        }
        unsafe {
            self.device.cmd_push_constants(self.command_buffer, layout, PUSH_CONSTANT_STAGES, offset, data);
        }
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        self.bound_layout()?;
        unsafe {
            self.device.cmd_draw_indexed(
                self.command_buffer,
                index_count,
                1, // instance_count
                first_index,
                vertex_offset,
                0, // first_instance
            );
        }
        Ok(())
    }
}
