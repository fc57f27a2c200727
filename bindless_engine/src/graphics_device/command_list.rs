/// CommandList trait - draw-time commands handed to the draw recorder

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{Buffer, DescriptorSet, Pipeline};

/// Viewport
///
/// A negative `height` flips the Y axis (Vulkan 1.1+ / VK_KHR_maintenance1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-target viewport with Y pointing up: `y = height`, `height = -height`
    pub fn flipped(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: height as f32,
            width: width as f32,
            height: -(height as f32),
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Scissor rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    pub fn from_extent(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

/// Commands recorded inside the frame's dynamic rendering scope
///
/// Barriers, attachment setup and begin/end are owned by the frame backend;
/// the draw recorder only sees what it needs to issue draws.
pub trait CommandList {
    /// Bind a graphics pipeline
    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()>;

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()>;

    /// Bind the frame slot's bindless set at set index 0
    ///
    /// # Arguments
    ///
    /// * `pipeline` - Pipeline whose layout the set is compatible with
    /// * `set` - Descriptor set of the current frame slot
    fn bind_descriptor_set(
        &mut self,
        pipeline: &Arc<dyn Pipeline>,
        set: &Arc<dyn DescriptorSet>,
    ) -> Result<()>;

    /// Bind a 32-bit index buffer
    fn bind_index_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()>;

    /// Push constants to the bound pipeline (vertex + fragment stages)
    fn push_constants(&mut self, offset: u32, data: &[u8]) -> Result<()>;

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()>;
}
