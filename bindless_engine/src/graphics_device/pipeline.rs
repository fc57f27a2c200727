/// Pipeline trait and pipeline descriptor

use std::any::Any;

use crate::graphics_device::TextureFormat;

/// Face culling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Winding order of front faces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    CounterClockwise,
    Clockwise,
}

/// Graphics pipeline descriptor
///
/// Vertices are pulled from the bindless vertex buffer, so there is no
/// vertex input state. The pipeline layout is the bindless set layout plus
/// one push constant range.
#[derive(Debug, Clone)]
pub struct PipelineDesc {
    pub name: String,
    /// SPIR-V words of the vertex stage (entry point `main`)
    pub vertex_spirv: Vec<u32>,
    /// SPIR-V words of the fragment stage (entry point `main`)
    pub fragment_spirv: Vec<u32>,
    /// Color attachment format (dynamic rendering)
    pub color_format: TextureFormat,
    /// Depth/stencil attachment format, `None` disables depth testing
    pub depth_format: Option<TextureFormat>,
    /// Rasterization samples, 1 disables MSAA
    pub samples: u32,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    /// Size of the push constant range in bytes, 0 for none
    pub push_constant_size: u32,
}

/// Compiled graphics pipeline
pub trait Pipeline: Send + Sync {
    /// Downcast hook for backends
    fn as_any(&self) -> &dyn Any;
}
