/// Bindless descriptor set abstraction and the fixed slot layout

use std::any::Any;

/// Slot 0: global constants (uniform buffer, one per frame slot)
pub const BINDING_GLOBAL_CONSTANTS: u32 = 0;
/// Slot 1: vertex storage buffer (shared by every frame slot)
pub const BINDING_VERTICES: u32 = 1;
/// Slot 2: material storage buffer (one per frame slot)
pub const BINDING_MATERIALS: u32 = 2;
/// Slot 3: transform storage buffer (one per frame slot)
pub const BINDING_TRANSFORMS: u32 = 3;
/// Slot 4: immutable sampler array
pub const BINDING_SAMPLERS: u32 = 4;
/// Slot 5: variable-count sampled image array
pub const BINDING_TEXTURES: u32 = 5;

/// Kind of descriptor a buffer binding uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferBindingKind {
    Uniform,
    Storage,
}

impl BufferBindingKind {
    /// Descriptor kind of a fixed buffer slot, `None` for the sampler/texture slots
    pub fn for_binding(binding: u32) -> Option<Self> {
        match binding {
            BINDING_GLOBAL_CONSTANTS => Some(BufferBindingKind::Uniform),
            BINDING_VERTICES | BINDING_MATERIALS | BINDING_TRANSFORMS => {
                Some(BufferBindingKind::Storage)
            }
            _ => None,
        }
    }
}

/// Shape of the bindless descriptor sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindlessLayoutDesc {
    /// One set per frame in flight
    pub frames: usize,
    /// Variable descriptor count of slot 5
    pub max_textures: u32,
}

/// One bindless descriptor set
///
/// Sets are bound once per frame with `CommandList::bind_descriptor_set`;
/// the backend keeps the actual handle.
pub trait DescriptorSet: Send + Sync {
    /// Frame slot this set belongs to
    fn frame_slot(&self) -> usize;

    /// Downcast hook for backends
    fn as_any(&self) -> &dyn Any;
}
