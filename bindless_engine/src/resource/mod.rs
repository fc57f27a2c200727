//! Bindless resource management
//!
//! Arena pools over the big GPU buffers, double-buffered frame resources,
//! the texture table and the descriptor sets tying them together.

pub mod allocation_table;
pub mod frame_resources;
pub mod texture_table;
pub mod bindless_descriptors;
mod resource_manager;

pub use allocation_table::{AllocationTable, ArenaPool, PoolKind};
pub use frame_resources::{FrameResourceSet, FrameResources, GlobalConstants};
pub use texture_table::{TextureEntry, TextureTable};
pub use bindless_descriptors::BindlessDescriptors;
pub use resource_manager::{BoundResources, MeshHandle, ResourceManager};
