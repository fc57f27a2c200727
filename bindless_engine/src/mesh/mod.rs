//! Mesh ingestion boundary
//!
//! Model loaders hand over raw vertex bytes tagged with a [`VertexType`]
//! plus 32-bit indices; the resource manager copies them into the
//! bindless vertex and index buffers.

pub mod vertex;
pub mod mesh_data;
pub mod cube;

pub use vertex::*;
pub use mesh_data::{MeshData, DrawParams};
pub use cube::{cube, CUBE_INDICES, CUBE_VERTICES};

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
