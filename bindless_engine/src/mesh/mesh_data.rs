/// Mesh ingestion boundary and per-draw parameters

use bytemuck::{Pod, Zeroable};

use crate::error::{Error, Result};
use crate::mesh::{Vertex, VertexType};

/// Raw mesh handed over by a model loader
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertex_type: VertexType,
    /// Tightly packed vertices of `vertex_type`
    pub vertices: Vec<u8>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build from typed vertices
    pub fn from_vertices<V: Vertex>(vertices: &[V], indices: &[u32]) -> Self {
        Self {
            vertex_type: V::TYPE,
            vertices: bytemuck::cast_slice(vertices).to_vec(),
            indices: indices.to_vec(),
        }
    }

    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / self.vertex_type.stride() as usize) as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Reject meshes the GPU would read out of bounds
    ///
    /// # Errors
    ///
    /// - no vertices or no indices
    /// - vertex bytes not a multiple of the stride
    /// - an index past the last vertex
    pub fn validate(&self) -> Result<()> {
        let stride = self.vertex_type.stride() as usize;
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(Error::InvalidResource("Mesh has no vertices or no indices".to_string()));
        }
        if self.vertices.len() % stride != 0 {
            return Err(Error::InvalidResource(format!(
                "Mesh vertex data is {} bytes, not a multiple of the {:?} stride {}",
                self.vertices.len(),
                self.vertex_type,
                stride
            )));
        }
        let vertex_count = self.vertex_count();
        if let Some(index) = self.indices.iter().find(|i| **i >= vertex_count) {
            return Err(Error::InvalidResource(format!(
                "Mesh index {} is out of range ({} vertices)",
                index, vertex_count
            )));
        }
        Ok(())
    }
}

/// Push constants of one bindless draw
///
/// All fields are bindless handles: byte offsets into the vertex, material
/// and transform buffers, and an index into the texture array.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawParams {
    pub vertex_offset: u32,
    pub material: u32,
    pub transform: u32,
    pub texture: u32,
}

impl DrawParams {
    pub const SIZE: u32 = std::mem::size_of::<Self>() as u32;
}
