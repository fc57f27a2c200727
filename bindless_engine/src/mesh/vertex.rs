/// Vertex layouts pulled from the bindless vertex buffer
///
/// Shaders read vertices from a storage buffer, so layouts are plain
/// tightly-packed `#[repr(C)]` structs of 32-bit floats.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Tag describing how the bytes of a mesh are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexType {
    P3,
    P3U2,
    P3N3,
    P3N3U2,
    P3N3T3,
    P3N3T3U2,
}

impl VertexType {
    /// Size of one vertex in bytes
    pub fn stride(self) -> u32 {
        match self {
            VertexType::P3 => 12,
            VertexType::P3U2 => 20,
            VertexType::P3N3 => 24,
            VertexType::P3N3U2 => 32,
            VertexType::P3N3T3 => 36,
            VertexType::P3N3T3U2 => 44,
        }
    }

    pub fn has_normal(self) -> bool {
        !matches!(self, VertexType::P3 | VertexType::P3U2)
    }

    pub fn has_tangent(self) -> bool {
        matches!(self, VertexType::P3N3T3 | VertexType::P3N3T3U2)
    }

    pub fn has_texcoord(self) -> bool {
        matches!(self, VertexType::P3U2 | VertexType::P3N3U2 | VertexType::P3N3T3U2)
    }
}

/// A vertex struct with a known layout tag
pub trait Vertex: Pod {
    const TYPE: VertexType;
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexP3 {
    pub position: Vec3,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexP3U2 {
    pub position: Vec3,
    pub texcoord: Vec2,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexP3N3 {
    pub position: Vec3,
    pub normal: Vec3,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexP3N3U2 {
    pub position: Vec3,
    pub normal: Vec3,
    pub texcoord: Vec2,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexP3N3T3 {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexP3N3T3U2 {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub texcoord: Vec2,
}

impl Vertex for VertexP3 {
    const TYPE: VertexType = VertexType::P3;
}

impl Vertex for VertexP3U2 {
    const TYPE: VertexType = VertexType::P3U2;
}

impl Vertex for VertexP3N3 {
    const TYPE: VertexType = VertexType::P3N3;
}

impl Vertex for VertexP3N3U2 {
    const TYPE: VertexType = VertexType::P3N3U2;
}

impl Vertex for VertexP3N3T3 {
    const TYPE: VertexType = VertexType::P3N3T3;
}

impl Vertex for VertexP3N3T3U2 {
    const TYPE: VertexType = VertexType::P3N3T3U2;
}
