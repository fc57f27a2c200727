/// Unit cube (half-extent 1) with flat face normals

use glam::Vec3;

use crate::mesh::{MeshData, VertexP3N3};

const fn v(position: [f32; 3], normal: [f32; 3]) -> VertexP3N3 {
    VertexP3N3 {
        position: Vec3::from_array(position),
        normal: Vec3::from_array(normal),
    }
}

const NEG_Y: [f32; 3] = [0.0, -1.0, 0.0];
const POS_Y: [f32; 3] = [0.0, 1.0, 0.0];
const POS_X: [f32; 3] = [1.0, 0.0, 0.0];
const NEG_X: [f32; 3] = [-1.0, 0.0, 0.0];
const POS_Z: [f32; 3] = [0.0, 0.0, 1.0];
const NEG_Z: [f32; 3] = [0.0, 0.0, -1.0];

/// 36 vertices, two triangles per face
pub const CUBE_VERTICES: [VertexP3N3; 36] = [
    v([1.0, -1.0, 1.0], NEG_Y),
    v([-1.0, -1.0, 1.0], NEG_Y),
    v([-1.0, -1.0, -1.0], NEG_Y),
    v([-1.0, 1.0, -1.0], POS_Y),
    v([-1.0, 1.0, 1.0], POS_Y),
    v([1.0, 1.0, 1.0], POS_Y),
    v([1.0, 1.0, -1.0], POS_X),
    v([1.0, 1.0, 1.0], POS_X),
    v([1.0, -1.0, 1.0], POS_X),
    v([1.0, 1.0, 1.0], POS_Z),
    v([-1.0, 1.0, 1.0], POS_Z),
    v([-1.0, -1.0, 1.0], POS_Z),
    v([-1.0, -1.0, 1.0], NEG_X),
    v([-1.0, 1.0, 1.0], NEG_X),
    v([-1.0, 1.0, -1.0], NEG_X),
    v([1.0, -1.0, -1.0], NEG_Z),
    v([-1.0, -1.0, -1.0], NEG_Z),
    v([-1.0, 1.0, -1.0], NEG_Z),
    v([1.0, -1.0, -1.0], NEG_Y),
    v([1.0, -1.0, 1.0], NEG_Y),
    v([-1.0, -1.0, -1.0], NEG_Y),
    v([1.0, 1.0, -1.0], POS_Y),
    v([-1.0, 1.0, -1.0], POS_Y),
    v([1.0, 1.0, 1.0], POS_Y),
    v([1.0, -1.0, -1.0], POS_X),
    v([1.0, 1.0, -1.0], POS_X),
    v([1.0, -1.0, 1.0], POS_X),
    v([1.0, -1.0, 1.0], POS_Z),
    v([1.0, 1.0, 1.0], POS_Z),
    v([-1.0, -1.0, 1.0], POS_Z),
    v([-1.0, -1.0, -1.0], NEG_X),
    v([-1.0, -1.0, 1.0], NEG_X),
    v([-1.0, 1.0, -1.0], NEG_X),
    v([1.0, 1.0, -1.0], NEG_Z),
    v([1.0, -1.0, -1.0], NEG_Z),
    v([-1.0, 1.0, -1.0], NEG_Z),
];

/// Each triangle with its first two corners swapped
pub const CUBE_INDICES: [u32; 36] = [
    1, 0, 2,
    4, 3, 5,
    7, 6, 8,
    10, 9, 11,
    13, 12, 14,
    16, 15, 17,
    19, 18, 20,
    22, 21, 23,
    25, 24, 26,
    28, 27, 29,
    31, 30, 32,
    34, 33, 35,
];

pub fn cube() -> MeshData {
    MeshData::from_vertices(&CUBE_VERTICES, &CUBE_INDICES)
}
