/// Tests for ResourceManager
///
/// These tests use MockGraphicsDevice to test ResourceManager logic without requiring a GPU.

use super::*;
use crate::graphics_device::mock_graphics_device::{
    MockCommandList, MockDescriptorWrite, MockGraphicsDevice,
};
use crate::graphics_device::{CommandList, CullMode, FrontFace, PipelineDesc, Rect2D, Viewport};
use crate::mesh::{self, DrawParams};
use glam::{Mat4, Vec4};

// ============================================================================
// Helper Functions
// ============================================================================

/// Create a MockGraphicsDevice, keeping a concrete handle for inspection
fn create_mock_device() -> (Arc<Mutex<MockGraphicsDevice>>, Arc<Mutex<dyn GraphicsDevice>>) {
    let mock = MockGraphicsDevice::shared();
    let device: Arc<Mutex<dyn GraphicsDevice>> = mock.clone();
    (mock, device)
}

fn small_config() -> ResourceConfig {
    ResourceConfig {
        vertex_pool_size: 4096,
        index_pool_size: 1024,
        material_pool_size: 256,
        transform_pool_size: 256,
        max_textures: 4,
        frames_in_flight: 2,
    }
}

fn create_manager() -> (Arc<Mutex<MockGraphicsDevice>>, ResourceManager) {
    let (mock, device) = create_mock_device();
    let manager = ResourceManager::new(device, small_config()).unwrap();
    (mock, manager)
}

fn checker(width: u32, height: u32) -> TextureSource {
    TextureSource::new(vec![0xAB; (width * height * 4) as usize], width, height).unwrap()
}

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_new_creates_bindless_buffers_and_sets() {
    let (mock, manager) = create_manager();
    let mock = mock.lock().unwrap();

    let vertices = mock.buffer("bindless.vertices").unwrap();
    assert_eq!(vertices.desc.size, 4096);
    assert_eq!(vertices.desc.location, MemoryLocation::GpuOnly);
    let indices = mock.buffer("bindless.indices").unwrap();
    assert!(indices.desc.usage.contains(BufferUsage::INDEX));

    assert_eq!(mock.descriptor_sets.len(), 2);
    assert_eq!(manager.frames_in_flight(), 2);
    // 2 shared + 3 per frame
    assert_eq!(mock.buffers.len(), 8);
}

#[test]
fn test_new_rejects_invalid_config() {
    let (_mock, device) = create_mock_device();
    let config = ResourceConfig { frames_in_flight: 0, ..small_config() };
    assert!(ResourceManager::new(device, config).is_err());
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_vertices_round_trip_through_upload() {
    let (mock, mut manager) = create_manager();
    let first = manager.create_vertices(&[1, 2, 3, 4, 5, 6]).unwrap();
    let second = manager.create_vertices(&[7, 8, 9, 10]).unwrap();

    assert_eq!(first, 0);
    assert_eq!(second, 8);

    let mock = mock.lock().unwrap();
    let vertices = mock.buffer("bindless.vertices").unwrap();
    assert_eq!(vertices.contents(0, 6), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(vertices.contents(8, 4), vec![7, 8, 9, 10]);
    assert_eq!(mock.buffer_upload_count, 2);
}

#[test]
fn test_indices_are_uploaded_as_u32() {
    let (mock, mut manager) = create_manager();
    let offset = manager.create_indices(&[1, 0, 2]).unwrap();

    let mock = mock.lock().unwrap();
    let bytes = mock.buffer("bindless.indices").unwrap().contents(offset as u64, 12);
    let indices: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    assert_eq!(indices, vec![1, 0, 2]);
}

#[test]
fn test_vertex_pool_exhaustion_leaves_buffer_untouched() {
    let (mock, mut manager) = create_manager();
    manager.create_vertices(&[0xFF; 4000]).unwrap();

    let err = manager.create_vertices(&[1; 200]).unwrap_err();
    assert!(matches!(err, Error::PoolExhausted { pool: PoolKind::Vertex, .. }));
    assert_eq!(manager.pool(PoolKind::Vertex).used(), 4000);
    assert_eq!(mock.lock().unwrap().buffer_upload_count, 1);
}

#[test]
fn test_create_mesh_reports_offsets() {
    let (_mock, mut manager) = create_manager();
    manager.create_indices(&[0, 1, 2]).unwrap();

    let handle = manager.create_mesh(&mesh::cube()).unwrap();
    assert_eq!(handle.vertex_offset, 0);
    assert_eq!(handle.index_offset, 12);
    assert_eq!(handle.first_index, 3);
    assert_eq!(handle.index_count, 36);
    assert_eq!(handle.vertex_count, 36);
}

#[test]
fn test_create_mesh_rejects_invalid_mesh() {
    let (_mock, mut manager) = create_manager();
    let broken = MeshData { vertex_type: VertexType::P3, vertices: vec![0; 12], indices: vec![3] };
    assert!(manager.create_mesh(&broken).is_err());
    assert_eq!(manager.pool(PoolKind::Vertex).used(), 0);
}

// ============================================================================
// Materials / Transforms
// ============================================================================

#[test]
fn test_material_written_to_every_slot() {
    let (mock, mut manager) = create_manager();
    let handle = manager.create_material(&[3; 16]).unwrap();
    let second = manager.create_material(&[4; 4]).unwrap();

    assert_eq!(handle, 0);
    assert_eq!(second, 16);
    let mock = mock.lock().unwrap();
    for slot in 0..2 {
        let buffer = mock.buffer(&format!("frame{}.materials", slot)).unwrap();
        assert_eq!(buffer.contents(0, 16), vec![3; 16]);
    }
}

#[test]
fn test_transform_registered_while_slot_in_flight() {
    let (mock, mut manager) = create_manager();
    manager.end_frame(0).unwrap();

    let handle = manager.create_transform(&[7; 64]).unwrap();
    {
        let mock = mock.lock().unwrap();
        assert_eq!(mock.buffer("frame0.transforms").unwrap().contents(0, 4), vec![0; 4]);
        assert_eq!(mock.buffer("frame1.transforms").unwrap().contents(0, 4), vec![7; 4]);
    }

    manager.begin_frame(0).unwrap();
    let mock = mock.lock().unwrap();
    assert_eq!(mock.buffer("frame0.transforms").unwrap().contents(handle as u64, 64), vec![7; 64]);
}

#[test]
fn test_update_transform_respects_in_flight_slot() {
    let (_mock, mut manager) = create_manager();
    let handle = manager.create_transform(&[0; 64]).unwrap();
    manager.end_frame(1).unwrap();

    assert_eq!(
        manager.update_transform(1, handle, &[1; 64]),
        Err(Error::FrameSlotInFlight(1))
    );
    assert!(manager.update_transform(0, handle, &[1; 64]).is_ok());
}

#[test]
fn test_update_material_writes_only_idle_slot() {
    let (mock, mut manager) = create_manager();
    let handle = manager.create_material(&[0; 16]).unwrap();
    manager.end_frame(1).unwrap();

    assert_eq!(
        manager.update_material(1, handle, &[9; 16]),
        Err(Error::FrameSlotInFlight(1))
    );
    manager.update_material(0, handle, &[9; 16]).unwrap();

    let mock = mock.lock().unwrap();
    let idle = mock.buffer("frame0.materials").unwrap().contents(handle as u64, 16);
    let in_flight = mock.buffer("frame1.materials").unwrap().contents(handle as u64, 16);
    assert_eq!(idle, vec![9; 16]);
    assert_eq!(in_flight, vec![0; 16]);
}

// ============================================================================
// Textures
// ============================================================================

#[test]
fn test_texture_bound_in_every_set() {
    let (mock, mut manager) = create_manager();
    let index = manager
        .create_texture("checker", &checker(8, 8), TextureOptions::default())
        .unwrap();

    assert_eq!(index, 0);
    assert_eq!(manager.texture_count(), 1);
    let mock = mock.lock().unwrap();
    assert_eq!(mock.texture_upload_count, 1);
    for set in &mock.descriptor_sets {
        assert!(set
            .writes()
            .contains(&MockDescriptorWrite::Texture { index: 0, name: "checker".to_string() }));
    }
}

#[test]
fn test_texture_mips_and_format() {
    let (_mock, mut manager) = create_manager();
    let options = TextureOptions { linear: true, generate_mips: true };
    let index = manager.create_texture("normal", &checker(64, 16), options).unwrap();

    let info = manager.texture(index).unwrap().info().clone();
    assert_eq!(info.mip_levels, 5);
    assert_eq!(info.format, TextureFormat::R8G8B8A8_UNORM);
    assert!(info.usage.contains(TextureUsage::TRANSFER_SRC));

    let plain = manager
        .create_texture("albedo", &checker(64, 16), TextureOptions::default())
        .unwrap();
    let info = manager.texture(plain).unwrap().info().clone();
    assert_eq!(info.mip_levels, 1);
    assert_eq!(info.format, TextureFormat::R8G8B8A8_SRGB);
    assert!(!info.usage.contains(TextureUsage::TRANSFER_SRC));
}

#[test]
fn test_texture_table_full() {
    let (mock, mut manager) = create_manager();
    for i in 0..4 {
        manager
            .create_texture(&format!("t{}", i), &checker(1, 1), TextureOptions::default())
            .unwrap();
    }

    let result = manager.create_texture("overflow", &checker(1, 1), TextureOptions::default());
    assert_eq!(result, Err(Error::TextureTableFull { capacity: 4 }));
    // Nothing was created on the device for the rejected texture
    assert_eq!(mock.lock().unwrap().textures.len(), 4);
}

#[test]
fn test_zero_texture_capacity_rejects_every_texture() {
    let (_mock, device) = create_mock_device();
    let config = ResourceConfig { max_textures: 0, ..small_config() };
    let mut manager = ResourceManager::new(device, config).unwrap();

    assert_eq!(
        manager.create_texture("any", &checker(2, 2), TextureOptions::default()),
        Err(Error::TextureTableFull { capacity: 0 })
    );
}

// ============================================================================
// Frames
// ============================================================================

#[test]
fn test_global_constants_per_slot() {
    let (mock, mut manager) = create_manager();
    let constants = GlobalConstants {
        eye_position: Vec4::new(0.0, 0.0, 5.0, 0.0),
        view_proj: Mat4::IDENTITY,
    };
    manager.write_global_constants(1, &constants).unwrap();

    let mock = mock.lock().unwrap();
    let bytes = mock.buffer("frame1.constants").unwrap().contents(0, 80);
    assert_eq!(bytes, bytemuck::bytes_of(&constants).to_vec());
}

#[test]
fn test_bound_resources_follow_slot() {
    let (_mock, manager) = create_manager();
    let bound = manager.bound_resources(1).unwrap();
    assert_eq!(bound.frame_slot, 1);
    assert_eq!(bound.descriptor_set.frame_slot(), 1);
    assert!(Arc::ptr_eq(&bound.index_buffer, manager.index_buffer()));
    assert!(manager.bound_resources(2).is_err());
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_cube_draw_end_to_end() {
    let (mock, mut manager) = create_manager();
    manager.create_vertices(&[0; 40]).unwrap();
    let cube = manager.create_mesh(&mesh::cube()).unwrap();
    let transform = manager
        .create_transform(bytemuck::bytes_of(&Mat4::IDENTITY))
        .unwrap();

    let pipeline = mock
        .lock()
        .unwrap()
        .create_pipeline(PipelineDesc {
            name: "cube".to_string(),
            vertex_spirv: Vec::new(),
            fragment_spirv: Vec::new(),
            color_format: TextureFormat::B8G8R8A8_SRGB,
            depth_format: Some(TextureFormat::D32_SFLOAT_S8_UINT),
            samples: 8,
            cull_mode: CullMode::Back,
            front_face: FrontFace::Clockwise,
            push_constant_size: DrawParams::SIZE,
        })
        .unwrap();

    let frame_count = 3u64;
    let slot = manager.frames().slot_for_frame(frame_count);
    let bound = manager.bound_resources(slot).unwrap();
    let params = DrawParams {
        vertex_offset: cube.vertex_offset,
        transform,
        ..Default::default()
    };

    let mut cmd = MockCommandList::new();
    cmd.bind_pipeline(&pipeline).unwrap();
    cmd.set_viewport(Viewport::flipped(640, 480)).unwrap();
    cmd.set_scissor(Rect2D::from_extent(640, 480)).unwrap();
    cmd.bind_descriptor_set(&pipeline, &bound.descriptor_set).unwrap();
    cmd.bind_index_buffer(&bound.index_buffer, 0).unwrap();
    cmd.push_constants(0, bytemuck::bytes_of(&params)).unwrap();
    cmd.draw_indexed(cube.index_count, cube.first_index, 0).unwrap();

    assert_eq!(cube.vertex_offset, 40);
    assert_eq!(cube.index_count, 36);
    assert!(cmd.commands.contains(&"bind_descriptor_set(slot 1)".to_string()));
    assert!(cmd.commands.contains(&"bind_index_buffer(bindless.indices, 0)".to_string()));
    assert_eq!(cmd.commands.last().unwrap(), "draw_indexed(36, 0, 0)");

    let pushed: DrawParams = bytemuck::pod_read_unaligned(&cmd.push_constant_data[0]);
    assert_eq!(pushed.vertex_offset, 40);
    assert_eq!(pushed.transform, transform);
}
