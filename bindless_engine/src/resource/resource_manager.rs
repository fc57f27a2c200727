/// Bindless resource manager
///
/// Owns the big GPU buffers (vertices, indices), the per-frame mapped
/// buffers (constants, materials, transforms), the texture table and the
/// descriptor sets that expose all of them to shaders. Everything it hands
/// out is a 32-bit bindless handle.
///
/// # Example
///
/// ```ignore
/// let mut resources = ResourceManager::new(device.clone(), ResourceConfig::default())?;
/// let cube = resources.create_mesh(&mesh::cube())?;
/// let transform = resources.create_transform(bytemuck::bytes_of(&Mat4::IDENTITY))?;
/// ```

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ResourceConfig;
use crate::error::{Error, Result};
use crate::graphics_device::{
    mip_level_count, Buffer, BufferDesc, BufferUsage, DescriptorSet, GraphicsDevice,
    MemoryLocation, Texture, TextureDesc, TextureFormat, TextureOptions, TextureSource,
    TextureUsage,
};
use crate::mesh::{MeshData, VertexType};
use crate::resource::{
    AllocationTable, ArenaPool, BindlessDescriptors, FrameResourceSet, GlobalConstants, PoolKind,
    TextureTable,
};
use crate::{engine_debug, engine_info};

/// Where a mesh landed in the bindless buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHandle {
    /// Byte offset of the first vertex in the vertex buffer
    pub vertex_offset: u32,
    /// Byte offset of the first index in the index buffer
    pub index_offset: u32,
    /// `index_offset` in index elements, for `draw_indexed`
    pub first_index: u32,
    pub index_count: u32,
    pub vertex_count: u32,
    pub vertex_type: VertexType,
}

/// What the draw recorder needs for one frame slot
#[derive(Clone)]
pub struct BoundResources {
    pub frame_slot: usize,
    pub descriptor_set: Arc<dyn DescriptorSet>,
    pub index_buffer: Arc<dyn Buffer>,
}

pub struct ResourceManager {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    config: ResourceConfig,
    allocations: AllocationTable,
    vertex_buffer: Arc<dyn Buffer>,
    index_buffer: Arc<dyn Buffer>,
    frames: FrameResourceSet,
    textures: TextureTable,
    descriptors: BindlessDescriptors,
}

impl ResourceManager {
    /// Create the bindless buffers, the frame slots and the descriptor sets
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>, config: ResourceConfig) -> Result<Self> {
        config.validate()?;
        let allocations = AllocationTable::new(&config)?;

        let (vertex_buffer, index_buffer, frames, descriptors) = {
            let mut guard = lock(&device)?;
            let dev: &mut dyn GraphicsDevice = &mut *guard;

            let vertex_buffer = dev.create_buffer(BufferDesc {
                name: "bindless.vertices".to_string(),
                size: config.vertex_pool_size,
                usage: BufferUsage::STORAGE | BufferUsage::TRANSFER_DST,
                location: MemoryLocation::GpuOnly,
            })?;
            let index_buffer = dev.create_buffer(BufferDesc {
                name: "bindless.indices".to_string(),
                size: config.index_pool_size,
                usage: BufferUsage::INDEX | BufferUsage::TRANSFER_DST,
                location: MemoryLocation::GpuOnly,
            })?;
            let frames = FrameResourceSet::new(dev, &config)?;
            let descriptors =
                BindlessDescriptors::build(dev, &frames, &vertex_buffer, config.max_textures)?;

            (vertex_buffer, index_buffer, frames, descriptors)
        };

        engine_info!(
            "bindless::resources",
            "Resource manager ready: {} frames in flight, {} texture slots",
            config.frames_in_flight,
            config.max_textures
        );

        Ok(Self {
            device,
            textures: TextureTable::new(config.max_textures),
            config,
            allocations,
            vertex_buffer,
            index_buffer,
            frames,
            descriptors,
        })
    }

    // ===== GEOMETRY =====

    /// Upload raw vertex bytes, returning their byte offset in the vertex buffer
    pub fn create_vertices(&mut self, data: &[u8]) -> Result<u32> {
        let offset = self.allocations.allocate(PoolKind::Vertex, data.len() as u64)?;
        lock(&self.device)?.upload_buffer(&self.vertex_buffer, offset as u64, data)?;
        Ok(offset)
    }

    /// Upload 32-bit indices, returning their byte offset in the index buffer
    pub fn create_indices(&mut self, indices: &[u32]) -> Result<u32> {
        let data: &[u8] = bytemuck::cast_slice(indices);
        let offset = self.allocations.allocate(PoolKind::Index, data.len() as u64)?;
        lock(&self.device)?.upload_buffer(&self.index_buffer, offset as u64, data)?;
        Ok(offset)
    }

    /// Upload a whole mesh
    pub fn create_mesh(&mut self, mesh: &MeshData) -> Result<MeshHandle> {
        mesh.validate()?;
        let vertex_offset = self.create_vertices(&mesh.vertices)?;
        let index_offset = self.create_indices(&mesh.indices)?;

        engine_debug!(
            "bindless::resources",
            "Mesh uploaded: {} vertices at {}, {} indices at {}",
            mesh.vertex_count(),
            vertex_offset,
            mesh.index_count(),
            index_offset
        );

        Ok(MeshHandle {
            vertex_offset,
            index_offset,
            first_index: index_offset / 4,
            index_count: mesh.index_count(),
            vertex_count: mesh.vertex_count(),
            vertex_type: mesh.vertex_type,
        })
    }

    // ===== MATERIALS / TRANSFORMS =====

    /// Register material bytes in every frame slot
    pub fn create_material(&mut self, data: &[u8]) -> Result<u32> {
        self.create_per_frame(PoolKind::Material, data)
    }

    /// Register transform bytes in every frame slot
    pub fn create_transform(&mut self, data: &[u8]) -> Result<u32> {
        self.create_per_frame(PoolKind::Transform, data)
    }

    /// Overwrite a material in one idle frame slot
    pub fn update_material(&mut self, slot: usize, handle: u32, data: &[u8]) -> Result<()> {
        self.frames.write(slot, PoolKind::Material, handle as u64, data)
    }

    /// Overwrite a transform in one idle frame slot
    pub fn update_transform(&mut self, slot: usize, handle: u32, data: &[u8]) -> Result<()> {
        self.frames.write(slot, PoolKind::Transform, handle as u64, data)
    }

    fn create_per_frame(&mut self, pool: PoolKind, data: &[u8]) -> Result<u32> {
        let offset = self.allocations.allocate(pool, data.len() as u64)?;
        let deferred = self.frames.write_all(pool, offset as u64, data)?;
        if deferred > 0 {
            engine_debug!(
                "bindless::resources",
                "{} handle {} deferred for {} in-flight slot(s)",
                pool,
                offset,
                deferred
            );
        }
        Ok(offset)
    }

    // ===== TEXTURES =====

    /// Upload decoded RGBA8 pixels and bind them in every descriptor set
    ///
    /// Returns the texture's index in the bindless sampled image array.
    pub fn create_texture(
        &mut self,
        name: &str,
        source: &TextureSource,
        options: TextureOptions,
    ) -> Result<u32> {
        source.validate()?;
        let index = self.textures.next_index()?;

        let mip_levels = if options.generate_mips {
            mip_level_count(source.width, source.height)
        } else {
            1
        };
        let mut usage = TextureUsage::SAMPLED | TextureUsage::TRANSFER_DST;
        if mip_levels > 1 {
            usage |= TextureUsage::TRANSFER_SRC;
        }

        let texture = {
            let mut device = lock(&self.device)?;
            let texture = device.create_texture(TextureDesc {
                name: name.to_string(),
                width: source.width,
                height: source.height,
                format: TextureFormat::rgba8(options.linear),
                mip_levels,
                usage,
            })?;
            device.upload_texture(&texture, &source.pixels)?;
            self.descriptors.bind_texture_all(&mut *device, index, &texture)?;
            texture
        };

        self.textures.push(name, texture)?;

        engine_debug!(
            "bindless::resources",
            "Texture '{}' ({}x{}, {} mips) bound at index {}",
            name,
            source.width,
            source.height,
            mip_levels,
            index
        );

        Ok(index)
    }

    pub fn texture(&self, index: u32) -> Option<&Arc<dyn Texture>> {
        self.textures.get(index).map(|entry| &entry.texture)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    // ===== FRAMES =====

    /// The slot's fence was observed signaled; it may be written again
    pub fn begin_frame(&mut self, slot: usize) -> Result<()> {
        self.frames.mark_idle(slot)
    }

    /// The slot was submitted to the GPU
    pub fn end_frame(&mut self, slot: usize) -> Result<()> {
        self.frames.mark_in_flight(slot)
    }

    pub fn write_global_constants(&mut self, slot: usize, constants: &GlobalConstants) -> Result<()> {
        self.frames.write_constants(slot, constants)
    }

    pub fn descriptor_set(&self, slot: usize) -> Result<Arc<dyn DescriptorSet>> {
        self.descriptors.set(slot).cloned()
    }

    /// The index buffer is bound with `bind_index_buffer`, not through a descriptor
    pub fn index_buffer(&self) -> &Arc<dyn Buffer> {
        &self.index_buffer
    }

    pub fn vertex_buffer(&self) -> &Arc<dyn Buffer> {
        &self.vertex_buffer
    }

    pub fn bound_resources(&self, slot: usize) -> Result<BoundResources> {
        Ok(BoundResources {
            frame_slot: slot,
            descriptor_set: self.descriptor_set(slot)?,
            index_buffer: self.index_buffer.clone(),
        })
    }

    pub fn frames_in_flight(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &FrameResourceSet {
        &self.frames
    }

    pub fn pool(&self, kind: PoolKind) -> &ArenaPool {
        self.allocations.pool(kind)
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn device(&self) -> &Arc<Mutex<dyn GraphicsDevice>> {
        &self.device
    }
}

fn lock(device: &Arc<Mutex<dyn GraphicsDevice>>) -> Result<MutexGuard<'_, dyn GraphicsDevice + 'static>> {
    device
        .lock()
        .map_err(|_| Error::BackendError("Graphics device mutex poisoned".to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
