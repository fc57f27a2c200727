/// Double-buffered CPU-writable GPU buffers
///
/// Every frame slot owns its own global constants, material and transform
/// buffers, persistently mapped. A slot is writable only once its fence has
/// been observed signaled; writes to a slot still in flight are rejected
/// or, for registrations that must reach every slot, queued until the slot
/// comes back.

use std::mem::size_of;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::config::ResourceConfig;
use crate::engine_trace;
use crate::error::{Error, Result};
use crate::graphics_device::{Buffer, BufferDesc, BufferUsage, GraphicsDevice, MemoryLocation};
use crate::resource::PoolKind;

/// Per-frame uniform data visible to every shader (binding 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalConstants {
    /// Camera position, `w` unused
    pub eye_position: Vec4,
    pub view_proj: Mat4,
}

impl Default for GlobalConstants {
    fn default() -> Self {
        Self {
            eye_position: Vec4::ZERO,
            view_proj: Mat4::IDENTITY,
        }
    }
}

/// The mapped buffers of one frame slot
#[derive(Clone)]
pub struct FrameResources {
    pub constants: Arc<dyn Buffer>,
    pub materials: Arc<dyn Buffer>,
    pub transforms: Arc<dyn Buffer>,
}

impl FrameResources {
    fn pool_buffer(&self, pool: PoolKind) -> Result<&Arc<dyn Buffer>> {
        match pool {
            PoolKind::Material => Ok(&self.materials),
            PoolKind::Transform => Ok(&self.transforms),
            PoolKind::Vertex | PoolKind::Index => Err(Error::InvalidResource(format!(
                "The {} pool is not double-buffered",
                pool
            ))),
        }
    }
}

/// Write deferred until its slot's fence is observed
#[derive(Debug, Clone)]
struct PendingWrite {
    pool: PoolKind,
    offset: u64,
    data: Vec<u8>,
}

struct FrameSlot {
    resources: FrameResources,
    in_flight: bool,
    pending: Vec<PendingWrite>,
}

/// N frame slots, indexed by `frame_count mod N`
pub struct FrameResourceSet {
    slots: Vec<FrameSlot>,
}

impl FrameResourceSet {
    /// Create the mapped buffers of every slot
    pub fn new(device: &mut dyn GraphicsDevice, config: &ResourceConfig) -> Result<Self> {
        config.validate()?;

        let mut slots = Vec::with_capacity(config.frames_in_flight);
        for slot in 0..config.frames_in_flight {
            let mut create = |label: &str, size: u64, usage: BufferUsage| {
                device.create_buffer(BufferDesc {
                    name: format!("frame{}.{}", slot, label),
                    size,
                    usage,
                    location: MemoryLocation::CpuToGpu,
                })
            };

            let resources = FrameResources {
                constants: create(
                    "constants",
                    size_of::<GlobalConstants>() as u64,
                    BufferUsage::UNIFORM,
                )?,
                materials: create("materials", config.material_pool_size, BufferUsage::STORAGE)?,
                transforms: create("transforms", config.transform_pool_size, BufferUsage::STORAGE)?,
            };

            slots.push(FrameSlot {
                resources,
                in_flight: false,
                pending: Vec::new(),
            });
        }

        Ok(Self { slots })
    }

    /// Number of slots (frames in flight)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot used by a given frame number
    pub fn slot_for_frame(&self, frame_count: u64) -> usize {
        (frame_count % self.slots.len() as u64) as usize
    }

    pub fn resources(&self, slot: usize) -> Result<&FrameResources> {
        Ok(&self.slot(slot)?.resources)
    }

    pub fn is_in_flight(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.in_flight)
    }

    /// Number of writes waiting for `slot` to come back from the GPU
    pub fn pending_write_count(&self, slot: usize) -> usize {
        self.slots.get(slot).map_or(0, |s| s.pending.len())
    }

    /// The slot was submitted with its fence
    pub fn mark_in_flight(&mut self, slot: usize) -> Result<()> {
        self.slot_mut(slot)?.in_flight = true;
        Ok(())
    }

    /// The slot's fence was observed signaled: make it writable and flush
    /// the writes queued while it was in flight
    pub fn mark_idle(&mut self, slot: usize) -> Result<()> {
        let frame = self.slot_mut(slot)?;
        frame.in_flight = false;

        let pending = std::mem::take(&mut frame.pending);
        if !pending.is_empty() {
            engine_trace!(
                "bindless::frame_resources",
                "Flushing {} deferred writes to frame slot {}",
                pending.len(),
                slot
            );
        }
        for write in pending {
            frame
                .resources
                .pool_buffer(write.pool)?
                .update(write.offset, &write.data)?;
        }
        Ok(())
    }

    /// Write the global constants of an idle slot
    pub fn write_constants(&mut self, slot: usize, constants: &GlobalConstants) -> Result<()> {
        let frame = self.writable_slot(slot)?;
        frame.resources.constants.update(0, bytemuck::bytes_of(constants))
    }

    /// Write material/transform bytes into one idle slot
    pub fn write(&mut self, slot: usize, pool: PoolKind, offset: u64, data: &[u8]) -> Result<()> {
        let frame = self.writable_slot(slot)?;
        frame.resources.pool_buffer(pool)?.update(offset, data)
    }

    /// Write material/transform bytes into every slot
    ///
    /// Idle slots are written now; slots in flight get the write queued and
    /// applied by [`FrameResourceSet::mark_idle`]. Returns the number of
    /// deferred writes.
    pub fn write_all(&mut self, pool: PoolKind, offset: u64, data: &[u8]) -> Result<usize> {
        let mut deferred = 0;
        for frame in &mut self.slots {
            let buffer = frame.resources.pool_buffer(pool)?;
            if frame.in_flight {
                crate::graphics_device::check_buffer_range(
                    buffer.size(),
                    offset,
                    data.len() as u64,
                )?;
                frame.pending.push(PendingWrite { pool, offset, data: data.to_vec() });
                deferred += 1;
            } else {
                buffer.update(offset, data)?;
            }
        }
        Ok(deferred)
    }

    fn writable_slot(&mut self, slot: usize) -> Result<&mut FrameSlot> {
        let frame = self.slot_mut(slot)?;
        if frame.in_flight {
            return Err(Error::FrameSlotInFlight(slot));
        }
        Ok(frame)
    }

    fn slot(&self, slot: usize) -> Result<&FrameSlot> {
        self.slots.get(slot).ok_or_else(|| {
            Error::InvalidResource(format!("Frame slot {} does not exist", slot))
        })
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut FrameSlot> {
        self.slots.get_mut(slot).ok_or_else(|| {
            Error::InvalidResource(format!("Frame slot {} does not exist", slot))
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "frame_resources_tests.rs"]
mod tests;
