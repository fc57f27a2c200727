/// Buffer trait and buffer descriptor

use std::any::Any;

use bitflags::bitflags;

use crate::error::Result;

bitflags! {
    /// How a buffer is used by the GPU
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Uniform/constant buffer (descriptor slot 0)
        const UNIFORM = 1 << 0;
        /// Storage buffer (vertex pulling, materials, transforms)
        const STORAGE = 1 << 1;
        /// Bound with vkCmdBindIndexBuffer
        const INDEX = 1 << 2;
        /// Source of a transfer (staging buffers)
        const TRANSFER_SRC = 1 << 3;
        /// Destination of a transfer (device-local pools)
        const TRANSFER_DST = 1 << 4;
    }
}

/// Where the buffer memory lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryLocation {
    /// Device-local, not host visible. Filled through staging uploads.
    GpuOnly,
    /// Host-visible and persistently mapped, written by the CPU every frame
    CpuToGpu,
    /// Host-visible, read back by the CPU
    GpuToCpu,
}

impl MemoryLocation {
    /// Whether the CPU can read/write the buffer through a mapping
    pub fn is_host_visible(self) -> bool {
        !matches!(self, MemoryLocation::GpuOnly)
    }
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Debug name (also used as the allocation name)
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub usage: BufferUsage,
    pub location: MemoryLocation,
}

/// GPU buffer
///
/// Host-visible buffers are persistently mapped for their whole lifetime;
/// `update` and `read` go straight through that mapping.
pub trait Buffer: Send + Sync {
    /// Size in bytes
    fn size(&self) -> u64;

    /// Memory location the buffer was created with
    fn location(&self) -> MemoryLocation;

    /// Copy `data` into the mapped memory at `offset`
    ///
    /// # Errors
    ///
    /// - the buffer is not host visible
    /// - `offset + data.len()` exceeds the buffer size
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Read `len` bytes from the mapped memory at `offset`
    fn read(&self, offset: u64, len: usize) -> Result<Vec<u8>>;

    /// Downcast hook for backends
    fn as_any(&self) -> &dyn Any;
}

/// Range check shared by all backends
pub fn check_buffer_range(buffer_size: u64, offset: u64, len: u64) -> Result<()> {
    let end = offset.checked_add(len).ok_or_else(|| {
        crate::error::Error::InvalidResource(format!(
            "Buffer range overflows: offset {} + len {}",
            offset, len
        ))
    })?;
    if end > buffer_size {
        return Err(crate::error::Error::InvalidResource(format!(
            "Buffer range {}..{} exceeds buffer size {}",
            offset, end, buffer_size
        )));
    }
    Ok(())
}
