/// Arena allocation of byte ranges inside the big bindless buffers.
///
/// Each pool hands out monotonically increasing, non-overlapping offsets
/// into one fixed-capacity GPU buffer. There is no free list: an offset is
/// valid for the lifetime of the pool. The returned offset doubles as the
/// 32-bit bindless handle shaders use to find the payload.
///
/// # Example
///
/// ```ignore
/// let mut pool = ArenaPool::new(PoolKind::Vertex, 1024, 4)?;
/// let a = pool.allocate(10)?;  // 0
/// let b = pool.allocate(8)?;   // 12 (start rounded up to 4)
/// ```

use std::fmt;

use crate::config::ResourceConfig;
use crate::error::{Error, Result};

/// Which big buffer an allocation lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Vertex,
    Index,
    Material,
    Transform,
}

impl PoolKind {
    pub const ALL: [PoolKind; 4] = [
        PoolKind::Vertex,
        PoolKind::Index,
        PoolKind::Material,
        PoolKind::Transform,
    ];

    /// Start-offset alignment of allocations in this pool
    pub fn default_alignment(self) -> u64 {
        match self {
            PoolKind::Vertex | PoolKind::Index => 4,
            PoolKind::Material | PoolKind::Transform => 16,
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolKind::Vertex => "Vertex",
            PoolKind::Index => "Index",
            PoolKind::Material => "Material",
            PoolKind::Transform => "Transform",
        };
        f.write_str(name)
    }
}

// ============================================================================
// ArenaPool
// ============================================================================

/// Monotonic allocator over one buffer
#[derive(Debug, Clone)]
pub struct ArenaPool {
    kind: PoolKind,
    capacity: u64,
    alignment: u64,
    /// Next free byte (end of the last allocation)
    head: u64,
    allocation_count: u32,
}

impl ArenaPool {
    /// Create an empty pool
    ///
    /// # Errors
    ///
    /// `InitializationFailed` when `alignment` is not a power of two or when
    /// `capacity` exceeds what a 32-bit handle can address.
    pub fn new(kind: PoolKind, capacity: u64, alignment: u64) -> Result<Self> {
        if !alignment.is_power_of_two() {
            return Err(Error::InitializationFailed(format!(
                "{} pool alignment {} is not a power of two",
                kind, alignment
            )));
        }
        if capacity > u32::MAX as u64 {
            return Err(Error::InitializationFailed(format!(
                "{} pool capacity {} exceeds the 32-bit handle range",
                kind, capacity
            )));
        }
        Ok(Self {
            kind,
            capacity,
            alignment,
            head: 0,
            allocation_count: 0,
        })
    }

    /// Reserve `size` bytes and return the start offset
    ///
    /// # Errors
    ///
    /// - `InvalidResource` for a zero-byte request
    /// - `PoolExhausted` when the aligned range does not fit; the pool is left unchanged
    pub fn allocate(&mut self, size: u64) -> Result<u32> {
        if size == 0 {
            return Err(Error::InvalidResource(format!(
                "Zero-byte allocation in the {} pool",
                self.kind
            )));
        }

        let exhausted = |offset: u64| Error::PoolExhausted {
            pool: self.kind,
            requested: size,
            offset,
            capacity: self.capacity,
        };
        let offset = self
            .head
            .checked_next_multiple_of(self.alignment)
            .ok_or_else(|| exhausted(self.head))?;
        let end = offset.checked_add(size).filter(|end| *end <= self.capacity);
        let Some(end) = end else {
            return Err(exhausted(offset));
        };

        let handle = u32::try_from(offset).map_err(|_| exhausted(offset))?;

        self.head = end;
        self.allocation_count += 1;
        Ok(handle)
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    /// Bytes consumed so far, alignment padding included
    pub fn used(&self) -> u64 {
        self.head
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn remaining(&self) -> u64 {
        self.capacity - self.head
    }

    pub fn alignment(&self) -> u64 {
        self.alignment
    }

    pub fn allocation_count(&self) -> u32 {
        self.allocation_count
    }
}

// ============================================================================
// AllocationTable
// ============================================================================

/// The four arena pools of the resource manager
#[derive(Debug, Clone)]
pub struct AllocationTable {
    pools: [ArenaPool; 4],
}

impl AllocationTable {
    /// Build the pools from the configured capacities
    pub fn new(config: &ResourceConfig) -> Result<Self> {
        config.validate()?;
        let capacity = |kind: PoolKind| match kind {
            PoolKind::Vertex => config.vertex_pool_size,
            PoolKind::Index => config.index_pool_size,
            PoolKind::Material => config.material_pool_size,
            PoolKind::Transform => config.transform_pool_size,
        };
        let pool = |kind: PoolKind| ArenaPool::new(kind, capacity(kind), kind.default_alignment());
        let pools = [
            pool(PoolKind::Vertex)?,
            pool(PoolKind::Index)?,
            pool(PoolKind::Material)?,
            pool(PoolKind::Transform)?,
        ];
        Ok(Self { pools })
    }

    /// Reserve `size` bytes in the `kind` pool
    pub fn allocate(&mut self, kind: PoolKind, size: u64) -> Result<u32> {
        self.pool_mut(kind).allocate(size)
    }

    pub fn pool(&self, kind: PoolKind) -> &ArenaPool {
        &self.pools[Self::index(kind)]
    }

    fn pool_mut(&mut self, kind: PoolKind) -> &mut ArenaPool {
        &mut self.pools[Self::index(kind)]
    }

    fn index(kind: PoolKind) -> usize {
        match kind {
            PoolKind::Vertex => 0,
            PoolKind::Index => 1,
            PoolKind::Material => 2,
            PoolKind::Transform => 3,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "allocation_table_tests.rs"]
mod tests;
