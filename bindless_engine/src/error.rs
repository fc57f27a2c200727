//! Error types for the bindless engine
//!
//! Every fallible operation in the engine returns [`Result`]. GPU call failures,
//! setup failures and programmer-contract violations (arena overrun, barrier
//! misuse, writes into a frame slot still owned by the GPU) all surface here
//! instead of being asserted in debug builds only.

use std::fmt;

use crate::resource::PoolKind;

/// Result type for bindless engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Bindless engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (carries the underlying API status code in the message)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (buffer, texture, descriptor set, payload size, etc.)
    InvalidResource(String),

    /// Initialization failed (missing feature/extension, device creation, allocation)
    InitializationFailed(String),

    /// An arena pool cannot fit the requested allocation
    PoolExhausted {
        pool: PoolKind,
        requested: u64,
        offset: u64,
        capacity: u64,
    },

    /// A barrier request violates the access-list contract
    InvalidBarrier(String),

    /// The bindless texture table has no free slot left
    TextureTableFull { capacity: u32 },

    /// CPU write attempted into a frame slot whose fence has not been observed signaled
    FrameSlotInFlight(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::PoolExhausted { pool, requested, offset, capacity } => write!(
                f,
                "{} pool exhausted: requested {} bytes at offset {} (capacity {})",
                pool, requested, offset, capacity
            ),
            Error::InvalidBarrier(msg) => write!(f, "Invalid barrier: {}", msg),
            Error::TextureTableFull { capacity } => {
                write!(f, "Texture table full (capacity {})", capacity)
            }
            Error::FrameSlotInFlight(slot) => {
                write!(f, "Frame slot {} is still in flight on the GPU", slot)
            }
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
