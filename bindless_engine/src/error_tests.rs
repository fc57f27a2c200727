//! Unit tests for error.rs
//!
//! Tests Error variants and their Display / std::error::Error implementations.

use crate::error::{Error, Result};
use crate::resource::PoolKind;

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("vkQueueSubmit2 failed: ERROR_DEVICE_LOST".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("ERROR_DEVICE_LOST"));
}

#[test]
fn test_out_of_memory_display() {
    assert_eq!(format!("{}", Error::OutOfMemory), "Out of GPU memory");
}

#[test]
fn test_pool_exhausted_display_names_pool_and_sizes() {
    let err = Error::PoolExhausted {
        pool: PoolKind::Vertex,
        requested: 128,
        offset: 960,
        capacity: 1024,
    };
    let display = format!("{}", err);
    assert!(display.starts_with("Vertex pool exhausted"));
    assert!(display.contains("128"));
    assert!(display.contains("960"));
    assert!(display.contains("1024"));
}

#[test]
fn test_invalid_barrier_display() {
    let err = Error::InvalidBarrier("write access mixed with other accesses".to_string());
    assert!(format!("{}", err).contains("Invalid barrier"));
}

#[test]
fn test_texture_table_full_display() {
    let err = Error::TextureTableFull { capacity: 0 };
    assert_eq!(format!("{}", err), "Texture table full (capacity 0)");
}

#[test]
fn test_frame_slot_in_flight_display() {
    let err = Error::FrameSlotInFlight(1);
    assert!(format!("{}", err).contains("slot 1"));
}

// ============================================================================
// TRAIT TESTS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    fn takes_std_error(_: &dyn std::error::Error) {}
    takes_std_error(&Error::OutOfMemory);
}

#[test]
fn test_error_clone_and_eq() {
    let err = Error::InvalidResource("zero-sized allocation".to_string());
    assert_eq!(err.clone(), err);
    assert_ne!(err, Error::OutOfMemory);
}

#[test]
fn test_result_question_mark_propagation() {
    fn inner() -> Result<u32> {
        Err(Error::FrameSlotInFlight(0))
    }
    fn outer() -> Result<u32> {
        let value = inner()?;
        Ok(value + 1)
    }
    assert_eq!(outer(), Err(Error::FrameSlotInFlight(0)));
}
