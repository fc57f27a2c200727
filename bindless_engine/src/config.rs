//! Engine configuration
//!
//! [`ResourceConfig`] sizes the bindless pools and the frame-in-flight count;
//! [`Config`] drives device creation in the backend.

use crate::error::{Error, Result};

/// 32 MiB, the default capacity of each big bindless buffer
pub const DEFAULT_POOL_SIZE: u64 = 32 * 1024 * 1024;

/// Default size of the bindless sampled-image array
pub const DEFAULT_MAX_TEXTURES: u32 = 128;

/// Default number of frames in flight (double buffering)
pub const DEFAULT_FRAMES_IN_FLIGHT: usize = 2;

// ============================================================================
// ResourceConfig
// ============================================================================

/// Fixed capacities of the resource manager
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceConfig {
    /// Device-local vertex storage buffer (shared by all frames)
    pub vertex_pool_size: u64,
    /// Device-local index buffer (shared by all frames)
    pub index_pool_size: u64,
    /// Host-mapped material storage buffer, one per frame slot
    pub material_pool_size: u64,
    /// Host-mapped transform storage buffer, one per frame slot
    pub transform_pool_size: u64,
    /// Bindless sampled-image slots. 0 disables textures entirely.
    pub max_textures: u32,
    /// Number of frame slots (N in `frame_count mod N`)
    pub frames_in_flight: usize,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            vertex_pool_size: DEFAULT_POOL_SIZE,
            index_pool_size: DEFAULT_POOL_SIZE,
            material_pool_size: DEFAULT_POOL_SIZE,
            transform_pool_size: DEFAULT_POOL_SIZE,
            max_textures: DEFAULT_MAX_TEXTURES,
            frames_in_flight: DEFAULT_FRAMES_IN_FLIGHT,
        }
    }
}

impl ResourceConfig {
    /// Reject configurations the resource manager cannot honor
    ///
    /// # Errors
    ///
    /// - `frames_in_flight` is zero
    /// - a pool is empty, or too large for 32-bit handles
    pub fn validate(&self) -> Result<()> {
        if self.frames_in_flight == 0 {
            return Err(Error::InitializationFailed(
                "frames_in_flight must be at least 1".to_string(),
            ));
        }

        let pools = [
            ("vertex", self.vertex_pool_size),
            ("index", self.index_pool_size),
            ("material", self.material_pool_size),
            ("transform", self.transform_pool_size),
        ];
        for (name, size) in pools {
            if size == 0 {
                return Err(Error::InitializationFailed(format!(
                    "{} pool size must be non-zero",
                    name
                )));
            }
            if size > u32::MAX as u64 {
                return Err(Error::InitializationFailed(format!(
                    "{} pool size {} does not fit 32-bit handles",
                    name, size
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Config
// ============================================================================

/// Which validation messages are forwarded to the engine logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

/// Device creation configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable validation layers (requires the `vulkan-validation` backend feature)
    pub enable_validation: bool,
    /// Minimum validation severity forwarded to the logger
    pub debug_severity: DebugSeverity,
    /// Abort the process on the first validation error
    pub break_on_validation_error: bool,
    pub app_name: String,
    /// (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Requested MSAA sample count for the color/depth targets (clamped to device support)
    pub msaa_samples: u32,
    /// FIFO presentation when true, MAILBOX (falling back to FIFO) otherwise
    pub vsync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            debug_severity: DebugSeverity::ErrorsAndWarnings,
            break_on_validation_error: false,
            app_name: "Bindless Engine Application".to_string(),
            app_version: (1, 0, 0),
            msaa_samples: 8,
            vsync: true,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
