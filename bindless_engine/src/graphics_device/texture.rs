/// Texture trait, texture descriptors and mip chain math

use std::any::Any;

use bitflags::bitflags;

use crate::error::{Error, Result};

/// Texture formats used by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    D32_SFLOAT_S8_UINT,
}

impl TextureFormat {
    /// Bytes per texel
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::R8G8B8A8_SRGB
            | TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::B8G8R8A8_SRGB
            | TextureFormat::B8G8R8A8_UNORM => 4,
            TextureFormat::D32_SFLOAT_S8_UINT => 5,
        }
    }

    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::D32_SFLOAT_S8_UINT)
    }

    /// RGBA8 format for decoded images: UNORM when the data is linear, sRGB otherwise
    pub fn rgba8(linear: bool) -> Self {
        if linear {
            TextureFormat::R8G8B8A8_UNORM
        } else {
            TextureFormat::R8G8B8A8_SRGB
        }
    }
}

bitflags! {
    /// How a texture is used by the GPU
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        const SAMPLED = 1 << 0;
        const TRANSFER_DST = 1 << 1;
        /// Required when mips are generated by blitting from the texture itself
        const TRANSFER_SRC = 1 << 2;
        const COLOR_ATTACHMENT = 1 << 3;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 4;
        const TRANSIENT_ATTACHMENT = 1 << 5;
    }
}

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// 1 for no mips, see [`mip_level_count`] for a full chain
    pub mip_levels: u32,
    pub usage: TextureUsage,
}

/// Immutable properties of a created texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub mip_levels: u32,
    pub usage: TextureUsage,
}

impl From<&TextureDesc> for TextureInfo {
    fn from(desc: &TextureDesc) -> Self {
        Self {
            width: desc.width,
            height: desc.height,
            format: desc.format,
            mip_levels: desc.mip_levels,
            usage: desc.usage,
        }
    }
}

/// GPU texture (image + view)
pub trait Texture: Send + Sync {
    fn info(&self) -> &TextureInfo;

    /// Downcast hook for backends
    fn as_any(&self) -> &dyn Any;
}

// ============================================================================
// Texture ingestion boundary
// ============================================================================

/// Decoded RGBA8 pixels handed over by an image decoder
#[derive(Debug, Clone)]
pub struct TextureSource {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureSource {
    /// Wrap decoded pixels, checking the byte count against the extent
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let source = Self { pixels, width, height };
        source.validate()?;
        Ok(source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidResource(format!(
                "Texture extent {}x{} is empty",
                self.width, self.height
            )));
        }
        let expected = self.width as u64 * self.height as u64 * 4;
        if self.pixels.len() as u64 != expected {
            return Err(Error::InvalidResource(format!(
                "RGBA8 payload is {} bytes, expected {} for {}x{}",
                self.pixels.len(),
                expected,
                self.width,
                self.height
            )));
        }
        Ok(())
    }
}

/// How decoded pixels become a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureOptions {
    /// Pixels hold linear data (normal maps, masks) rather than sRGB color
    pub linear: bool,
    /// Generate the full mip chain on the GPU
    pub generate_mips: bool,
}

// ============================================================================
// Mip chain
// ============================================================================

/// One level of a mip chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipLevel {
    pub level: u32,
    pub width: u32,
    pub height: u32,
}

/// `floor(log2(min(width, height))) + 1`
///
/// The chain stops when the smaller side reaches one texel; the larger side
/// keeps halving (clamped to 1) along with it.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let min = width.min(height);
    if min == 0 {
        return 0;
    }
    u32::BITS - min.leading_zeros()
}

/// Extent of `level` for a base extent, each side `max(side >> level, 1)`
pub fn mip_extent(width: u32, height: u32, level: u32) -> (u32, u32) {
    let shift = |side: u32| side.checked_shr(level).unwrap_or(0).max(1);
    (shift(width), shift(height))
}

/// Every level of the chain that [`mip_level_count`] describes
pub fn mip_chain(width: u32, height: u32) -> Vec<MipLevel> {
    (0..mip_level_count(width, height))
        .map(|level| {
            let (w, h) = mip_extent(width, height, level);
            MipLevel { level, width: w, height: h }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
