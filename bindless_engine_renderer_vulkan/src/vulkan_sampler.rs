/// Immutable sampler table of the bindless layout
///
/// 24 samplers are baked into descriptor slot 4 in a fixed order so shaders
/// can index them by constant. Groups of six:
///
/// - 0..6: linear, no anisotropy
/// - 6..12: nearest, no anisotropy
/// - 12..18: linear, anisotropic
/// - 18..24: nearest, clamp-to-edge depth compare
///
/// The first three groups cycle through the same six addressing modes.

use crate::vulkan_context::GpuContext;
use ash::vk;
use bindless_engine::bindless::Result;
use bindless_engine::engine_err;
use std::sync::Arc;

pub const SAMPLER_COUNT: usize = 24;

const MAX_ANISOTROPY: f32 = 8.0;

/// Addressing mode shared by the u, v and w axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerAddressing {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    BorderOpaqueWhite,
    BorderOpaqueBlack,
    BorderTransparentBlack,
}

const ADDRESSING_ORDER: [SamplerAddressing; 6] = [
    SamplerAddressing::Repeat,
    SamplerAddressing::MirroredRepeat,
    SamplerAddressing::ClampToEdge,
    SamplerAddressing::BorderOpaqueWhite,
    SamplerAddressing::BorderOpaqueBlack,
    SamplerAddressing::BorderTransparentBlack,
];

const COMPARE_ORDER: [vk::CompareOp; 6] = [
    vk::CompareOp::LESS,
    vk::CompareOp::EQUAL,
    vk::CompareOp::LESS_OR_EQUAL,
    vk::CompareOp::GREATER,
    vk::CompareOp::NOT_EQUAL,
    vk::CompareOp::GREATER_OR_EQUAL,
];

impl SamplerAddressing {
    fn address_mode(self) -> vk::SamplerAddressMode {
        match self {
            SamplerAddressing::Repeat => vk::SamplerAddressMode::REPEAT,
            SamplerAddressing::MirroredRepeat => vk::SamplerAddressMode::MIRRORED_REPEAT,
            SamplerAddressing::ClampToEdge => vk::SamplerAddressMode::CLAMP_TO_EDGE,
            SamplerAddressing::BorderOpaqueWhite
            | SamplerAddressing::BorderOpaqueBlack
            | SamplerAddressing::BorderTransparentBlack => vk::SamplerAddressMode::CLAMP_TO_BORDER,
        }
    }

    fn border_color(self) -> vk::BorderColor {
        match self {
            SamplerAddressing::BorderOpaqueWhite => vk::BorderColor::FLOAT_OPAQUE_WHITE,
            SamplerAddressing::BorderOpaqueBlack => vk::BorderColor::FLOAT_OPAQUE_BLACK,
            _ => vk::BorderColor::FLOAT_TRANSPARENT_BLACK,
        }
    }
}

/// Description of one immutable sampler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImmutableSampler {
    pub filter: vk::Filter,
    pub mipmap_mode: vk::SamplerMipmapMode,
    pub addressing: SamplerAddressing,
    /// `None` disables anisotropic filtering
    pub anisotropy: Option<f32>,
    /// `None` disables depth comparison
    pub compare: Option<vk::CompareOp>,
}

impl ImmutableSampler {
    pub fn create_info(&self) -> vk::SamplerCreateInfo<'static> {
        let address = self.addressing.address_mode();
        let mut create_info = vk::SamplerCreateInfo::default()
            .mag_filter(self.filter)
            .min_filter(self.filter)
            .mipmap_mode(self.mipmap_mode)
            .address_mode_u(address)
            .address_mode_v(address)
            .address_mode_w(address)
            .mip_lod_bias(0.0)
            .min_lod(0.0)
            .max_lod(vk::LOD_CLAMP_NONE)
            .border_color(self.addressing.border_color())
            .unnormalized_coordinates(false);

        create_info = match self.compare {
            Some(op) => create_info.compare_enable(true).compare_op(op),
            None => create_info.compare_enable(false).compare_op(vk::CompareOp::ALWAYS),
        };

        match self.anisotropy {
            Some(max) => create_info.anisotropy_enable(true).max_anisotropy(max),
            None => create_info.anisotropy_enable(false).max_anisotropy(1.0),
        }
    }
}

/// The fixed sampler table, in binding order
pub fn sampler_table() -> [ImmutableSampler; SAMPLER_COUNT] {
    std::array::from_fn(|index| {
        let group = index / 6;
        let entry = index % 6;
        match group {
            0 => ImmutableSampler {
                filter: vk::Filter::LINEAR,
                mipmap_mode: vk::SamplerMipmapMode::LINEAR,
                addressing: ADDRESSING_ORDER[entry],
                anisotropy: None,
                compare: None,
            },
            1 => ImmutableSampler {
                filter: vk::Filter::NEAREST,
                mipmap_mode: vk::SamplerMipmapMode::NEAREST,
                addressing: ADDRESSING_ORDER[entry],
                anisotropy: None,
                compare: None,
            },
            2 => ImmutableSampler {
                filter: vk::Filter::LINEAR,
                mipmap_mode: vk::SamplerMipmapMode::LINEAR,
                addressing: ADDRESSING_ORDER[entry],
                anisotropy: Some(MAX_ANISOTROPY),
                compare: None,
            },
            _ => ImmutableSampler {
                filter: vk::Filter::NEAREST,
                mipmap_mode: vk::SamplerMipmapMode::NEAREST,
                addressing: SamplerAddressing::ClampToEdge,
                anisotropy: None,
                compare: Some(COMPARE_ORDER[entry]),
            },
        }
    })
}

/// Owns the created `VkSampler` objects of the table
pub(crate) struct ImmutableSamplers {
    ctx: Arc<GpuContext>,
    samplers: Vec<vk::Sampler>,
}

impl ImmutableSamplers {
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        let mut samplers = Vec::with_capacity(SAMPLER_COUNT);
        for (index, desc) in sampler_table().iter().enumerate() {
            let created = unsafe { ctx.device.create_sampler(&desc.create_info(), None) };
            match created {
                Ok(sampler) => samplers.push(sampler),
                Err(e) => {
                    for sampler in samplers.drain(..) {
                        unsafe { ctx.device.destroy_sampler(sampler, None) };
                    }
                    return Err(engine_err!(
                        "bindless::vulkan",
                        "Failed to create immutable sampler {}: {:?}",
                        index,
                        e
                    ));
                }
            }
        }
        Ok(Self { ctx, samplers })
    }

    /// Handles in table order, referenced by the set layout
    pub(crate) fn handles(&self) -> &[vk::Sampler] {
        &self.samplers
    }
}

impl Drop for ImmutableSamplers {
    fn drop(&mut self) {
        for sampler in self.samplers.drain(..) {
            unsafe { self.ctx.device.destroy_sampler(sampler, None) };
        }
    }
}

#[cfg(test)]
#[path = "vulkan_sampler_tests.rs"]
mod tests;
