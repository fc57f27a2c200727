/// Bindless descriptor set layout, pool and per-frame sets
///
/// One layout shared by every set:
///
/// | binding | type           | count             |
/// |---------|----------------|-------------------|
/// | 0       | uniform buffer | 1                 |
/// | 1..=3   | storage buffer | 1 each            |
/// | 4       | sampler        | 24 (immutable)    |
/// | 5       | sampled image  | `max_textures`    |
///
/// Binding 5 is update-after-bind, partially bound and variable-count, so
/// textures can be added to a set while an older frame still uses it.

use ash::vk;
use bindless_engine::bindless::{
    Result,
    render::{
        BindlessLayoutDesc, DescriptorSet as RendererDescriptorSet, BINDING_GLOBAL_CONSTANTS,
        BINDING_MATERIALS, BINDING_SAMPLERS, BINDING_TEXTURES, BINDING_TRANSFORMS, BINDING_VERTICES,
    },
};
use bindless_engine::engine_err;
use std::any::Any;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_sampler::{ImmutableSamplers, SAMPLER_COUNT};

/// Descriptor type and count of one bindless binding
pub(crate) fn binding_shape(binding: u32, max_textures: u32) -> Option<(vk::DescriptorType, u32)> {
    match binding {
        BINDING_GLOBAL_CONSTANTS => Some((vk::DescriptorType::UNIFORM_BUFFER, 1)),
        BINDING_VERTICES | BINDING_MATERIALS | BINDING_TRANSFORMS => {
            Some((vk::DescriptorType::STORAGE_BUFFER, 1))
        }
        BINDING_SAMPLERS => Some((vk::DescriptorType::SAMPLER, SAMPLER_COUNT as u32)),
        BINDING_TEXTURES => Some((vk::DescriptorType::SAMPLED_IMAGE, max_textures)),
        _ => None,
    }
}

/// Pool sizes for `frames` sets
///
/// Zero-sized entries are left out (a texture-less configuration has no
/// sampled images to pool).
pub(crate) fn pool_sizes(frames: u32, max_textures: u32) -> Vec<vk::DescriptorPoolSize> {
    [
        (vk::DescriptorType::UNIFORM_BUFFER, frames),
        (vk::DescriptorType::STORAGE_BUFFER, 3 * frames),
        (vk::DescriptorType::SAMPLER, SAMPLER_COUNT as u32 * frames),
        (vk::DescriptorType::SAMPLED_IMAGE, max_textures * frames),
    ]
    .into_iter()
    .filter(|(_, count)| *count > 0)
    .map(|(ty, descriptor_count)| vk::DescriptorPoolSize { ty, descriptor_count })
    .collect()
}

/// Binding flags, indexed like the bindings
pub(crate) fn binding_flags() -> [vk::DescriptorBindingFlags; 6] {
    let mut flags = [vk::DescriptorBindingFlags::empty(); 6];
    flags[BINDING_TEXTURES as usize] = vk::DescriptorBindingFlags::UPDATE_AFTER_BIND
        | vk::DescriptorBindingFlags::PARTIALLY_BOUND
        | vk::DescriptorBindingFlags::VARIABLE_DESCRIPTOR_COUNT;
    flags
}

/// Set layout, pool and the immutable samplers baked into the layout
pub(crate) struct BindlessLayout {
    ctx: Arc<GpuContext>,
    pub(crate) set_layout: vk::DescriptorSetLayout,
    pool: vk::DescriptorPool,
    pub(crate) max_textures: u32,
    /// Referenced by the layout, destroyed after it
    _samplers: ImmutableSamplers,
}

impl BindlessLayout {
    pub(crate) fn new(ctx: Arc<GpuContext>, desc: &BindlessLayoutDesc) -> Result<Self> {
        let samplers = ImmutableSamplers::new(Arc::clone(&ctx))?;
        let frames = desc.frames as u32;

        let bindings: Vec<vk::DescriptorSetLayoutBinding> = (0..=BINDING_TEXTURES)
            .filter_map(|binding| {
                let (ty, count) = binding_shape(binding, desc.max_textures)?;
                let mut layout_binding = vk::DescriptorSetLayoutBinding::default()
                    .binding(binding)
                    .descriptor_type(ty)
                    .descriptor_count(count)
                    .stage_flags(vk::ShaderStageFlags::ALL);
                if binding == BINDING_SAMPLERS {
                    layout_binding = layout_binding.immutable_samplers(samplers.handles());
                }
                Some(layout_binding)
            })
            .collect();

        let flags = binding_flags();
        let mut flags_info = vk::DescriptorSetLayoutBindingFlagsCreateInfo::default().binding_flags(&flags);

        let layout_info = vk::DescriptorSetLayoutCreateInfo::default()
            .flags(vk::DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL)
            .bindings(&bindings)
            .push_next(&mut flags_info);

        unsafe {
            let set_layout = ctx.device.create_descriptor_set_layout(&layout_info, None)
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to create bindless set layout: {:?}", e))?;

            let sizes = pool_sizes(frames, desc.max_textures);
            let pool_info = vk::DescriptorPoolCreateInfo::default()
                .flags(vk::DescriptorPoolCreateFlags::UPDATE_AFTER_BIND)
                .max_sets(frames)
                .pool_sizes(&sizes);

            let pool = match ctx.device.create_descriptor_pool(&pool_info, None) {
                Ok(pool) => pool,
                Err(e) => {
                    ctx.device.destroy_descriptor_set_layout(set_layout, None);
                    return Err(engine_err!("bindless::vulkan", "Failed to create bindless descriptor pool: {:?}", e));
                }
            };

            Ok(Self {
                ctx,
                set_layout,
                pool,
                max_textures: desc.max_textures,
                _samplers: samplers,
            })
        }
    }

    /// Allocate one set per frame slot, each with `max_textures` texture slots
    pub(crate) fn allocate_sets(&self, frames: usize) -> Result<Vec<vk::DescriptorSet>> {
        let layouts = vec![self.set_layout; frames];
        let counts = vec![self.max_textures; frames];
        let mut variable_info =
            vk::DescriptorSetVariableDescriptorCountAllocateInfo::default().descriptor_counts(&counts);
        let alloc_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.pool)
            .set_layouts(&layouts)
            .push_next(&mut variable_info);

        unsafe {
            self.ctx.device.allocate_descriptor_sets(&alloc_info)
                .map_err(|e| engine_err!("bindless::vulkan", "Failed to allocate bindless descriptor sets: {:?}", e))
        }
    }
}

impl Drop for BindlessLayout {
    fn drop(&mut self) {
        unsafe {
            // Frees every set allocated from it
            self.ctx.device.destroy_descriptor_pool(self.pool, None);
            self.ctx.device.destroy_descriptor_set_layout(self.set_layout, None);
        }
    }
}

/// Vulkan descriptor set implementation
///
/// The set is freed with the pool, so it keeps the layout alive.
pub struct DescriptorSet {
    pub(crate) set: vk::DescriptorSet,
    slot: usize,
    pub(crate) layout: Arc<BindlessLayout>,
}

impl DescriptorSet {
    pub(crate) fn new(set: vk::DescriptorSet, slot: usize, layout: Arc<BindlessLayout>) -> Self {
        Self { set, slot, layout }
    }
}

impl RendererDescriptorSet for DescriptorSet {
    fn frame_slot(&self) -> usize {
        self.slot
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "vulkan_descriptor_set_tests.rs"]
mod tests;
