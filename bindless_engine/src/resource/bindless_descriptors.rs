/// Descriptor binding layer
///
/// Owns one bindless descriptor set per frame slot and a CPU mirror of
/// what each set currently references. Binding the same resource twice is
/// a no-op that never reaches the device.

use std::sync::Arc;

use crate::engine_debug;
use crate::error::{Error, Result};
use crate::graphics_device::{
    BindlessLayoutDesc, Buffer, BufferBindingKind, DescriptorSet, GraphicsDevice, Texture,
    BINDING_GLOBAL_CONSTANTS, BINDING_MATERIALS, BINDING_TRANSFORMS, BINDING_VERTICES,
};
use crate::resource::FrameResourceSet;

/// CPU-side view of one descriptor set
struct SetMirror {
    set: Arc<dyn DescriptorSet>,
    /// Bindings 0..=3
    buffers: [Option<Arc<dyn Buffer>>; 4],
    /// Slot 5, grown on demand up to `max_textures`
    textures: Vec<Option<Arc<dyn Texture>>>,
}

pub struct BindlessDescriptors {
    sets: Vec<SetMirror>,
    max_textures: u32,
}

impl BindlessDescriptors {
    /// Create one set per frame slot and bind the fixed buffers
    ///
    /// Each set gets its own frame's constants/materials/transforms at
    /// slots 0, 2 and 3, and the shared vertex buffer at slot 1.
    pub fn build(
        device: &mut dyn GraphicsDevice,
        frames: &FrameResourceSet,
        vertex_buffer: &Arc<dyn Buffer>,
        max_textures: u32,
    ) -> Result<Self> {
        let sets = device.create_bindless_descriptor_sets(&BindlessLayoutDesc {
            frames: frames.len(),
            max_textures,
        })?;
        if sets.len() != frames.len() {
            return Err(Error::InitializationFailed(format!(
                "Expected {} descriptor sets, device created {}",
                frames.len(),
                sets.len()
            )));
        }

        let mut descriptors = Self {
            sets: sets
                .into_iter()
                .map(|set| SetMirror {
                    set,
                    buffers: [None, None, None, None],
                    textures: Vec::new(),
                })
                .collect(),
            max_textures,
        };

        for slot in 0..frames.len() {
            let resources = frames.resources(slot)?;
            descriptors.bind_buffer(device, slot, BINDING_GLOBAL_CONSTANTS, &resources.constants)?;
            descriptors.bind_buffer(device, slot, BINDING_VERTICES, vertex_buffer)?;
            descriptors.bind_buffer(device, slot, BINDING_MATERIALS, &resources.materials)?;
            descriptors.bind_buffer(device, slot, BINDING_TRANSFORMS, &resources.transforms)?;
        }

        engine_debug!(
            "bindless::descriptors",
            "Built {} bindless descriptor sets ({} texture slots)",
            descriptors.sets.len(),
            max_textures
        );

        Ok(descriptors)
    }

    /// Bind a whole buffer at a fixed buffer slot of one set
    ///
    /// Returns `false` when the slot already references `buffer`.
    pub fn bind_buffer(
        &mut self,
        device: &mut dyn GraphicsDevice,
        slot: usize,
        binding: u32,
        buffer: &Arc<dyn Buffer>,
    ) -> Result<bool> {
        if BufferBindingKind::for_binding(binding).is_none() {
            return Err(Error::InvalidResource(format!(
                "Binding {} is not a buffer slot",
                binding
            )));
        }
        let mirror = Self::mirror_mut(&mut self.sets, slot)?;
        let current = &mut mirror.buffers[binding as usize];
        if current.as_ref().is_some_and(|bound| Arc::ptr_eq(bound, buffer)) {
            return Ok(false);
        }

        device.write_buffer_descriptor(&mirror.set, binding, buffer)?;
        *current = Some(buffer.clone());
        Ok(true)
    }

    /// Bind a texture at `index` of one set's sampled image array
    ///
    /// Returns `false` when the index already references `texture`.
    pub fn bind_texture(
        &mut self,
        device: &mut dyn GraphicsDevice,
        slot: usize,
        index: u32,
        texture: &Arc<dyn Texture>,
    ) -> Result<bool> {
        if index >= self.max_textures {
            return Err(Error::TextureTableFull { capacity: self.max_textures });
        }
        let mirror = Self::mirror_mut(&mut self.sets, slot)?;
        if mirror
            .textures
            .get(index as usize)
            .and_then(|bound| bound.as_ref())
            .is_some_and(|bound| Arc::ptr_eq(bound, texture))
        {
            return Ok(false);
        }

        device.write_texture_descriptor(&mirror.set, index, texture)?;
        if mirror.textures.len() <= index as usize {
            mirror.textures.resize(index as usize + 1, None);
        }
        mirror.textures[index as usize] = Some(texture.clone());
        Ok(true)
    }

    /// Bind a texture at `index` in every frame's set
    ///
    /// Returns the number of descriptor writes issued.
    pub fn bind_texture_all(
        &mut self,
        device: &mut dyn GraphicsDevice,
        index: u32,
        texture: &Arc<dyn Texture>,
    ) -> Result<usize> {
        let mut writes = 0;
        for slot in 0..self.sets.len() {
            if self.bind_texture(device, slot, index, texture)? {
                writes += 1;
            }
        }
        Ok(writes)
    }

    /// Descriptor set of a frame slot
    pub fn set(&self, slot: usize) -> Result<&Arc<dyn DescriptorSet>> {
        self.sets
            .get(slot)
            .map(|mirror| &mirror.set)
            .ok_or_else(|| Error::InvalidResource(format!("No descriptor set for slot {}", slot)))
    }

    pub fn bound_buffer(&self, slot: usize, binding: u32) -> Option<&Arc<dyn Buffer>> {
        self.sets
            .get(slot)?
            .buffers
            .get(binding as usize)?
            .as_ref()
    }

    pub fn bound_texture(&self, slot: usize, index: u32) -> Option<&Arc<dyn Texture>> {
        self.sets.get(slot)?.textures.get(index as usize)?.as_ref()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn max_textures(&self) -> u32 {
        self.max_textures
    }

    fn mirror_mut(sets: &mut [SetMirror], slot: usize) -> Result<&mut SetMirror> {
        sets.get_mut(slot)
            .ok_or_else(|| Error::InvalidResource(format!("No descriptor set for slot {}", slot)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "bindless_descriptors_tests.rs"]
mod tests;
