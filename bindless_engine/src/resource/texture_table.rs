/// Append-only table of bindless textures
///
/// A texture's index in the table is its index in the sampled image array
/// of every descriptor set. Entries are never removed or replaced.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::graphics_device::Texture;

/// One registered texture
#[derive(Clone)]
pub struct TextureEntry {
    pub name: String,
    pub texture: Arc<dyn Texture>,
}

pub struct TextureTable {
    entries: Vec<TextureEntry>,
    capacity: u32,
}

impl TextureTable {
    pub fn new(capacity: u32) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Index the next texture will get
    ///
    /// # Errors
    ///
    /// `TextureTableFull` once `capacity` textures are registered (always,
    /// when the capacity is 0).
    pub fn next_index(&self) -> Result<u32> {
        let index = self.entries.len() as u32;
        if index >= self.capacity {
            return Err(Error::TextureTableFull { capacity: self.capacity });
        }
        Ok(index)
    }

    /// Append a texture and return its bindless index
    pub fn push(&mut self, name: impl Into<String>, texture: Arc<dyn Texture>) -> Result<u32> {
        let index = self.next_index()?;
        self.entries.push(TextureEntry { name: name.into(), texture });
        Ok(index)
    }

    pub fn get(&self, index: u32) -> Option<&TextureEntry> {
        self.entries.get(index as usize)
    }

    /// Index of the first texture registered under `name`
    pub fn find(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .position(|entry| entry.name == name)
            .map(|index| index as u32)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &TextureEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (index as u32, entry))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "texture_table_tests.rs"]
mod tests;
