/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Buffers live in host memory so uploads can be read back, and every
/// descriptor write and draw command is recorded for inspection.

use std::any::Any;
use std::sync::{Arc, Mutex};

use crate::engine_bail;
use crate::error::{Error, Result};
use crate::graphics_device::{
    check_buffer_range, BindlessLayoutDesc, Buffer, BufferBindingKind, BufferDesc,
    CommandList, DescriptorSet, GraphicsDevice, MemoryLocation, Pipeline, PipelineDesc, Rect2D,
    Texture, TextureDesc, TextureInfo, Viewport,
};

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub desc: BufferDesc,
    data: Mutex<Vec<u8>>,
}

impl MockBuffer {
    pub fn new(desc: BufferDesc) -> Self {
        let data = Mutex::new(vec![0u8; desc.size as usize]);
        Self { desc, data }
    }

    /// Raw contents regardless of memory location (simulated GPU readback)
    pub fn contents(&self, offset: u64, len: usize) -> Vec<u8> {
        let data = self.data.lock().unwrap();
        data[offset as usize..offset as usize + len].to_vec()
    }

    fn write(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        check_buffer_range(self.desc.size, offset, bytes.len() as u64)?;
        let mut data = self.data.lock().unwrap();
        data[offset as usize..offset as usize + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.desc.size
    }

    fn location(&self) -> MemoryLocation {
        self.desc.location
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        if !self.desc.location.is_host_visible() {
            return Err(Error::InvalidResource(format!(
                "Buffer '{}' is not host visible",
                self.desc.name
            )));
        }
        self.write(offset, data)
    }

    fn read(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        if !self.desc.location.is_host_visible() {
            return Err(Error::InvalidResource(format!(
                "Buffer '{}' is not host visible",
                self.desc.name
            )));
        }
        check_buffer_range(self.desc.size, offset, len as u64)?;
        Ok(self.contents(offset, len))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub name: String,
    /// Level-0 pixels of the last upload
    pub uploaded: Mutex<Option<Vec<u8>>>,
}

impl MockTexture {
    pub fn new(desc: &TextureDesc) -> Self {
        Self {
            info: TextureInfo::from(desc),
            name: desc.name.clone(),
            uploaded: Mutex::new(None),
        }
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock DescriptorSet
// ============================================================================

/// One recorded descriptor write
#[derive(Debug, Clone, PartialEq)]
pub enum MockDescriptorWrite {
    Buffer { binding: u32, kind: BufferBindingKind, size: u64 },
    Texture { index: u32, name: String },
}

#[derive(Debug)]
pub struct MockDescriptorSet {
    pub slot: usize,
    pub max_textures: u32,
    pub writes: Mutex<Vec<MockDescriptorWrite>>,
}

impl MockDescriptorSet {
    pub fn new(slot: usize, max_textures: u32) -> Self {
        Self { slot, max_textures, writes: Mutex::new(Vec::new()) }
    }

    pub fn writes(&self) -> Vec<MockDescriptorWrite> {
        self.writes.lock().unwrap().clone()
    }
}

impl DescriptorSet for MockDescriptorSet {
    fn frame_slot(&self) -> usize {
        self.slot
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock Pipeline
// ============================================================================

#[derive(Debug)]
pub struct MockPipeline {
    pub name: String,
    pub push_constant_size: u32,
}

impl Pipeline for MockPipeline {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

#[derive(Debug, Default)]
pub struct MockCommandList {
    pub commands: Vec<String>,
    /// Payloads of every push_constants call, in order
    pub push_constant_data: Vec<Vec<u8>>,
}

impl MockCommandList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandList for MockCommandList {
    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        let name = pipeline
            .as_any()
            .downcast_ref::<MockPipeline>()
            .map(|p| p.name.clone())
            .unwrap_or_default();
        self.commands.push(format!("bind_pipeline({})", name));
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.commands.push(format!(
            "set_viewport({}, {}, {}, {})",
            viewport.x, viewport.y, viewport.width, viewport.height
        ));
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.commands
            .push(format!("set_scissor({}, {})", scissor.width, scissor.height));
        Ok(())
    }

    fn bind_descriptor_set(
        &mut self,
        _pipeline: &Arc<dyn Pipeline>,
        set: &Arc<dyn DescriptorSet>,
    ) -> Result<()> {
        self.commands
            .push(format!("bind_descriptor_set(slot {})", set.frame_slot()));
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()> {
        let name = buffer
            .as_any()
            .downcast_ref::<MockBuffer>()
            .map(|b| b.desc.name.clone())
            .unwrap_or_default();
        self.commands
            .push(format!("bind_index_buffer({}, {})", name, offset));
        Ok(())
    }

    fn push_constants(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        self.commands
            .push(format!("push_constants({}, {} bytes)", offset, data.len()));
        self.push_constant_data.push(data.to_vec());
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        self.commands.push(format!(
            "draw_indexed({}, {}, {})",
            index_count, first_index, vertex_offset
        ));
        Ok(())
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    pub buffers: Vec<Arc<MockBuffer>>,
    pub textures: Vec<Arc<MockTexture>>,
    pub descriptor_sets: Vec<Arc<MockDescriptorSet>>,
    pub buffer_upload_count: usize,
    pub texture_upload_count: usize,
    pub descriptor_write_count: usize,
    pub pipeline_count: usize,
    pub wait_idle_count: Mutex<usize>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, ready to be coerced to `Arc<Mutex<dyn GraphicsDevice>>`
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Created buffer by debug name
    pub fn buffer(&self, name: &str) -> Option<Arc<MockBuffer>> {
        self.buffers.iter().find(|b| b.desc.name == name).cloned()
    }

    fn mock_set<'a>(set: &'a Arc<dyn DescriptorSet>) -> Result<&'a MockDescriptorSet> {
        set.as_any()
            .downcast_ref::<MockDescriptorSet>()
            .ok_or_else(|| Error::InvalidResource("Not a mock descriptor set".to_string()))
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        if desc.size == 0 {
            engine_bail!("bindless::mock", "Buffer '{}' has zero size", desc.name);
        }
        let buffer = Arc::new(MockBuffer::new(desc));
        self.buffers.push(buffer.clone());
        Ok(buffer)
    }

    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        if desc.width == 0 || desc.height == 0 || desc.mip_levels == 0 {
            engine_bail!("bindless::mock", "Texture '{}' has an empty extent", desc.name);
        }
        let texture = Arc::new(MockTexture::new(&desc));
        self.textures.push(texture.clone());
        Ok(texture)
    }

    fn upload_buffer(&mut self, dst: &Arc<dyn Buffer>, offset: u64, data: &[u8]) -> Result<()> {
        let buffer = dst
            .as_any()
            .downcast_ref::<MockBuffer>()
            .ok_or_else(|| Error::InvalidResource("Not a mock buffer".to_string()))?;
        buffer.write(offset, data)?;
        self.buffer_upload_count += 1;
        Ok(())
    }

    fn upload_texture(&mut self, dst: &Arc<dyn Texture>, data: &[u8]) -> Result<()> {
        let texture = dst
            .as_any()
            .downcast_ref::<MockTexture>()
            .ok_or_else(|| Error::InvalidResource("Not a mock texture".to_string()))?;
        let expected = texture.info.width as usize * texture.info.height as usize * 4;
        if data.len() != expected {
            return Err(Error::InvalidResource(format!(
                "Texture payload is {} bytes, expected {}",
                data.len(),
                expected
            )));
        }
        *texture.uploaded.lock().unwrap() = Some(data.to_vec());
        self.texture_upload_count += 1;
        Ok(())
    }

    fn create_bindless_descriptor_sets(
        &mut self,
        desc: &BindlessLayoutDesc,
    ) -> Result<Vec<Arc<dyn DescriptorSet>>> {
        if !self.descriptor_sets.is_empty() {
            engine_bail!("bindless::mock", "Bindless descriptor sets already created");
        }
        self.descriptor_sets = (0..desc.frames)
            .map(|slot| Arc::new(MockDescriptorSet::new(slot, desc.max_textures)))
            .collect();
        Ok(self
            .descriptor_sets
            .iter()
            .map(|set| set.clone() as Arc<dyn DescriptorSet>)
            .collect())
    }

    fn write_buffer_descriptor(
        &mut self,
        set: &Arc<dyn DescriptorSet>,
        binding: u32,
        buffer: &Arc<dyn Buffer>,
    ) -> Result<()> {
        let kind = BufferBindingKind::for_binding(binding).ok_or_else(|| {
            Error::InvalidResource(format!("Binding {} is not a buffer slot", binding))
        })?;
        Self::mock_set(set)?.writes.lock().unwrap().push(MockDescriptorWrite::Buffer {
            binding,
            kind,
            size: buffer.size(),
        });
        self.descriptor_write_count += 1;
        Ok(())
    }

    fn write_texture_descriptor(
        &mut self,
        set: &Arc<dyn DescriptorSet>,
        index: u32,
        texture: &Arc<dyn Texture>,
    ) -> Result<()> {
        let mock_set = Self::mock_set(set)?;
        if index >= mock_set.max_textures {
            return Err(Error::TextureTableFull { capacity: mock_set.max_textures });
        }
        let name = texture
            .as_any()
            .downcast_ref::<MockTexture>()
            .map(|t| t.name.clone())
            .unwrap_or_default();
        mock_set
            .writes
            .lock()
            .unwrap()
            .push(MockDescriptorWrite::Texture { index, name });
        self.descriptor_write_count += 1;
        Ok(())
    }

    fn create_pipeline(&mut self, desc: PipelineDesc) -> Result<Arc<dyn Pipeline>> {
        if self.descriptor_sets.is_empty() {
            engine_bail!(
                "bindless::mock",
                "Pipeline '{}' created before the bindless layout",
                desc.name
            );
        }
        self.pipeline_count += 1;
        Ok(Arc::new(MockPipeline {
            name: desc.name,
            push_constant_size: desc.push_constant_size,
        }))
    }

    fn wait_idle(&self) -> Result<()> {
        *self.wait_idle_count.lock().unwrap() += 1;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
