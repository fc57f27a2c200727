/// GraphicsDevice trait - the GPU boundary of the resource manager

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{
    BindlessLayoutDesc, Buffer, BufferDesc, DescriptorSet, Pipeline, PipelineDesc, Texture,
    TextureDesc,
};

/// Backend-agnostic GPU device
///
/// Shared as `Arc<Mutex<dyn GraphicsDevice>>` between the resource manager
/// and the application. Every upload is synchronous: when it returns, the
/// payload is resident and the staging memory is gone.
pub trait GraphicsDevice: Send {
    /// Create a buffer
    ///
    /// Host-visible buffers come back persistently mapped.
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create a 2D texture and its view
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Copy `data` into `dst` at `offset` through a staging buffer
    ///
    /// Blocks until the GPU copy has completed.
    fn upload_buffer(&mut self, dst: &Arc<dyn Buffer>, offset: u64, data: &[u8]) -> Result<()>;

    /// Upload RGBA8 level 0 and blit the rest of the texture's mip chain
    ///
    /// `data` must hold exactly `width * height * 4` bytes. On return the
    /// whole chain is in `SHADER_READ_ONLY_OPTIMAL`.
    fn upload_texture(&mut self, dst: &Arc<dyn Texture>, data: &[u8]) -> Result<()>;

    /// Create the bindless layout, its pool and one set per frame slot
    ///
    /// The immutable samplers are baked into the layout. Must be called
    /// once, before [`GraphicsDevice::create_pipeline`].
    fn create_bindless_descriptor_sets(
        &mut self,
        desc: &BindlessLayoutDesc,
    ) -> Result<Vec<Arc<dyn DescriptorSet>>>;

    /// Bind a whole buffer at one of the fixed buffer slots (0..=3)
    fn write_buffer_descriptor(
        &mut self,
        set: &Arc<dyn DescriptorSet>,
        binding: u32,
        buffer: &Arc<dyn Buffer>,
    ) -> Result<()>;

    /// Bind a texture view at `index` of the sampled image array (slot 5)
    fn write_texture_descriptor(
        &mut self,
        set: &Arc<dyn DescriptorSet>,
        index: u32,
        texture: &Arc<dyn Texture>,
    ) -> Result<()>;

    /// Compile a graphics pipeline against the bindless layout
    fn create_pipeline(&mut self, desc: PipelineDesc) -> Result<Arc<dyn Pipeline>>;

    /// Block until the device has finished all submitted work
    fn wait_idle(&self) -> Result<()>;
}
