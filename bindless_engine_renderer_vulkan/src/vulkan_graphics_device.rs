/// VulkanGraphicsDevice - Vulkan 1.3 bootstrap and the GraphicsDevice implementation
///
/// Creates the instance (with the optional validation messenger), the window
/// surface, a device with the bindless feature set and a single graphics
/// queue that also presents. The surface is handed to the swapchain when
/// the frame backend is created.

use bindless_engine::bindless::{
    Config,
    Error,
    Result,
    render::{
        BindlessLayoutDesc, Buffer as RendererBuffer, BufferBindingKind, BufferDesc,
        DescriptorSet as RendererDescriptorSet, GraphicsDevice, Pipeline as RendererPipeline,
        PipelineDesc, Texture as RendererTexture, TextureDesc, BINDING_TEXTURES,
    },
};
use bindless_engine::{engine_debug, engine_err, engine_error, engine_info, engine_warn};
use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::{c_void, CStr, CString};
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};

use crate::vulkan_buffer::Buffer;
use crate::vulkan_command_list::{as_vulkan_buffer, as_vulkan_descriptor_set, as_vulkan_texture};
use crate::vulkan_context::{GpuContext, UploadContext};
use crate::vulkan_debug::{
    messenger_severity_flags, print_validation_stats_report, vulkan_debug_callback, DebugState,
    ValidationStats,
};
use crate::vulkan_descriptor_set::{BindlessLayout, DescriptorSet};
use crate::vulkan_frame::VulkanFrameBackend;
use crate::vulkan_pipeline::Pipeline;
use crate::vulkan_swapchain::Swapchain;
use crate::vulkan_texture::{clamp_sample_count, Texture};
use crate::vulkan_transfer::{upload_to_buffer, upload_to_image};

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

// ============================================================================
// Device feature requirements
// ============================================================================

/// Features and extensions the bindless renderer cannot run without
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FeatureSupport {
    pub sampler_anisotropy: bool,
    pub scalar_block_layout: bool,
    pub descriptor_indexing: bool,
    pub descriptor_binding_partially_bound: bool,
    pub descriptor_binding_variable_descriptor_count: bool,
    pub descriptor_binding_sampled_image_update_after_bind: bool,
    pub runtime_descriptor_array: bool,
    pub dynamic_rendering: bool,
    pub synchronization2: bool,
    pub swapchain_extension: bool,
}

impl FeatureSupport {
    /// Names of the required features this device lacks
    pub(crate) fn missing_features(&self) -> Vec<&'static str> {
        let checks = [
            (self.sampler_anisotropy, "samplerAnisotropy"),
            (self.scalar_block_layout, "scalarBlockLayout"),
            (self.descriptor_indexing, "descriptorIndexing"),
            (self.descriptor_binding_partially_bound, "descriptorBindingPartiallyBound"),
            (self.descriptor_binding_variable_descriptor_count, "descriptorBindingVariableDescriptorCount"),
            (self.descriptor_binding_sampled_image_update_after_bind, "descriptorBindingSampledImageUpdateAfterBind"),
            (self.runtime_descriptor_array, "runtimeDescriptorArray"),
            (self.dynamic_rendering, "dynamicRendering"),
            (self.synchronization2, "synchronization2"),
            (self.swapchain_extension, "VK_KHR_swapchain"),
        ];
        checks
            .into_iter()
            .filter(|(supported, _)| !supported)
            .map(|(_, name)| name)
            .collect()
    }

    /// # Safety
    ///
    /// `physical_device` must come from `instance`.
    unsafe fn query(instance: &ash::Instance, physical_device: vk::PhysicalDevice) -> Self {
        let mut features12 = vk::PhysicalDeviceVulkan12Features::default();
        let mut features13 = vk::PhysicalDeviceVulkan13Features::default();
        let base = {
            let mut features2 = vk::PhysicalDeviceFeatures2::default()
                .push_next(&mut features12)
                .push_next(&mut features13);
            instance.get_physical_device_features2(physical_device, &mut features2);
            features2.features
        };

        let swapchain_extension = instance
            .enumerate_device_extension_properties(physical_device)
            .map(|extensions| {
                extensions.iter().any(|ext| {
                    ext.extension_name_as_c_str()
                        .map_or(false, |name| name == ash::khr::swapchain::NAME)
                })
            })
            .unwrap_or(false);

        Self {
            sampler_anisotropy: base.sampler_anisotropy == vk::TRUE,
            scalar_block_layout: features12.scalar_block_layout == vk::TRUE,
            descriptor_indexing: features12.descriptor_indexing == vk::TRUE,
            descriptor_binding_partially_bound: features12.descriptor_binding_partially_bound == vk::TRUE,
            descriptor_binding_variable_descriptor_count: features12.descriptor_binding_variable_descriptor_count
                == vk::TRUE,
            descriptor_binding_sampled_image_update_after_bind: features12
                .descriptor_binding_sampled_image_update_after_bind
                == vk::TRUE,
            runtime_descriptor_array: features12.runtime_descriptor_array == vk::TRUE,
            dynamic_rendering: features13.dynamic_rendering == vk::TRUE,
            synchronization2: features13.synchronization2 == vk::TRUE,
            swapchain_extension,
        }
    }
}

/// Preference order of GPU types, lower is better
pub(crate) fn device_type_rank(device_type: vk::PhysicalDeviceType) -> u32 {
    match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => 0,
        vk::PhysicalDeviceType::INTEGRATED_GPU => 1,
        vk::PhysicalDeviceType::VIRTUAL_GPU => 2,
        vk::PhysicalDeviceType::CPU => 3,
        _ => 4,
    }
}

/// Physical device picked for rendering
struct SelectedDevice {
    physical_device: vk::PhysicalDevice,
    queue_family: u32,
    properties: vk::PhysicalDeviceProperties,
}

// ============================================================================
// Instance-level objects
// ============================================================================

/// Validation messenger and the state its callback reads
struct DebugMessenger {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
    state: Box<DebugState>,
}

/// Objects that exist before the logical device
struct InstanceParts {
    entry: ash::Entry,
    instance: ash::Instance,
    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    debug: Option<DebugMessenger>,
}

impl InstanceParts {
    /// Tear down after a failed device creation
    ///
    /// # Safety
    ///
    /// Nothing created from the instance may still be alive.
    unsafe fn destroy(self) {
        self.surface_loader.destroy_surface(self.surface, None);
        if let Some(debug) = &self.debug {
            debug.loader.destroy_debug_utils_messenger(debug.messenger, None);
        }
        self.instance.destroy_instance(None);
    }
}

fn init_error(what: &str, e: impl std::fmt::Debug) -> Error {
    engine_error!("bindless::vulkan", "{}: {:?}", what, e);
    Error::InitializationFailed(format!("{}: {:?}", what, e))
}

// ============================================================================
// VulkanGraphicsDevice
// ============================================================================

/// Vulkan implementation of [`GraphicsDevice`]
pub struct VulkanGraphicsDevice {
    ctx: Arc<GpuContext>,
    /// Window surface until the frame backend takes it
    surface: Option<vk::SurfaceKHR>,
    /// Created by `create_bindless_descriptor_sets`, shared by every pipeline
    bindless: Option<Arc<BindlessLayout>>,
    msaa_samples: u32,
    vsync: bool,
}

impl VulkanGraphicsDevice {
    /// Create a Vulkan 1.3 device able to present to `window`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitializationFailed`] when Vulkan is unavailable or
    /// no GPU supports the bindless feature set; the message names the
    /// missing features.
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: &Config) -> Result<Self> {
        unsafe {
            let parts = Self::create_instance(window, config)?;

            let selected = match Self::select_physical_device(&parts) {
                Ok(selected) => selected,
                Err(e) => {
                    parts.destroy();
                    return Err(e);
                }
            };

            let device = match Self::create_logical_device(&parts.instance, &selected) {
                Ok(device) => device,
                Err(e) => {
                    parts.destroy();
                    return Err(e);
                }
            };

            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: parts.instance.clone(),
                device: device.clone(),
                physical_device: selected.physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            });
            let allocator = match allocator {
                Ok(allocator) => allocator,
                Err(e) => {
                    device.destroy_device(None);
                    parts.destroy();
                    return Err(init_error("Failed to create GPU allocator", e));
                }
            };

            let upload = match UploadContext::new(&device, selected.queue_family) {
                Ok(upload) => upload,
                Err(e) => {
                    drop(allocator);
                    device.destroy_device(None);
                    parts.destroy();
                    return Err(e);
                }
            };

            let graphics_queue = device.get_device_queue(selected.queue_family, 0);

            let limits = &selected.properties.limits;
            let supported_samples =
                limits.framebuffer_color_sample_counts & limits.framebuffer_depth_sample_counts;
            let msaa_samples = clamp_sample_count(config.msaa_samples, supported_samples);
            if msaa_samples != config.msaa_samples {
                engine_warn!(
                    "bindless::vulkan",
                    "{}x MSAA not supported, using {}x",
                    config.msaa_samples,
                    msaa_samples
                );
            }

            let InstanceParts { entry, instance, surface_loader, surface, debug } = parts;
            let (debug_utils_loader, debug_messenger, debug_state) = match debug {
                Some(debug) => (Some(debug.loader), Some(debug.messenger), Some(debug.state)),
                None => (None, None, None),
            };

            let ctx = Arc::new(GpuContext {
                entry,
                instance,
                physical_device: selected.physical_device,
                device,
                allocator: ManuallyDrop::new(Mutex::new(allocator)),
                graphics_queue,
                graphics_queue_family: selected.queue_family,
                surface_loader,
                upload: Mutex::new(upload),
                debug_utils_loader,
                debug_messenger,
                debug_state,
            });

            Ok(Self {
                ctx,
                surface: Some(surface),
                bindless: None,
                msaa_samples,
                vsync: config.vsync,
            })
        }
    }

    unsafe fn create_instance<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        config: &Config,
    ) -> Result<InstanceParts> {
        let entry = ash::Entry::load().map_err(|e| init_error("Failed to load Vulkan library", e))?;

        let app_name = CString::new(config.app_name.as_str())
            .map_err(|e| Error::InitializationFailed(format!("Invalid application name: {}", e)))?;
        let (major, minor, patch) = config.app_version;
        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, major, minor, patch))
            .engine_name(c"Bindless Engine")
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_3);

        let display_handle = window
            .display_handle()
            .map_err(|e| init_error("Failed to get display handle", e))?;
        let window_handle = window
            .window_handle()
            .map_err(|e| init_error("Failed to get window handle", e))?;

        let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
            .map_err(|e| init_error("Failed to get required extensions", e))?
            .to_vec();

        let validation = Self::validation_enabled(&entry, config);
        let mut layer_names = Vec::new();
        if validation {
            extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            layer_names.push(VALIDATION_LAYER.as_ptr());
        }

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_names)
            .enabled_extension_names(&extension_names);

        let instance = entry
            .create_instance(&create_info, None)
            .map_err(|e| init_error("Failed to create Vulkan instance", e))?;

        let debug = if validation {
            match Self::create_debug_messenger(&entry, &instance, config) {
                Ok(debug) => Some(debug),
                Err(e) => {
                    instance.destroy_instance(None);
                    return Err(e);
                }
            }
        } else {
            None
        };

        let surface = ash_window::create_surface(
            &entry,
            &instance,
            display_handle.as_raw(),
            window_handle.as_raw(),
            None,
        );
        let surface = match surface {
            Ok(surface) => surface,
            Err(e) => {
                if let Some(debug) = &debug {
                    debug.loader.destroy_debug_utils_messenger(debug.messenger, None);
                }
                instance.destroy_instance(None);
                return Err(init_error("Failed to create surface", e));
            }
        };

        let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

        Ok(InstanceParts { entry, instance, surface_loader, surface, debug })
    }

    /// Validation needs the cargo feature, the config flag and an installed layer
    fn validation_enabled(entry: &ash::Entry, config: &Config) -> bool {
        if !config.enable_validation {
            return false;
        }
        if !cfg!(feature = "vulkan-validation") {
            engine_debug!("bindless::vulkan", "Validation requested but the vulkan-validation feature is off");
            return false;
        }

        let available = unsafe { entry.enumerate_instance_layer_properties() }
            .map(|layers| {
                layers.iter().any(|layer| {
                    layer.layer_name_as_c_str().map_or(false, |name| name == VALIDATION_LAYER)
                })
            })
            .unwrap_or(false);
        if !available {
            engine_warn!("bindless::vulkan", "VK_LAYER_KHRONOS_validation is not installed, validation disabled");
        }
        available
    }

    unsafe fn create_debug_messenger(
        entry: &ash::Entry,
        instance: &ash::Instance,
        config: &Config,
    ) -> Result<DebugMessenger> {
        let loader = ash::ext::debug_utils::Instance::new(entry, instance);
        let state = Box::new(DebugState::new(config.debug_severity, config.break_on_validation_error));

        let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(messenger_severity_flags(config.debug_severity))
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(vulkan_debug_callback))
            .user_data(&*state as *const DebugState as *mut c_void);

        let messenger = loader
            .create_debug_utils_messenger(&debug_info, None)
            .map_err(|e| init_error("Failed to create debug messenger", e))?;

        Ok(DebugMessenger { loader, messenger, state })
    }

    unsafe fn select_physical_device(parts: &InstanceParts) -> Result<SelectedDevice> {
        let physical_devices = parts
            .instance
            .enumerate_physical_devices()
            .map_err(|e| init_error("Failed to enumerate physical devices", e))?;
        if physical_devices.is_empty() {
            engine_error!("bindless::vulkan", "No Vulkan-capable GPU found");
            return Err(Error::InitializationFailed("No Vulkan-capable GPU found".to_string()));
        }

        let mut best: Option<SelectedDevice> = None;
        let mut rejections = Vec::new();

        for physical_device in physical_devices {
            let properties = parts.instance.get_physical_device_properties(physical_device);
            let name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let missing = FeatureSupport::query(&parts.instance, physical_device).missing_features();
            if !missing.is_empty() {
                engine_debug!("bindless::vulkan", "Skipping '{}': missing {}", name, missing.join(", "));
                rejections.push(format!("'{}' lacks {}", name, missing.join(", ")));
                continue;
            }

            // One queue records, submits and presents
            let queue_families = parts
                .instance
                .get_physical_device_queue_family_properties(physical_device);
            let queue_family = (0..queue_families.len() as u32).find(|&i| {
                queue_families[i as usize].queue_flags.contains(vk::QueueFlags::GRAPHICS)
                    && parts
                        .surface_loader
                        .get_physical_device_surface_support(physical_device, i, parts.surface)
                        .unwrap_or(false)
            });
            let Some(queue_family) = queue_family else {
                rejections.push(format!("'{}' has no graphics queue that can present", name));
                continue;
            };

            let better = best.as_ref().map_or(true, |current| {
                device_type_rank(properties.device_type) < device_type_rank(current.properties.device_type)
            });
            if better {
                best = Some(SelectedDevice { physical_device, queue_family, properties });
            }
        }

        match best {
            Some(selected) => {
                let name = selected
                    .properties
                    .device_name_as_c_str()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                engine_info!(
                    "bindless::vulkan",
                    "Using GPU '{}' ({:?}), queue family {}",
                    name,
                    selected.properties.device_type,
                    selected.queue_family
                );
                Ok(selected)
            }
            None => {
                let message = format!("No suitable GPU: {}", rejections.join("; "));
                engine_error!("bindless::vulkan", "{}", message);
                Err(Error::InitializationFailed(message))
            }
        }
    }

    unsafe fn create_logical_device(instance: &ash::Instance, selected: &SelectedDevice) -> Result<ash::Device> {
        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(selected.queue_family)
            .queue_priorities(&queue_priorities)];

        let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];

        let mut features12 = vk::PhysicalDeviceVulkan12Features::default()
            .scalar_block_layout(true)
            .descriptor_indexing(true)
            .descriptor_binding_partially_bound(true)
            .descriptor_binding_variable_descriptor_count(true)
            .descriptor_binding_sampled_image_update_after_bind(true)
            .runtime_descriptor_array(true);
        let mut features13 = vk::PhysicalDeviceVulkan13Features::default()
            .dynamic_rendering(true)
            .synchronization2(true);
        let mut features2 = vk::PhysicalDeviceFeatures2::default()
            .features(vk::PhysicalDeviceFeatures::default().sampler_anisotropy(true))
            .push_next(&mut features12)
            .push_next(&mut features13);

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_extension_names)
            .push_next(&mut features2);

        instance
            .create_device(selected.physical_device, &device_create_info, None)
            .map_err(|e| init_error("Failed to create logical device", e))
    }

    /// Build the swapchain and per-frame objects for the window surface
    ///
    /// Can only be called once: the swapchain takes ownership of the surface.
    pub fn create_frame_backend(&mut self, width: u32, height: u32, frames_in_flight: usize) -> Result<VulkanFrameBackend> {
        let surface = self.surface.take().ok_or_else(|| {
            Error::InitializationFailed("The window surface is already owned by a frame backend".to_string())
        })?;
        let swapchain = Swapchain::new(Arc::clone(&self.ctx), surface, width, height, self.vsync)?;
        VulkanFrameBackend::new(Arc::clone(&self.ctx), swapchain, frames_in_flight, self.msaa_samples)
    }

    /// MSAA sample count after clamping to what the device supports
    pub fn msaa_samples(&self) -> u32 {
        self.msaa_samples
    }

    /// Validation messages received so far (all zero without validation)
    pub fn validation_stats(&self) -> ValidationStats {
        self.ctx
            .debug_state
            .as_ref()
            .map(|state| state.stats())
            .unwrap_or_default()
    }

    /// Print the validation statistics of this device
    pub fn print_validation_stats_report(&self) {
        let repeated = self
            .ctx
            .debug_state
            .as_ref()
            .map_or(0, |state| state.repeated_messages());
        print_validation_stats_report(&self.validation_stats(), repeated);
    }

    fn bindless_layout(&self) -> Result<&Arc<BindlessLayout>> {
        self.bindless.as_ref().ok_or_else(|| {
            Error::InitializationFailed("Bindless descriptor sets have not been created".to_string())
        })
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn RendererBuffer>> {
        let buffer = Buffer::new(Arc::clone(&self.ctx), &desc)?;
        Ok(Arc::new(buffer))
    }

    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn RendererTexture>> {
        let texture = Texture::new(Arc::clone(&self.ctx), &desc, 1)?;
        Ok(Arc::new(texture))
    }

    fn upload_buffer(&mut self, dst: &Arc<dyn RendererBuffer>, offset: u64, data: &[u8]) -> Result<()> {
        let buffer = as_vulkan_buffer(dst)?;
        upload_to_buffer(&self.ctx, buffer, offset, data)
    }

    fn upload_texture(&mut self, dst: &Arc<dyn RendererTexture>, data: &[u8]) -> Result<()> {
        let texture = as_vulkan_texture(dst)?;
        upload_to_image(&self.ctx, texture, data)
    }

    fn create_bindless_descriptor_sets(
        &mut self,
        desc: &BindlessLayoutDesc,
    ) -> Result<Vec<Arc<dyn RendererDescriptorSet>>> {
        if self.bindless.is_some() {
            return Err(Error::InitializationFailed(
                "Bindless descriptor sets were already created".to_string(),
            ));
        }
        if desc.frames == 0 {
            return Err(Error::InitializationFailed("At least one descriptor set is required".to_string()));
        }

        let layout = Arc::new(BindlessLayout::new(Arc::clone(&self.ctx), desc)?);
        let sets = layout.allocate_sets(desc.frames)?;
        engine_debug!(
            "bindless::vulkan",
            "Allocated {} bindless descriptor sets ({} texture slots)",
            sets.len(),
            desc.max_textures
        );

        let sets = sets
            .into_iter()
            .enumerate()
            .map(|(slot, set)| {
                Arc::new(DescriptorSet::new(set, slot, Arc::clone(&layout))) as Arc<dyn RendererDescriptorSet>
            })
            .collect();
        self.bindless = Some(layout);
        Ok(sets)
    }

    fn write_buffer_descriptor(
        &mut self,
        set: &Arc<dyn RendererDescriptorSet>,
        binding: u32,
        buffer: &Arc<dyn RendererBuffer>,
    ) -> Result<()> {
        let set = as_vulkan_descriptor_set(set)?;
        let buffer = as_vulkan_buffer(buffer)?;
        let descriptor_type = match BufferBindingKind::for_binding(binding) {
            Some(BufferBindingKind::Uniform) => vk::DescriptorType::UNIFORM_BUFFER,
            Some(BufferBindingKind::Storage) => vk::DescriptorType::STORAGE_BUFFER,
            None => {
                return Err(Error::InvalidResource(format!("Binding {} does not hold a buffer", binding)));
            }
        };

        let buffer_info = [vk::DescriptorBufferInfo {
            buffer: buffer.buffer,
            offset: 0,
            range: vk::WHOLE_SIZE,
        }];
        let write = vk::WriteDescriptorSet::default()
            .dst_set(set.set)
            .dst_binding(binding)
            .dst_array_element(0)
            .descriptor_type(descriptor_type)
            .buffer_info(&buffer_info);

        unsafe { self.ctx.device.update_descriptor_sets(&[write], &[]) };
        Ok(())
    }

    fn write_texture_descriptor(
        &mut self,
        set: &Arc<dyn RendererDescriptorSet>,
        index: u32,
        texture: &Arc<dyn RendererTexture>,
    ) -> Result<()> {
        let set = as_vulkan_descriptor_set(set)?;
        let texture = as_vulkan_texture(texture)?;
        if index >= set.layout.max_textures {
            return Err(Error::InvalidResource(format!(
                "Texture slot {} out of range (set holds {})",
                index, set.layout.max_textures
            )));
        }

        let image_info = [vk::DescriptorImageInfo {
            sampler: vk::Sampler::null(),
            image_view: texture.view,
            image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        }];
        let write = vk::WriteDescriptorSet::default()
            .dst_set(set.set)
            .dst_binding(BINDING_TEXTURES)
            .dst_array_element(index)
            .descriptor_type(vk::DescriptorType::SAMPLED_IMAGE)
            .image_info(&image_info);

        unsafe { self.ctx.device.update_descriptor_sets(&[write], &[]) };
        Ok(())
    }

    fn create_pipeline(&mut self, desc: PipelineDesc) -> Result<Arc<dyn RendererPipeline>> {
        let layout = Arc::clone(self.bindless_layout()?);
        let pipeline = Pipeline::new(Arc::clone(&self.ctx), &desc, layout)?;
        Ok(Arc::new(pipeline))
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .device_wait_idle()
                .map_err(|e| engine_err!("bindless::vulkan", "device_wait_idle failed: {:?}", e))
        }
    }
}

impl Drop for VulkanGraphicsDevice {
    fn drop(&mut self) {
        // Only still here when no frame backend was created
        if let Some(surface) = self.surface.take() {
            unsafe { self.ctx.surface_loader.destroy_surface(surface, None) };
        }
    }
}

#[cfg(test)]
#[path = "vulkan_graphics_device_tests.rs"]
mod tests;
