/// Pipeline - Vulkan graphics pipeline over the bindless layout
///
/// Built for dynamic rendering: no render pass, the attachment formats come
/// from `VkPipelineRenderingCreateInfo`. There is no vertex input state,
/// vertex shaders pull from the bindless vertex buffer.

use bindless_engine::bindless::{
    Result,
    Error,
    render::{CullMode, FrontFace, Pipeline as RendererPipeline, PipelineDesc},
};
use bindless_engine::{engine_debug, engine_err};
use ash::vk;
use std::any::Any;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_descriptor_set::BindlessLayout;
use crate::vulkan_texture::{format_to_vk, sample_count_to_vk};

/// Stages that see the push constant range
pub(crate) const PUSH_CONSTANT_STAGES: vk::ShaderStageFlags = vk::ShaderStageFlags::from_raw(
    vk::ShaderStageFlags::VERTEX.as_raw() | vk::ShaderStageFlags::FRAGMENT.as_raw(),
);

/// Vulkan pipeline implementation
pub struct Pipeline {
    ctx: Arc<GpuContext>,
    pub(crate) pipeline: vk::Pipeline,
    /// Bindless set layout + push constant range
    pub(crate) pipeline_layout: vk::PipelineLayout,
    pub(crate) push_constant_size: u32,
    /// The layout's samplers must outlive the pipeline layout
    _bindless: Arc<BindlessLayout>,
}

pub(crate) fn cull_mode_to_vk(cull_mode: CullMode) -> vk::CullModeFlags {
    match cull_mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

pub(crate) fn front_face_to_vk(front_face: FrontFace) -> vk::FrontFace {
    match front_face {
        FrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        FrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
    }
}

/// # Safety
///
/// `device` must be a valid device.
unsafe fn create_shader_module(device: &ash::Device, name: &str, stage: &str, code: &[u32]) -> Result<vk::ShaderModule> {
    if code.is_empty() {
        return Err(Error::InvalidResource(format!("Pipeline '{}' has an empty {} shader", name, stage)));
    }
    let create_info = vk::ShaderModuleCreateInfo::default().code(code);
    device.create_shader_module(&create_info, None)
        .map_err(|e| engine_err!("bindless::vulkan", "Failed to create {} shader module for '{}': {:?}", stage, name, e))
}

impl Pipeline {
    pub(crate) fn new(ctx: Arc<GpuContext>, desc: &PipelineDesc, bindless: Arc<BindlessLayout>) -> Result<Self> {
        unsafe {
            let vertex_module = create_shader_module(&ctx.device, &desc.name, "vertex", &desc.vertex_spirv)?;
            let fragment_module = match create_shader_module(&ctx.device, &desc.name, "fragment", &desc.fragment_spirv) {
                Ok(module) => module,
                Err(e) => {
                    ctx.device.destroy_shader_module(vertex_module, None);
                    return Err(e);
                }
            };

            let result = Self::build(&ctx, desc, &bindless, vertex_module, fragment_module);

            // Modules are only needed while the pipeline is compiled
            ctx.device.destroy_shader_module(vertex_module, None);
            ctx.device.destroy_shader_module(fragment_module, None);

            let (pipeline, pipeline_layout) = result?;
            engine_debug!("bindless::vulkan", "Created pipeline '{}' ({}x MSAA)", desc.name, desc.samples);

            Ok(Self {
                ctx,
                pipeline,
                pipeline_layout,
                push_constant_size: desc.push_constant_size,
                _bindless: bindless,
            })
        }
    }

    unsafe fn build(
        ctx: &GpuContext,
        desc: &PipelineDesc,
        bindless: &BindlessLayout,
        vertex_module: vk::ShaderModule,
        fragment_module: vk::ShaderModule,
    ) -> Result<(vk::Pipeline, vk::PipelineLayout)> {
        let entry_point = c"main";
        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vertex_module)
                .name(entry_point),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(fragment_module)
                .name(entry_point),
        ];

        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default();

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        // Viewport state (dynamic)
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(cull_mode_to_vk(desc.cull_mode))
            .front_face(front_face_to_vk(desc.front_face))
            .depth_bias_enable(false);

        let has_depth = desc.depth_format.is_some();
        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(has_depth)
            .depth_write_enable(has_depth)
            .depth_compare_op(vk::CompareOp::LESS)
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .sample_shading_enable(false)
            .rasterization_samples(sample_count_to_vk(desc.samples))
            .alpha_to_coverage_enable(false);

        let color_blend_attachment = vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(false);
        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(std::slice::from_ref(&color_blend_attachment));

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let push_constant_ranges = [vk::PushConstantRange {
            stage_flags: PUSH_CONSTANT_STAGES,
            offset: 0,
            size: desc.push_constant_size,
        }];
        let set_layouts = [bindless.set_layout];
        let mut layout_create_info = vk::PipelineLayoutCreateInfo::default().set_layouts(&set_layouts);
        if desc.push_constant_size > 0 {
            layout_create_info = layout_create_info.push_constant_ranges(&push_constant_ranges);
        }

        let layout = ctx.device.create_pipeline_layout(&layout_create_info, None)
            .map_err(|e| engine_err!("bindless::vulkan", "Failed to create pipeline layout: {:?}", e))?;

        let color_formats = [format_to_vk(desc.color_format)];
        let mut rendering_info = vk::PipelineRenderingCreateInfo::default().color_attachment_formats(&color_formats);
        // Frames only bind a depth attachment, the stencil aspect stays unused
        if let Some(depth_format) = desc.depth_format {
            rendering_info = rendering_info.depth_attachment_format(format_to_vk(depth_format));
        }

        let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .depth_stencil_state(&depth_stencil_state)
            .multisample_state(&multisample_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(layout)
            .push_next(&mut rendering_info);

        let pipelines = ctx.device.create_graphics_pipelines(
            vk::PipelineCache::null(),
            &[pipeline_create_info],
            None,
        );
        match pipelines {
            Ok(pipelines) => Ok((pipelines[0], layout)),
            Err((_, e)) => {
                ctx.device.destroy_pipeline_layout(layout, None);
                Err(engine_err!("bindless::vulkan", "Failed to create graphics pipeline '{}': {:?}", desc.name, e))
            }
        }
    }
}

impl RendererPipeline for Pipeline {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_pipeline(self.pipeline, None);
            self.ctx.device.destroy_pipeline_layout(self.pipeline_layout, None);
        }
    }
}
