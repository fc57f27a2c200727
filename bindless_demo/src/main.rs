//! Bindless engine demo: a spinning cube drawn through the bindless resource manager
//!
//! Expects `shaders/cube.vert.spv` and `shaders/cube.frag.spv` (see `shaders/README.md`).

use std::f32::consts::TAU;
use std::path::Path;
use std::sync::{Arc, Mutex};

use bindless_engine::bindless::frame::{
    EventQueue, FrameDriver, FrameEvent, FrameInfo, FrameStatus, SkipReason,
};
use bindless_engine::bindless::input::{process_window_event, InputState, Key};
use bindless_engine::bindless::mesh::{cube, DrawParams};
use bindless_engine::bindless::render::{
    CommandList, CullMode, FrontFace, GraphicsDevice, Pipeline, PipelineDesc,
};
use bindless_engine::bindless::resource::{BoundResources, GlobalConstants, MeshHandle, ResourceManager};
use bindless_engine::bindless::{Config, Error, ResourceConfig, Result};
use bindless_engine::{engine_debug, engine_error, engine_info};
use glam::{Mat4, Vec3};
use bindless_engine_renderer_vulkan::bindless::{VulkanFrameBackend, VulkanGraphicsDevice};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const WINDOW_WIDTH: u32 = 640;
const WINDOW_HEIGHT: u32 = 480;

const EYE: Vec3 = Vec3::new(0.0, 0.0, 5.0);
const FOV_Y_DEGREES: f32 = 80.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Read a SPIR-V binary into words
fn load_spirv(path: &Path) -> Result<Vec<u32>> {
    let bytes = std::fs::read(path).map_err(|e| {
        Error::InitializationFailed(format!(
            "Cannot read shader '{}': {} (compile the GLSL sources in shaders/ first)",
            path.display(),
            e
        ))
    })?;
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return Err(Error::InvalidResource(format!(
            "Shader '{}' is {} bytes, not a whole number of SPIR-V words",
            path.display(),
            bytes.len()
        )));
    }

    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    if words[0] != SPIRV_MAGIC {
        return Err(Error::InvalidResource(format!("'{}' is not a SPIR-V binary", path.display())));
    }
    Ok(words)
}

/// Camera and model transform for one frame
fn cube_constants(frame: &FrameInfo) -> GlobalConstants {
    let (width, height) = frame.extent;
    let aspect = width as f32 / height.max(1) as f32;

    let angle = frame.elapsed % TAU;
    let model = Mat4::from_rotation_y(angle)
        * Mat4::from_scale(Vec3::splat(25.0))
        * Mat4::from_translation(Vec3::new(0.0, -0.1, 0.0));
    let view = Mat4::look_at_rh(EYE, Vec3::ZERO, Vec3::Y);
    let proj = Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, Z_NEAR, Z_FAR);

    GlobalConstants {
        eye_position: EYE.extend(0.0),
        view_proj: proj * view * model,
    }
}

/// Everything that exists once the window does
///
/// Field order is drop order: GPU objects go before the window they present to.
struct Demo {
    pipeline: Arc<dyn Pipeline>,
    mesh: MeshHandle,
    resources: ResourceManager,
    driver: FrameDriver<VulkanFrameBackend>,
    vulkan: Arc<Mutex<VulkanGraphicsDevice>>,
    window: Window,
}

impl Demo {
    fn new(window: Window) -> Result<Self> {
        let config = Config {
            app_name: "Bindless Demo".to_string(),
            vsync: true,
            ..Config::default()
        };
        let resource_config = ResourceConfig::default();

        let mut vulkan = VulkanGraphicsDevice::new(&window, &config)?;
        let size = window.inner_size();
        let backend = vulkan.create_frame_backend(size.width, size.height, resource_config.frames_in_flight)?;

        let pipeline_desc = PipelineDesc {
            name: "cube".to_string(),
            vertex_spirv: load_spirv(&shader_path("cube.vert.spv"))?,
            fragment_spirv: load_spirv(&shader_path("cube.frag.spv"))?,
            color_format: backend.color_format(),
            depth_format: Some(backend.depth_format()),
            samples: backend.samples(),
            cull_mode: CullMode::Back,
            front_face: FrontFace::Clockwise,
            push_constant_size: DrawParams::SIZE,
        };

        let vulkan = Arc::new(Mutex::new(vulkan));
        let device: Arc<Mutex<dyn GraphicsDevice>> = vulkan.clone();

        let mut resources = ResourceManager::new(Arc::clone(&device), resource_config)?;
        let mesh = resources.create_mesh(&cube())?;

        let pipeline = device
            .lock()
            .map_err(|_| Error::BackendError("Graphics device lock poisoned".to_string()))?
            .create_pipeline(pipeline_desc)?;

        engine_info!(
            "bindless::demo",
            "Cube uploaded: {} indices at vertex offset {}",
            mesh.index_count,
            mesh.vertex_offset
        );

        Ok(Self {
            pipeline,
            mesh,
            resources,
            driver: FrameDriver::new(backend),
            vulkan,
            window,
        })
    }

    fn tick(&mut self, events: &mut EventQueue, input: &mut InputState) -> Result<FrameStatus> {
        let pipeline = Arc::clone(&self.pipeline);
        let mesh = self.mesh;

        let mut update = |frame: &FrameInfo, _input: &InputState| cube_constants(frame);
        let mut record = |cmd: &mut dyn CommandList, bound: &BoundResources, _frame: &FrameInfo| -> Result<()> {
            let params = DrawParams {
                vertex_offset: mesh.vertex_offset,
                ..DrawParams::default()
            };
            cmd.bind_pipeline(&pipeline)?;
            cmd.bind_descriptor_set(&pipeline, &bound.descriptor_set)?;
            cmd.bind_index_buffer(&bound.index_buffer, 0)?;
            cmd.push_constants(0, bytemuck::bytes_of(&params))?;
            cmd.draw_indexed(mesh.index_count, mesh.first_index, 0)
        };

        self.driver.tick(&mut self.resources, events, input, &mut update, &mut record)
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.driver.shutdown() {
            engine_error!("bindless::demo", "Shutdown failed: {}", e);
        }
        if let Ok(vulkan) = self.vulkan.lock() {
            vulkan.print_validation_stats_report();
        }
    }
}

fn shader_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders").join(name)
}

#[derive(Default)]
struct App {
    demo: Option<Demo>,
    events: EventQueue,
    input: InputState,
    error: Option<Error>,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.demo.is_some() {
            self.events.push(FrameEvent::Resume);
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("Bindless Engine")
            .with_inner_size(winit::dpi::PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => window,
            Err(e) => {
                self.fail(event_loop, Error::InitializationFailed(format!("Failed to create window: {}", e)));
                return;
            }
        };

        match Demo::new(window) {
            Ok(demo) => self.demo = Some(demo),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.events.push(FrameEvent::Suspend);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if process_window_event(&mut self.input, &event) {
            if self.input.is_key_pressed(Key::Escape) {
                event_loop.exit();
            }
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                self.events.push(FrameEvent::Resize { width: size.width, height: size.height });
            }
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::RedrawRequested => {
                let Some(demo) = self.demo.as_mut() else {
                    return;
                };
                self.events.push(FrameEvent::Tick);
                match demo.tick(&mut self.events, &mut self.input) {
                    Ok(FrameStatus::Skipped(SkipReason::OutOfDate)) => {
                        engine_debug!("bindless::demo", "Frame skipped, swapchain out of date");
                    }
                    Ok(_) => {}
                    Err(e) => self.fail(event_loop, e),
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.on_raw_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(demo) = &self.demo {
            demo.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(demo) = self.demo.as_mut() {
            demo.shutdown();
        }
    }
}

fn main() {
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            eprintln!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    if let Err(e) = event_loop.run_app(&mut app) {
        eprintln!("Event loop error: {}", e);
        std::process::exit(1);
    }

    // GPU objects must be gone before the process reports
    drop(app.demo.take());
    if let Some(e) = app.error {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
