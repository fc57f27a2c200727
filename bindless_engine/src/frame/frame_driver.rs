/// Frame loop driver
///
/// Runs one frame per `Tick` through `WaitFence -> Acquire -> Record ->
/// Submit -> Present`, generic over a [`FrameBackend`] that owns the actual
/// swapchain, fences and command buffers. The driver owns the ordering
/// rules: a slot's fence is observed before anything is written to that
/// slot, and a slot is marked in flight as soon as it is submitted.

use std::time::Instant;

use crate::error::{Error, Result};
use crate::frame::{EventQueue, FrameEvent};
use crate::graphics_device::CommandList;
use crate::input::InputState;
use crate::resource::{BoundResources, GlobalConstants, ResourceManager};
use crate::{engine_debug, engine_info, engine_trace};

/// Where the driver currently is inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    WaitFence,
    Acquire,
    Record,
    Submit,
    Present,
}

/// Result of asking the swapchain for the next image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    Acquired { image_index: u32, suboptimal: bool },
    /// Swapchain no longer matches the surface, nothing was acquired
    OutOfDate,
}

/// Result of presenting an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    Suboptimal,
    OutOfDate,
}

/// Why a tick did not render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Suspended,
    NoTick,
    OutOfDate,
    ZeroExtent,
}

/// What one call to [`FrameDriver::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Rendered { slot: usize, image_index: u32 },
    Skipped(SkipReason),
}

/// Per-frame timing handed to the collaborators
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Frames rendered before this one
    pub frame_count: u64,
    pub slot: usize,
    /// Seconds since the driver was created
    pub elapsed: f32,
    /// Seconds since the previous rendered frame
    pub delta: f32,
    /// Render area in pixels
    pub extent: (u32, u32),
}

/// Presentation side of a frame, implemented by a graphics backend
///
/// `record_frame` resets the slot's command buffer, transitions the
/// attachments, begins rendering with a flipped viewport and full scissor,
/// calls `draw`, then transitions the image for presentation. `submit`
/// resets the slot's fence right before queuing, so a failed acquire or
/// record never leaves a fence that nothing will signal.
pub trait FrameBackend {
    fn frames_in_flight(&self) -> usize;

    /// Current swapchain extent
    fn extent(&self) -> (u32, u32);

    /// Block until the GPU is done with everything last submitted from `slot`
    fn wait_for_slot(&mut self, slot: usize) -> Result<()>;

    fn acquire_image(&mut self, slot: usize) -> Result<AcquireOutcome>;

    fn record_frame(
        &mut self,
        slot: usize,
        image_index: u32,
        draw: &mut dyn FnMut(&mut dyn CommandList, (u32, u32)) -> Result<()>,
    ) -> Result<()>;

    fn submit(&mut self, slot: usize, image_index: u32) -> Result<()>;

    fn present(&mut self, slot: usize, image_index: u32) -> Result<PresentOutcome>;

    /// Rebuild swapchain and size-dependent targets after a device-idle wait
    fn recreate(&mut self, width: u32, height: u32) -> Result<()>;

    fn wait_idle(&mut self) -> Result<()>;
}

/// Produces the global constants of a frame
pub trait FrameUpdate {
    fn update(&mut self, frame: &FrameInfo, input: &InputState) -> GlobalConstants;
}

impl<F> FrameUpdate for F
where
    F: FnMut(&FrameInfo, &InputState) -> GlobalConstants,
{
    fn update(&mut self, frame: &FrameInfo, input: &InputState) -> GlobalConstants {
        self(frame, input)
    }
}

/// Records draw commands inside the frame's render pass
pub trait DrawRecorder {
    fn record(
        &mut self,
        cmd: &mut dyn CommandList,
        bound: &BoundResources,
        frame: &FrameInfo,
    ) -> Result<()>;
}

impl<F> DrawRecorder for F
where
    F: FnMut(&mut dyn CommandList, &BoundResources, &FrameInfo) -> Result<()>,
{
    fn record(
        &mut self,
        cmd: &mut dyn CommandList,
        bound: &BoundResources,
        frame: &FrameInfo,
    ) -> Result<()> {
        self(cmd, bound, frame)
    }
}

pub struct FrameDriver<B: FrameBackend> {
    backend: B,
    phase: FramePhase,
    frame_count: u64,
    suspended: bool,
    resize_pending: bool,
    /// Last size reported by the window
    window_extent: (u32, u32),
    start: Instant,
    last_frame: Instant,
}

impl<B: FrameBackend> FrameDriver<B> {
    pub fn new(backend: B) -> Self {
        let window_extent = backend.extent();
        let now = Instant::now();
        engine_info!(
            "bindless::frame",
            "Frame driver ready: {} frames in flight, {}x{}",
            backend.frames_in_flight(),
            window_extent.0,
            window_extent.1
        );
        Self {
            backend,
            phase: FramePhase::Idle,
            frame_count: 0,
            suspended: false,
            resize_pending: false,
            window_extent,
            start: now,
            last_frame: now,
        }
    }

    /// Drain `events` and render at most one frame
    pub fn tick<U, D>(
        &mut self,
        resources: &mut ResourceManager,
        events: &mut EventQueue,
        input: &mut InputState,
        update: &mut U,
        recorder: &mut D,
    ) -> Result<FrameStatus>
    where
        U: FrameUpdate + ?Sized,
        D: DrawRecorder + ?Sized,
    {
        let ticked = self.drain_events(events);

        if self.suspended {
            return Ok(FrameStatus::Skipped(SkipReason::Suspended));
        }

        if self.resize_pending {
            let (width, height) = self.window_extent;
            if width == 0 || height == 0 {
                return Ok(FrameStatus::Skipped(SkipReason::ZeroExtent));
            }
            engine_debug!("bindless::frame", "Recreating swapchain at {}x{}", width, height);
            self.backend.recreate(width, height)?;
            self.resize_pending = false;
        }

        if !ticked {
            return Ok(FrameStatus::Skipped(SkipReason::NoTick));
        }

        let frames = self.backend.frames_in_flight();
        if frames != resources.frames_in_flight() {
            return Err(Error::InvalidResource(format!(
                "Backend has {} frames in flight, resources have {}",
                frames,
                resources.frames_in_flight()
            )));
        }
        let slot = (self.frame_count % frames as u64) as usize;

        // ===== WAIT FENCE =====
        self.phase = FramePhase::WaitFence;
        self.backend.wait_for_slot(slot)?;
        resources.begin_frame(slot)?;

        let now = Instant::now();
        let info = FrameInfo {
            frame_count: self.frame_count,
            slot,
            elapsed: now.duration_since(self.start).as_secs_f32(),
            delta: now.duration_since(self.last_frame).as_secs_f32(),
            extent: self.backend.extent(),
        };
        self.last_frame = now;

        let constants = update.update(&info, input);
        input.begin_frame();
        resources.write_global_constants(slot, &constants)?;

        // ===== ACQUIRE =====
        self.phase = FramePhase::Acquire;
        let image_index = match self.backend.acquire_image(slot)? {
            AcquireOutcome::Acquired { image_index, suboptimal } => {
                if suboptimal {
                    self.resize_pending = true;
                }
                image_index
            }
            AcquireOutcome::OutOfDate => {
                engine_debug!("bindless::frame", "Swapchain out of date, skipping frame {}", self.frame_count);
                self.resize_pending = true;
                self.phase = FramePhase::Idle;
                return Ok(FrameStatus::Skipped(SkipReason::OutOfDate));
            }
        };

        // ===== RECORD =====
        self.phase = FramePhase::Record;
        let bound = resources.bound_resources(slot)?;
        let mut draw = |cmd: &mut dyn CommandList, extent: (u32, u32)| {
            let frame = FrameInfo { extent, ..info };
            recorder.record(cmd, &bound, &frame)
        };
        self.backend.record_frame(slot, image_index, &mut draw)?;

        // ===== SUBMIT =====
        self.phase = FramePhase::Submit;
        self.backend.submit(slot, image_index)?;
        resources.end_frame(slot)?;

        // ===== PRESENT =====
        self.phase = FramePhase::Present;
        match self.backend.present(slot, image_index)? {
            PresentOutcome::Presented => {}
            PresentOutcome::Suboptimal | PresentOutcome::OutOfDate => {
                self.resize_pending = true;
            }
        }

        engine_trace!("bindless::frame", "Frame {} presented (slot {}, image {})", self.frame_count, slot, image_index);
        self.frame_count += 1;
        self.phase = FramePhase::Idle;

        Ok(FrameStatus::Rendered { slot, image_index })
    }

    /// Wait for the GPU to finish everything; call before dropping resources
    pub fn shutdown(&mut self) -> Result<()> {
        engine_info!("bindless::frame", "Shutting down after {} frames", self.frame_count);
        self.phase = FramePhase::Idle;
        self.backend.wait_idle()
    }

    /// Returns whether a `Tick` was among the drained events
    fn drain_events(&mut self, events: &mut EventQueue) -> bool {
        let mut ticked = false;
        for event in events.drain() {
            match event {
                FrameEvent::Tick => ticked = true,
                FrameEvent::Resize { width, height } => {
                    self.window_extent = (width, height);
                    self.resize_pending = true;
                }
                FrameEvent::Suspend => self.suspended = true,
                FrameEvent::Resume => self.suspended = false,
            }
        }
        ticked
    }

    // ===== ACCESSORS =====

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn is_resize_pending(&self) -> bool {
        self.resize_pending
    }

    pub fn window_extent(&self) -> (u32, u32) {
        self.window_extent
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
#[path = "frame_driver_tests.rs"]
mod tests;
