//! Frame loop: event queue and the per-frame state machine

pub mod frame_event;
pub mod frame_driver;

pub use frame_event::{EventQueue, FrameEvent};
pub use frame_driver::{
    AcquireOutcome, DrawRecorder, FrameBackend, FrameDriver, FrameInfo, FramePhase, FrameStatus,
    FrameUpdate, PresentOutcome, SkipReason,
};
