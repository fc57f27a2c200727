/// Window notifications queued for the frame driver

use std::collections::VecDeque;

/// What the window layer tells the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// Time to render a frame
    Tick,
    /// Framebuffer size changed (physical pixels)
    Resize { width: u32, height: u32 },
    /// Window minimized or hidden; stop rendering
    Suspend,
    /// Window visible again
    Resume,
}

/// FIFO of pending frame events
///
/// Owned by the application, filled from window callbacks and drained by
/// the frame driver at the start of every tick.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<FrameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: FrameEvent) {
        self.events.push_back(event);
    }

    /// Remove and return every queued event, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = FrameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
