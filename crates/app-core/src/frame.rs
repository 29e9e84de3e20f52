//! Scheduling state for the render-frame driver.
//!
//! The driver only runs while effects are live: a frame that finds the
//! effect set empty stops scheduling the next one, and a new effect
//! re-requests the loop. Frontends keep the actual timer (rAF or winit
//! redraws); this type only answers "should a frame be scheduled now".

use instant::Instant;

#[derive(Debug, Default)]
pub struct FrameLoop {
    running: bool,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Ask for frames. Returns true when the loop was idle and the caller
    /// must schedule the first frame.
    pub fn request(&mut self) -> bool {
        if self.running {
            false
        } else {
            self.running = true;
            true
        }
    }

    /// Record a completed frame. Returns whether another frame should follow.
    pub fn finish_frame(&mut self, has_live_effects: bool) -> bool {
        self.frames += 1;
        if !has_live_effects {
            self.running = false;
        }
        self.running
    }

    pub fn cancel(&mut self) {
        self.running = false;
    }
}

/// Monotonic milliseconds since construction, shared by both drivers.
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    start: Instant,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}
