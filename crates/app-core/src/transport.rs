use crate::constants::{BPM_DEFAULT, BPM_MAX, BPM_MIN, GRID_SIZE, STEPS_PER_BEAT};
use std::time::Duration;

/// Clamp a requested tempo into the playable range. NaN falls back to the default.
pub fn clamp_bpm(bpm: f32) -> f32 {
    if bpm.is_nan() {
        BPM_DEFAULT
    } else {
        bpm.clamp(BPM_MIN, BPM_MAX)
    }
}

/// Step column, tempo and running flag of the sequencer.
#[derive(Clone, Debug)]
pub struct Transport {
    step: Option<usize>,
    bpm: f32,
    running: bool,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(BPM_DEFAULT)
    }
}

impl Transport {
    pub fn new(bpm: f32) -> Self {
        Self {
            step: None,
            bpm: clamp_bpm(bpm),
            running: false,
        }
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current column, or -1 while stopped.
    pub fn current_step_column(&self) -> i32 {
        self.step.map(|s| s as i32).unwrap_or(-1)
    }

    pub fn step(&self) -> Option<usize> {
        self.step
    }

    /// Set the tempo. Returns true when a running clock has to be rescheduled.
    pub fn set_tempo(&mut self, bpm: f32) -> bool {
        let clamped = clamp_bpm(bpm);
        let changed = (clamped - self.bpm).abs() > f32::EPSILON;
        self.bpm = clamped;
        changed && self.running
    }

    pub fn play(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
        self.step = None;
    }

    pub fn toggle(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Sixteenth-note period at the current tempo.
    pub fn step_interval(&self) -> Duration {
        let ms = 60_000.0 / clamp_bpm(self.bpm) as f64 / STEPS_PER_BEAT as f64;
        Duration::from_secs_f64(ms / 1000.0)
    }

    /// Move to the next column. Does nothing while stopped.
    pub fn advance(&mut self) -> Option<usize> {
        if !self.running {
            return None;
        }
        let next = self.step.map(|s| (s + 1) % GRID_SIZE).unwrap_or(0);
        self.step = Some(next);
        Some(next)
    }
}
