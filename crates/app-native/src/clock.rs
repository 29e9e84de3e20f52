//! Fixed-period sequencer clock on a dedicated thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub struct SequencerClock {
    worker: Option<(JoinHandle<()>, Arc<AtomicBool>)>,
}

impl Default for SequencerClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SequencerClock {
    pub fn new() -> Self {
        Self { worker: None }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Call `on_tick` once per `period`, first after one full period.
    /// Replaces any clock already running.
    pub fn restart<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.stop();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let spawned = thread::Builder::new()
            .name("sequencer-clock".into())
            .spawn(move || {
                let mut next = Instant::now() + period;
                while !flag.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if now < next {
                        thread::park_timeout(next - now);
                        continue;
                    }
                    on_tick();
                    next += period;
                    // Fell behind by more than a step: resync instead of bursting
                    if Instant::now() > next + period {
                        next = Instant::now() + period;
                    }
                }
            });
        match spawned {
            Ok(handle) => {
                log::info!("[clock] started, {:.1} ms per step", period.as_secs_f64() * 1000.0);
                self.worker = Some((handle, cancel));
            }
            Err(e) => log::error!("[clock] failed to spawn: {e}"),
        }
    }

    /// Cancel the clock and wait for its thread. Idempotent.
    pub fn stop(&mut self) {
        let Some((handle, cancel)) = self.worker.take() else {
            return;
        };
        cancel.store(true, Ordering::Release);
        handle.thread().unpark();
        if handle.join().is_err() {
            log::warn!("[clock] tick callback panicked");
        }
        log::info!("[clock] stopped");
    }
}

impl Drop for SequencerClock {
    fn drop(&mut self) {
        self.stop();
    }
}
