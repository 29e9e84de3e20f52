//! Sequencer clock on `setInterval`.

use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Default)]
pub struct IntervalClock {
    handle: Option<i32>,
    callback: Option<Closure<dyn FnMut()>>,
}

impl IntervalClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `on_tick` once per `period`, first after one full period.
    /// Replaces any interval already installed.
    pub fn restart(&mut self, period: Duration, on_tick: impl FnMut() + 'static) {
        self.stop();
        let Some(window) = web::window() else {
            log::error!("[clock] no window");
            return;
        };
        let callback = Closure::wrap(Box::new(on_tick) as Box<dyn FnMut()>);
        let timeout_ms = (period.as_secs_f64() * 1000.0).round().clamp(1.0, i32::MAX as f64) as i32;
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            timeout_ms,
        ) {
            Ok(handle) => {
                log::info!("[clock] started, {timeout_ms} ms per step");
                self.handle = Some(handle);
                self.callback = Some(callback);
            }
            Err(e) => log::error!("[clock] setInterval failed: {e:?}"),
        }
    }

    /// Clear the interval. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Some(window) = web::window() {
                window.clear_interval_with_handle(handle);
            }
            log::info!("[clock] stopped");
        }
        self.callback = None;
    }
}

impl Drop for IntervalClock {
    fn drop(&mut self) {
        self.stop();
    }
}
