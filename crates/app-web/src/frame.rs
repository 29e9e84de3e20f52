//! requestAnimationFrame driver that only runs while effects are live.

use app_core::FrameLoop;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type Tick = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

#[derive(Clone)]
pub struct RenderDriver {
    frames: Rc<RefCell<FrameLoop>>,
    handle: Rc<Cell<Option<i32>>>,
    tick: Tick,
}

fn schedule(tick: &Tick) -> Option<i32> {
    let window = web::window()?;
    let tick = tick.borrow();
    let callback = tick.as_ref()?;
    window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .ok()
}

impl RenderDriver {
    /// `frame` draws one frame and reports whether any effect is still live.
    pub fn new(mut frame: impl FnMut() -> bool + 'static) -> Self {
        let frames = Rc::new(RefCell::new(FrameLoop::new()));
        let handle: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let tick: Tick = Rc::new(RefCell::new(None));

        let frames_tick = Rc::clone(&frames);
        let handle_tick = Rc::clone(&handle);
        let tick_clone = Rc::clone(&tick);
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            handle_tick.set(None);
            if !frames_tick.borrow().is_running() {
                return;
            }
            let live = frame();
            if frames_tick.borrow_mut().finish_frame(live) {
                handle_tick.set(schedule(&tick_clone));
            }
        }) as Box<dyn FnMut()>));

        Self {
            frames,
            handle,
            tick,
        }
    }

    pub fn is_running(&self) -> bool {
        self.frames.borrow().is_running()
    }

    /// Start the loop if it is idle. No-op while frames are already flowing.
    pub fn request(&self) {
        if self.frames.borrow_mut().request() {
            self.handle.set(schedule(&self.tick));
        }
    }

    pub fn cancel(&self) {
        self.frames.borrow_mut().cancel();
        if let Some(handle) = self.handle.take() {
            if let Some(window) = web::window() {
                let _ = window.cancel_animation_frame(handle);
            }
        }
    }
}
