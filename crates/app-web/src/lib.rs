#![cfg(target_arch = "wasm32")]

mod audio;
mod clock;
mod dom;
mod events;
mod frame;
mod input;
mod overlay;
mod render;

use app_core::{
    ClockAction, Command, GridSnapshot, PaintAction, Stopwatch, Studio, StudioParams, Trigger,
    LAYER_COUNT, MASTER_GAIN_STEP,
};
use audio::MasterBus;
use clock::IntervalClock;
use frame::RenderDriver;
use render::GridPainter;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Page-wide handles. Cheap to clone; every field is shared.
#[derive(Clone)]
pub(crate) struct App {
    studio: Rc<RefCell<Studio>>,
    bus: Rc<RefCell<MasterBus>>,
    clock: Rc<RefCell<IntervalClock>>,
    frames: RenderDriver,
    painter: Rc<GridPainter>,
    stopwatch: Stopwatch,
    document: web::Document,
}

impl App {
    /// First user gesture: build or resume audio and drop the start overlay.
    pub(crate) fn wake(&self) {
        self.bus.borrow_mut().initialize();
        overlay::hide_start(&self.document);
    }

    fn start_clock(&self) {
        let period = self.studio.borrow().transport().step_interval();
        let app = self.clone();
        let mut triggers: Vec<Trigger> = Vec::new();
        self.clock
            .borrow_mut()
            .restart(period, move || app.step(&mut triggers));
    }

    fn step(&self, triggers: &mut Vec<Trigger>) {
        triggers.clear();
        let now = self.stopwatch.elapsed_ms();
        self.studio.borrow_mut().tick(now, triggers);
        {
            let mut bus = self.bus.borrow_mut();
            for trigger in triggers.iter() {
                trigger.fire(&mut *bus);
            }
        }
        if !triggers.is_empty() {
            self.frames.request();
        }
        // Playhead moved; draw now unless a frame is already coming
        if !self.frames.is_running() {
            self.redraw();
        }
    }

    fn apply_clock(&self, action: ClockAction) {
        match action {
            ClockAction::None => {}
            ClockAction::Start | ClockAction::Restart => self.start_clock(),
            ClockAction::Stop => self.clock.borrow_mut().stop(),
        }
    }

    pub(crate) fn handle_command(&self, command: Command) {
        match command {
            Command::MasterGainUp | Command::MasterGainDown => {
                let mut bus = self.bus.borrow_mut();
                let delta = if command == Command::MasterGainUp {
                    MASTER_GAIN_STEP
                } else {
                    -MASTER_GAIN_STEP
                };
                let level = bus.master_gain() + delta;
                bus.set_master_gain(level);
            }
            Command::ToggleHint => overlay::toggle_hint(&self.document),
            other => {
                let action = self.studio.borrow_mut().apply(other);
                self.apply_clock(action);
            }
        }
        self.redraw();
    }

    pub(crate) fn paint(&self, action: PaintAction) {
        self.studio.borrow_mut().paint(action);
        self.redraw();
    }

    fn redraw(&self) {
        let snapshot = self.studio.borrow().snapshot(self.stopwatch.elapsed_ms());
        self.painter.draw(&snapshot);
        self.refresh_hud(&snapshot);
    }

    fn refresh_hud(&self, snapshot: &GridSnapshot) {
        let status = format!(
            "{} {} \u{00b7} {:.0} BPM \u{00b7} {} \u{00b7} vol {:.0}% \u{00b7} master {:.0}%",
            snapshot.layer + 1,
            snapshot.layer_name,
            snapshot.bpm,
            snapshot.archetype.label(),
            snapshot.volume * 100.0,
            self.bus.borrow().master_gain() * 100.0,
        );
        dom::set_text(&self.document, "hud", &status);
        let label = if snapshot.running { "Pause" } else { "Play" };
        dom::set_text(&self.document, "play-toggle", label);
        for layer in 0..LAYER_COUNT {
            let id = format!("layer-{layer}");
            dom::set_class(&self.document, &id, "active", layer == snapshot.layer);
        }
    }

    fn dispose(&self) {
        self.frames.cancel();
        self.clock.borrow_mut().stop();
        self.bus.borrow_mut().dispose();
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("app-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id("app-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #app-canvas"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    dom::sync_canvas_backing_size(&canvas);

    let studio = Rc::new(RefCell::new(Studio::new(StudioParams::default())));
    let painter = Rc::new(GridPainter::new(canvas.clone())?);
    let stopwatch = Stopwatch::new();

    let frames = {
        let studio = Rc::clone(&studio);
        let painter = Rc::clone(&painter);
        RenderDriver::new(move || {
            let now = stopwatch.elapsed_ms();
            let snapshot = {
                let mut studio = studio.borrow_mut();
                studio.step_effects(now);
                studio.snapshot(now)
            };
            painter.draw(&snapshot);
            snapshot.live_effects > 0
        })
    };

    let app = App {
        studio,
        bus: Rc::new(RefCell::new(MasterBus::new())),
        clock: Rc::new(RefCell::new(IntervalClock::new())),
        frames,
        painter,
        stopwatch,
        document: document.clone(),
    };

    events::wire_keyboard(&window, app.clone());
    events::wire_pointer(&window, &canvas, app.clone());
    events::wire_buttons(&document, &app);

    {
        let app = app.clone();
        let canvas = canvas.clone();
        let on_resize = Closure::wrap(Box::new(move || {
            dom::sync_canvas_backing_size(&canvas);
            app.redraw();
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
            .ok();
        on_resize.forget();
    }
    {
        let app = app.clone();
        let on_hide = Closure::wrap(Box::new(move || app.dispose()) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("pagehide", on_hide.as_ref().unchecked_ref())
            .ok();
        on_hide.forget();
    }

    app.redraw();
    log::info!("[input] space play, 1-4 layer, arrows tempo/master, e effect, [ ] volume, c clear, h hint");
    Ok(())
}
