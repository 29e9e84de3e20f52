mod audio;
mod clock;
mod dsp;
mod render;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use app_core::{
    cell_in_surface, command_for_key, ClockAction, Command, FrameLoop, PaintGesture, Stopwatch, Studio,
    StudioParams, Trigger, MASTER_GAIN_STEP,
};
use audio::MasterBus;
use clock::SequencerClock;
use render::GpuState;
use winit::{
    dpi::PhysicalPosition,
    event::*,
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

const HINT: &str = "space play  1-4 layer  \u{2190}/\u{2192} tempo  \u{2191}/\u{2193} master  e effect  [ ] volume  c clear  h hint";

/// Sent from the clock thread after each step.
#[derive(Debug, Clone, Copy)]
enum UserEvent {
    Stepped { spawned: bool },
}

fn lock_studio(studio: &Mutex<Studio>) -> MutexGuard<'_, Studio> {
    studio.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Map a winit logical key to the DOM key name the shared bindings use.
fn dom_key(key: &Key) -> Option<&str> {
    match key {
        Key::Character(s) => Some(s.as_str()),
        Key::Named(NamedKey::Space) => Some(" "),
        Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft"),
        Key::Named(NamedKey::ArrowRight) => Some("ArrowRight"),
        Key::Named(NamedKey::ArrowUp) => Some("ArrowUp"),
        Key::Named(NamedKey::ArrowDown) => Some("ArrowDown"),
        _ => None,
    }
}

struct App {
    studio: Arc<Mutex<Studio>>,
    bus: MasterBus,
    clock: SequencerClock,
    frames: FrameLoop,
    stopwatch: Stopwatch,
    proxy: EventLoopProxy<UserEvent>,
    gesture: PaintGesture,
    cursor: Option<PhysicalPosition<f64>>,
    hint_visible: bool,
}

impl App {
    fn start_clock(&mut self) {
        let studio = Arc::clone(&self.studio);
        let mut port = self.bus.port();
        let proxy = self.proxy.clone();
        let stopwatch = self.stopwatch;
        let period = lock_studio(&self.studio).transport().step_interval();
        let mut triggers: Vec<Trigger> = Vec::new();
        self.clock.restart(period, move || {
            triggers.clear();
            lock_studio(&studio).tick(stopwatch.elapsed_ms(), &mut triggers);
            // Fire outside the studio lock
            for trigger in &triggers {
                trigger.fire(&mut port);
            }
            let spawned = !triggers.is_empty();
            if proxy.send_event(UserEvent::Stepped { spawned }).is_err() {
                log::debug!("[clock] event loop gone");
            }
        });
    }

    fn apply_clock(&mut self, action: ClockAction) {
        match action {
            ClockAction::None => {}
            ClockAction::Start | ClockAction::Restart => self.start_clock(),
            ClockAction::Stop => self.clock.stop(),
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::MasterGainUp => {
                let level = self.bus.master_gain() + MASTER_GAIN_STEP;
                self.bus.set_master_gain(level);
            }
            Command::MasterGainDown => {
                let level = self.bus.master_gain() - MASTER_GAIN_STEP;
                self.bus.set_master_gain(level);
            }
            Command::ToggleHint => self.hint_visible = !self.hint_visible,
            other => {
                let action = lock_studio(&self.studio).apply(other);
                self.apply_clock(action);
            }
        }
    }

    fn cell_under_cursor(&self, width: f32, height: f32) -> Option<(usize, usize)> {
        let pos = self.cursor?;
        cell_in_surface(pos.x as f32, pos.y as f32, width, height)
    }

    fn title(&self) -> String {
        let studio = lock_studio(&self.studio);
        let layer = &studio.layers()[studio.active_layer()];
        let transport = studio.transport();
        let mut title = format!(
            "{} {} \u{00b7} {:.0} BPM \u{00b7} {} \u{00b7} vol {:.0}% \u{00b7} master {:.0}% \u{00b7} {}",
            layer.index + 1,
            layer.name,
            transport.bpm(),
            layer.archetype.label(),
            layer.volume() * 100.0,
            self.bus.master_gain() * 100.0,
            if transport.is_running() { "playing" } else { "stopped" },
        );
        if !self.bus.is_initialized() {
            title.push_str(" \u{00b7} click or press a key for sound");
        }
        if self.hint_visible {
            title.push_str("  |  ");
            title.push_str(HINT);
        }
        title
    }

    fn dispose(&mut self) {
        self.frames.cancel();
        self.clock.stop();
        self.bus.dispose();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build()?;
    let window = WindowBuilder::new()
        .with_title("Step Sequencer (native)")
        .with_inner_size(winit::dpi::LogicalSize::new(720.0, 720.0))
        .build(&event_loop)?;

    let mut gpu = pollster::block_on(GpuState::new(&window))?;
    let mut app = App {
        studio: Arc::new(Mutex::new(Studio::new(StudioParams::default()))),
        bus: MasterBus::new(),
        clock: SequencerClock::new(),
        frames: FrameLoop::new(),
        stopwatch: Stopwatch::new(),
        proxy: event_loop.create_proxy(),
        gesture: PaintGesture::default(),
        cursor: None,
        hint_visible: true,
    };
    log::info!("[input] {HINT}");
    window.set_title(&app.title());

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Wait);
        match event {
            Event::UserEvent(UserEvent::Stepped { spawned }) => {
                if spawned {
                    app.frames.request();
                }
                // Playhead moved; one frame either way
                gpu.window.request_redraw();
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    app.dispose();
                    elwt.exit();
                }
                WindowEvent::Resized(size) => {
                    gpu.resize(size);
                    gpu.window.request_redraw();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    app.cursor = Some(position);
                    let (w, h) = gpu.size();
                    let cell = app.cell_under_cursor(w, h);
                    if let Some(action) = app.gesture.drag(cell) {
                        lock_studio(&app.studio).paint(action);
                        gpu.window.request_redraw();
                    }
                }
                WindowEvent::CursorLeft { .. } => {
                    app.cursor = None;
                    app.gesture.release();
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => match state {
                    ElementState::Pressed => {
                        app.bus.initialize();
                        let (w, h) = gpu.size();
                        let cell = app.cell_under_cursor(w, h);
                        if let Some(action) = app.gesture.press(cell) {
                            lock_studio(&app.studio).paint(action);
                            gpu.window.request_redraw();
                        }
                    }
                    ElementState::Released => app.gesture.release(),
                },
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key,
                            state: ElementState::Pressed,
                            repeat,
                            ..
                        },
                    ..
                } => {
                    let Some(command) = dom_key(&logical_key).and_then(command_for_key) else {
                        return;
                    };
                    if repeat && command == Command::TogglePlay {
                        return;
                    }
                    app.bus.initialize();
                    app.handle_command(command);
                    gpu.window.set_title(&app.title());
                    gpu.window.request_redraw();
                }
                WindowEvent::RedrawRequested => {
                    let now = app.stopwatch.elapsed_ms();
                    let snapshot = {
                        let mut studio = lock_studio(&app.studio);
                        if app.frames.is_running() {
                            studio.step_effects(now);
                        }
                        studio.snapshot(now)
                    };
                    match gpu.render(&snapshot) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.window.inner_size()),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("[render] out of GPU memory");
                            app.dispose();
                            elwt.exit();
                        }
                        Err(e) => log::debug!("[render] skipped frame: {e}"),
                    }
                    if app.frames.is_running()
                        && app.frames.finish_frame(snapshot.live_effects > 0)
                    {
                        gpu.window.request_redraw();
                    }
                }
                _ => {}
            },
            Event::LoopExiting => app.dispose(),
            _ => {}
        }
    })?;
    Ok(())
}
