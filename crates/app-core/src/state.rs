//! The studio: single-writer store shared by the sequencer clock, the
//! render-frame driver and input handling.
//!
//! Frontends wrap it in `Rc<RefCell<_>>` (web) or `Arc<Mutex<_>>` (native).
//! Every operation is short and non-blocking; triggers produced by a tick
//! are returned to the caller so audio is fired outside the borrow/lock.

use crate::brightness;
use crate::constants::*;
use crate::effects::EffectStore;
use crate::grid::{GridStore, PatternGrid};
use crate::input::{Command, PaintAction};
use crate::layer::{default_layers, EffectArchetype, LayerConfig, SynthKind};
use crate::synth::Trigger;
use crate::transport::Transport;

#[derive(Clone, Debug)]
pub struct StudioParams {
    pub bpm: f32,
    pub seed: u64,
}

impl Default for StudioParams {
    fn default() -> Self {
        Self {
            bpm: BPM_DEFAULT,
            seed: 42,
        }
    }
}

/// What the frontend has to do with its sequencer timer after a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockAction {
    None,
    Start,
    Stop,
    Restart,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellView {
    pub active: bool,
    pub brightness: f32,
}

/// Read-only view of the displayed layer for one rendered frame.
#[derive(Clone, Debug)]
pub struct GridSnapshot {
    pub layer: usize,
    pub layer_name: &'static str,
    pub color_rgb: [f32; 3],
    pub volume: f32,
    pub archetype: EffectArchetype,
    pub step_column: i32,
    pub bpm: f32,
    pub running: bool,
    pub live_effects: usize,
    pub cells: [[CellView; GRID_SIZE]; GRID_SIZE],
}

impl GridSnapshot {
    /// Display colour of a cell. Idle cells are grey, lifted on the playing
    /// column; active cells take the layer colour. Brightness blends either
    /// toward the layer colour.
    pub fn cell_rgb(&self, row: usize, col: usize) -> [f32; 3] {
        let Some(cell) = self.cells.get(row).and_then(|r| r.get(col)) else {
            return CELL_IDLE_RGB;
        };
        let lift = if col as i32 == self.step_column {
            PLAYHEAD_LIFT
        } else {
            0.0
        };
        let base = if cell.active {
            self.color_rgb
        } else {
            CELL_IDLE_RGB.map(|c| c + lift)
        };
        let t = cell.brightness.clamp(0.0, 1.0);
        let mut rgb = base;
        for (c, target) in rgb.iter_mut().zip(self.color_rgb) {
            *c += (target - *c) * t;
        }
        rgb
    }
}

pub struct Studio {
    layers: [LayerConfig; LAYER_COUNT],
    grids: GridStore,
    transport: Transport,
    effects: EffectStore,
    active_layer: usize,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(StudioParams::default())
    }
}

impl Studio {
    pub fn new(params: StudioParams) -> Self {
        Self {
            layers: default_layers(),
            grids: GridStore::new(),
            transport: Transport::new(params.bpm),
            effects: EffectStore::new(params.seed),
            active_layer: 0,
        }
    }

    // ---------------- read side ----------------

    pub fn layers(&self) -> &[LayerConfig; LAYER_COUNT] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&LayerConfig> {
        self.layers.get(index)
    }

    pub fn grid(&self, layer: usize) -> Option<&PatternGrid> {
        self.grids.grid(layer)
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn effects(&self) -> &EffectStore {
        &self.effects
    }

    pub fn active_layer(&self) -> usize {
        self.active_layer
    }

    pub fn current_step_column(&self) -> i32 {
        self.transport.current_step_column()
    }

    pub fn has_live_effects(&self) -> bool {
        !self.effects.is_empty()
    }

    /// Brightness of (row, col) on the displayed layer.
    pub fn brightness(&self, row: usize, col: usize, now_ms: f64) -> f32 {
        brightness::brightness(self.effects.iter(), self.active_layer, row, col, now_ms)
    }

    pub fn snapshot(&self, now_ms: f64) -> GridSnapshot {
        let layer = &self.layers[self.active_layer];
        let mut cells = [[CellView::default(); GRID_SIZE]; GRID_SIZE];
        if let Some(grid) = self.grids.grid(self.active_layer) {
            for (row, line) in cells.iter_mut().enumerate() {
                for (col, cell) in line.iter_mut().enumerate() {
                    *cell = CellView {
                        active: grid.get(row, col),
                        brightness: self.brightness(row, col, now_ms),
                    };
                }
            }
        }
        GridSnapshot {
            layer: self.active_layer,
            layer_name: layer.name,
            color_rgb: layer.color_rgb,
            volume: layer.volume(),
            archetype: layer.archetype,
            step_column: self.transport.current_step_column(),
            bpm: self.transport.bpm(),
            running: self.transport.is_running(),
            live_effects: self.effects.len(),
            cells,
        }
    }

    // ---------------- input ----------------

    pub fn toggle_cell(&mut self, layer: usize, row: usize, col: usize) {
        self.grids.toggle_cell(layer, row, col);
    }

    pub fn activate_cell_if_inactive(&mut self, layer: usize, row: usize, col: usize) -> bool {
        self.grids.activate_cell_if_inactive(layer, row, col)
    }

    /// Apply a paint gesture to the displayed layer.
    pub fn paint(&mut self, action: PaintAction) {
        let layer = self.active_layer;
        match action {
            PaintAction::Toggle { row, col } => self.toggle_cell(layer, row, col),
            PaintAction::Activate { row, col } => {
                self.activate_cell_if_inactive(layer, row, col);
            }
        }
    }

    pub fn clear_layer(&mut self, layer: usize) {
        self.grids.clear_layer(layer);
    }

    pub fn clear_active_layer(&mut self) {
        self.grids.clear_layer(self.active_layer);
    }

    pub fn select_layer(&mut self, layer: usize) {
        if layer < LAYER_COUNT {
            self.active_layer = layer;
        }
    }

    // ---------------- configuration ----------------

    pub fn set_volume(&mut self, layer: usize, volume: f32) {
        if let Some(l) = self.layers.get_mut(layer) {
            l.set_volume(volume);
        }
    }

    pub fn set_effect_archetype(&mut self, layer: usize, archetype: EffectArchetype) {
        if let Some(l) = self.layers.get_mut(layer) {
            l.archetype = archetype;
        }
    }

    pub fn cycle_archetype(&mut self) -> EffectArchetype {
        let layer = &mut self.layers[self.active_layer];
        layer.archetype = layer.archetype.next();
        layer.archetype
    }

    pub fn set_tempo(&mut self, bpm: f32) -> ClockAction {
        if self.transport.set_tempo(bpm) {
            ClockAction::Restart
        } else {
            ClockAction::None
        }
    }

    pub fn play(&mut self) -> ClockAction {
        if self.transport.is_running() {
            return ClockAction::None;
        }
        self.transport.play();
        ClockAction::Start
    }

    pub fn pause(&mut self) -> ClockAction {
        let was_running = self.transport.is_running();
        self.transport.pause();
        if was_running {
            ClockAction::Stop
        } else {
            ClockAction::None
        }
    }

    pub fn toggle_play(&mut self) -> ClockAction {
        if self.transport.is_running() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Apply a studio-level command. Master gain and hint toggling belong
    /// to the frontend and are ignored here.
    pub fn apply(&mut self, command: Command) -> ClockAction {
        match command {
            Command::TogglePlay => self.toggle_play(),
            Command::SelectLayer(i) => {
                self.select_layer(i);
                ClockAction::None
            }
            Command::TempoUp => self.set_tempo(self.transport.bpm() + TEMPO_NUDGE_BPM),
            Command::TempoDown => self.set_tempo(self.transport.bpm() - TEMPO_NUDGE_BPM),
            Command::CycleArchetype => {
                self.cycle_archetype();
                ClockAction::None
            }
            Command::VolumeUp | Command::VolumeDown => {
                let layer = self.active_layer;
                let delta = if command == Command::VolumeUp {
                    LAYER_VOLUME_STEP
                } else {
                    -LAYER_VOLUME_STEP
                };
                let volume = self.layers[layer].volume() + delta;
                self.set_volume(layer, volume);
                ClockAction::None
            }
            Command::ClearLayer => {
                self.clear_active_layer();
                ClockAction::None
            }
            Command::MasterGainUp | Command::MasterGainDown | Command::ToggleHint => {
                ClockAction::None
            }
        }
    }

    // ---------------- drivers ----------------

    /// One sequencer step. Advances the column and, for every layer, queues
    /// a trigger and spawns an effect for each active row in that column.
    /// Returns the new column, or `None` while stopped.
    pub fn tick(&mut self, now_ms: f64, out: &mut Vec<Trigger>) -> Option<usize> {
        let col = self.transport.advance()?;
        for layer in &self.layers {
            let Some(grid) = self.grids.grid(layer.index) else {
                continue;
            };
            for row in grid.active_rows_in_column(col) {
                out.push(match layer.kind {
                    SynthKind::Tone(waveform) => Trigger::Tone {
                        layer: layer.index,
                        row,
                        waveform,
                        octave_offset: layer.octave_offset,
                        volume: layer.volume(),
                    },
                    SynthKind::Percussion => Trigger::Percussion {
                        layer: layer.index,
                        row,
                        volume: layer.volume(),
                    },
                });
                let spawned = self.effects.spawn(
                    layer.archetype,
                    layer.index,
                    row,
                    col,
                    layer.color_rgb,
                    now_ms,
                );
                if !spawned {
                    log::debug!(
                        "[effects] capacity reached, dropped {} at ({row},{col})",
                        layer.archetype.label()
                    );
                }
            }
        }
        Some(col)
    }

    /// One render frame of the effect simulation.
    pub fn step_effects(&mut self, now_ms: f64) {
        self.effects.step(now_ms);
    }
}
