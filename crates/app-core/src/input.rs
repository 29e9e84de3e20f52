use crate::constants::GRID_SIZE;

/// Map a pointer position inside a `width`×`height` grid surface to a
/// (row, col) cell. Positions outside the surface map to `None`.
#[inline]
pub fn cell_at(x: f32, y: f32, width: f32, height: f32) -> Option<(usize, usize)> {
    let valid = width > 0.0 && height > 0.0 && x.is_finite() && y.is_finite();
    if !valid || x < 0.0 || y < 0.0 || x >= width || y >= height {
        return None;
    }
    let col = ((x / width) * GRID_SIZE as f32).floor() as usize;
    let row = ((y / height) * GRID_SIZE as f32).floor() as usize;
    Some((row.min(GRID_SIZE - 1), col.min(GRID_SIZE - 1)))
}

/// Centred square a grid occupies inside a `width`×`height` surface,
/// as (left, top, side).
#[inline]
pub fn grid_rect(width: f32, height: f32) -> (f32, f32, f32) {
    let side = width.min(height).max(0.0);
    ((width - side) / 2.0, (height - side) / 2.0, side)
}

/// `cell_at` for a grid letterboxed into a larger surface.
#[inline]
pub fn cell_in_surface(x: f32, y: f32, width: f32, height: f32) -> Option<(usize, usize)> {
    let (left, top, side) = grid_rect(width, height);
    cell_at(x - left, y - top, side, side)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintAction {
    Toggle { row: usize, col: usize },
    Activate { row: usize, col: usize },
}

/// Press toggles a cell; dragging afterwards only paints cells on. The last
/// touched cell is remembered so a drag that lingers on one cell does not
/// fire repeatedly.
#[derive(Clone, Copy, Debug, Default)]
pub struct PaintGesture {
    active: bool,
    last: Option<(usize, usize)>,
}

impl PaintGesture {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn press(&mut self, cell: Option<(usize, usize)>) -> Option<PaintAction> {
        let (row, col) = cell?;
        self.active = true;
        self.last = Some((row, col));
        Some(PaintAction::Toggle { row, col })
    }

    pub fn drag(&mut self, cell: Option<(usize, usize)>) -> Option<PaintAction> {
        if !self.active {
            return None;
        }
        let (row, col) = cell?;
        if self.last == Some((row, col)) {
            return None;
        }
        self.last = Some((row, col));
        Some(PaintAction::Activate { row, col })
    }

    pub fn release(&mut self) {
        self.active = false;
        self.last = None;
    }
}

/// Keyboard-driven actions shared by both frontends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    TogglePlay,
    SelectLayer(usize),
    TempoUp,
    TempoDown,
    MasterGainUp,
    MasterGainDown,
    CycleArchetype,
    VolumeUp,
    VolumeDown,
    ClearLayer,
    ToggleHint,
}

/// Resolve a DOM-style key name (`KeyboardEvent.key`) to a command.
#[inline]
pub fn command_for_key(key: &str) -> Option<Command> {
    match key {
        " " => Some(Command::TogglePlay),
        "1" => Some(Command::SelectLayer(0)),
        "2" => Some(Command::SelectLayer(1)),
        "3" => Some(Command::SelectLayer(2)),
        "4" => Some(Command::SelectLayer(3)),
        "ArrowRight" | "+" | "=" => Some(Command::TempoUp),
        "ArrowLeft" | "-" | "_" => Some(Command::TempoDown),
        "ArrowUp" => Some(Command::MasterGainUp),
        "ArrowDown" => Some(Command::MasterGainDown),
        "e" | "E" => Some(Command::CycleArchetype),
        "]" => Some(Command::VolumeUp),
        "[" => Some(Command::VolumeDown),
        "c" | "C" => Some(Command::ClearLayer),
        "h" | "H" => Some(Command::ToggleHint),
        _ => None,
    }
}
