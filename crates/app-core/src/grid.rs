//! Pattern grid store: one 16×16 boolean matrix per layer.
//!
//! All indices are bounds-checked. Reads outside the grid return `false`
//! and writes outside it are ignored, so callers never need to validate
//! pointer-derived coordinates first.

use crate::constants::{GRID_SIZE, LAYER_COUNT};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternGrid {
    cells: [[bool; GRID_SIZE]; GRID_SIZE],
}

impl PatternGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    pub fn toggle(&mut self, row: usize, col: usize) {
        let current = self.get(row, col);
        self.set(row, col, !current);
    }

    /// Turn a cell on without ever turning it off. Returns whether it changed.
    pub fn activate(&mut self, row: usize, col: usize) -> bool {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) if !*cell => {
                *cell = true;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.cells = [[false; GRID_SIZE]; GRID_SIZE];
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|r| r.iter().all(|c| !c))
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| **c).count()
    }

    /// Rows that are active in `col`, top to bottom.
    pub fn active_rows_in_column(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        (0..GRID_SIZE).filter(move |&row| self.get(row, col))
    }

    pub fn rows(&self) -> &[[bool; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }
}

#[derive(Clone, Debug, Default)]
pub struct GridStore {
    grids: [PatternGrid; LAYER_COUNT],
}

impl GridStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(&self, layer: usize) -> Option<&PatternGrid> {
        self.grids.get(layer)
    }

    pub fn toggle_cell(&mut self, layer: usize, row: usize, col: usize) {
        if let Some(grid) = self.grids.get_mut(layer) {
            grid.toggle(row, col);
        }
    }

    pub fn activate_cell_if_inactive(&mut self, layer: usize, row: usize, col: usize) -> bool {
        self.grids
            .get_mut(layer)
            .map(|grid| grid.activate(row, col))
            .unwrap_or(false)
    }

    pub fn clear_layer(&mut self, layer: usize) {
        if let Some(grid) = self.grids.get_mut(layer) {
            grid.clear();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternGrid> {
        self.grids.iter()
    }
}
