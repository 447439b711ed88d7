// Copyright (c) 2026 rezky_nightky

use crate::cell::Cell;

/// Screen-sized cell buffer that remembers which cells changed since the
/// last time it was written out.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; len],
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    /// Blank every cell and schedule a full repaint.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
        self.mark_all_dirty();
    }

    /// Change dimensions, keeping whatever cells overlap the old and new
    /// sizes. The next write repaints everything.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }

        let len = width as usize * height as usize;
        let mut cells = vec![Cell::BLANK; len];
        let keep_w = width.min(self.width) as usize;
        let keep_h = height.min(self.height) as usize;
        for y in 0..keep_h {
            let src = y * self.width as usize;
            let dst = y * width as usize;
            cells[dst..dst + keep_w].copy_from_slice(&self.cells[src..src + keep_w]);
        }

        self.width = width;
        self.height = height;
        self.cells = cells;
        self.dirty_map = vec![false; len];
        self.mark_all_dirty();
    }

    fn mark_all_dirty(&mut self) {
        self.dirty_all = true;
        self.dirty_map.fill(false);
        self.dirty.clear();
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn sort_dirty(&mut self) {
        if self.dirty_all || self.dirty.len() <= 1 {
            return;
        }
        self.dirty.sort_unstable();
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(Cell::BLANK)
    }

    /// Store `cell` at `(x, y)`. Out-of-range positions are ignored, and
    /// writing the value a cell already holds does not mark it dirty.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }

        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }
}
