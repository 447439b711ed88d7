// Copyright (c) 2026 rezky_nightky

use tracing::{debug, trace};

use crate::droplet::{Droplet, Spawner};
use crate::frame::Frame;

/// Droplets sharing one column. Two independent streaks per column give
/// the rain its density.
pub const DROPLETS_PER_COLUMN: usize = 2;

pub type Column = [Droplet; DROPLETS_PER_COLUMN];

/// Every column's droplets, indexed by terminal column.
pub struct ColumnGrid {
    columns: Vec<Column>,
    cols: u16,
    rows: u16,
    spawner: Spawner,
}

impl ColumnGrid {
    pub fn new(spawner: Spawner, cols: u16, rows: u16) -> Self {
        let mut grid = Self {
            columns: Vec::new(),
            cols: 0,
            rows,
            spawner,
        };
        grid.resize(cols, rows);
        grid
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[cfg(test)]
    pub fn column_mut(&mut self, col: u16) -> Option<&mut Column> {
        self.columns.get_mut(col as usize)
    }

    fn spawn_column(&mut self, col: u16) -> Column {
        let (rows, cols) = (self.rows, self.cols);
        std::array::from_fn(|_| self.spawner.spawn(col, rows, cols))
    }

    /// Reconcile with new terminal dimensions.
    ///
    /// Growing keeps every existing droplet in flight and only seeds the
    /// new columns; shrinking drops the trailing columns.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        let old_cols = self.columns.len();
        self.cols = cols;
        self.rows = rows;

        if cols as usize > old_cols {
            self.columns.reserve(cols as usize - old_cols);
            for col in old_cols as u16..cols {
                let column = self.spawn_column(col);
                self.columns.push(column);
            }
        } else {
            self.columns.truncate(cols as usize);
        }
        debug!(old_cols, cols, rows, "grid reconciled");
    }

    /// Throw every droplet away and seed the grid again at its current size.
    pub fn reset(&mut self) {
        self.columns.clear();
        let (cols, rows) = (self.cols, self.rows);
        self.resize(cols, rows);
    }

    /// Advance every droplet one tick and record the resulting cell
    /// updates in `frame`. Expired droplets are replaced in place.
    pub fn render(&mut self, frame: &mut Frame) {
        let (rows, cols) = (self.rows, self.cols);
        for column in &mut self.columns {
            for droplet in column.iter_mut() {
                let step = droplet.advance(rows, cols);
                if !step.moved && !step.expired {
                    continue;
                }
                for w in step.cell_writes() {
                    frame.set(w.col, w.row, w.cell);
                }
                if step.expired {
                    trace!(column = droplet.column, "droplet respawned");
                    *droplet = self.spawner.respawn(droplet.column, rows, cols);
                }
            }
        }
    }
}
