// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, Rng};

use crate::cell::Cell;
use crate::charset::CharSource;
use crate::config::RainParams;
use crate::palette::{RainColor, Theme};

/// One cell update produced by [`Droplet::advance`]. Always inside the
/// bounds it was produced for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellWrite {
    pub row: u16,
    pub col: u16,
    pub cell: Cell,
}

/// Outcome of a single tick for one droplet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Step {
    /// Trail, head and erase updates, in that order. `None` where the
    /// target fell outside the screen or had no character.
    pub writes: [Option<CellWrite>; 3],
    pub moved: bool,
    /// The whole streak has scrolled past the bottom edge.
    pub expired: bool,
}

impl Step {
    pub fn cell_writes(&self) -> impl Iterator<Item = &CellWrite> {
        self.writes.iter().flatten()
    }
}

/// A single falling streak bound to one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Droplet {
    pub column: u16,
    pub color: RainColor,
    pub alive_ticks: u32,
    /// Row of the bright head. Keeps growing past the bottom edge while
    /// the tail catches up.
    pub head_row: u32,
    pub length: u16,
    /// Ticks per visible step; at least 1.
    pub speed: u16,
    /// One character per screen row, fixed for the droplet's lifetime.
    pub trail: Vec<char>,
}

fn clip(row: i64, rows: u16, col: u16, cols: u16) -> Option<u16> {
    if row < 0 || row >= i64::from(rows) || col >= cols {
        return None;
    }
    u16::try_from(row).ok()
}

impl Droplet {
    fn trail_write(&self, row: i64, color: RainColor, rows: u16, cols: u16) -> Option<CellWrite> {
        let r = clip(row, rows, self.column, cols)?;
        let ch = *self.trail.get(r as usize)?;
        Some(CellWrite {
            row: r,
            col: self.column,
            cell: Cell::new(ch, color),
        })
    }

    fn erase_write(&self, row: i64, rows: u16, cols: u16) -> Option<CellWrite> {
        let r = clip(row, rows, self.column, cols)?;
        Some(CellWrite {
            row: r,
            col: self.column,
            cell: Cell::BLANK,
        })
    }

    /// Tick once on a `cols` x `rows` screen.
    ///
    /// Only every `speed`-th tick moves the droplet: the old head is
    /// recolored to the streak color, the new head is drawn white, and the
    /// cell `length` rows above is blanked.
    pub fn advance(&mut self, rows: u16, cols: u16) -> Step {
        self.alive_ticks = self.alive_ticks.wrapping_add(1);

        let mut step = Step::default();
        if self.alive_ticks % u32::from(self.speed.max(1)) == 0 {
            let head = i64::from(self.head_row);
            step.writes = [
                self.trail_write(head - 1, self.color, rows, cols),
                self.trail_write(head, RainColor::White, rows, cols),
                self.erase_write(head - i64::from(self.length), rows, cols),
            ];
            self.head_row = self.head_row.saturating_add(1);
            step.moved = true;
        }

        step.expired = self.is_past_bottom(rows);
        step
    }

    pub fn is_past_bottom(&self, rows: u16) -> bool {
        i64::from(self.head_row) - i64::from(self.length) > i64::from(rows)
    }
}

fn rand_between(rng: &mut StdRng, start: u32, end: u32) -> u32 {
    if end <= start {
        return start;
    }
    rng.random_range(start..end)
}

/// Creates droplets: owns the randomness, the character source and the
/// color theme so the grid only has to say where.
pub struct Spawner {
    rng: StdRng,
    chars: CharSource,
    theme: Theme,
    params: RainParams,
}

impl Spawner {
    pub fn new(rng: StdRng, chars: CharSource, theme: Theme, params: RainParams) -> Self {
        Self {
            rng,
            chars,
            theme,
            params,
        }
    }

    #[cfg(test)]
    pub fn params(&self) -> &RainParams {
        &self.params
    }

    /// A droplet for `column` with its head somewhere on screen.
    pub fn spawn(&mut self, column: u16, rows: u16, cols: u16) -> Droplet {
        let head_row = rand_between(&mut self.rng, 0, u32::from(rows));
        let (min_len, max_len) = self.params.length_bounds(rows);
        let length = rand_between(&mut self.rng, u32::from(min_len), u32::from(max_len));
        let speed = rand_between(
            &mut self.rng,
            u32::from(self.params.min_speed),
            u32::from(self.params.max_speed),
        );

        Droplet {
            column,
            color: self.theme.color_for_column(column, cols),
            alive_ticks: 0,
            head_row,
            length: u16::try_from(length).unwrap_or(u16::MAX),
            speed: u16::try_from(speed).unwrap_or(u16::MAX).max(1),
            trail: self.chars.generate(&mut self.rng, rows as usize),
        }
    }

    /// Like [`Spawner::spawn`] but starting from the top row.
    pub fn respawn(&mut self, column: u16, rows: u16, cols: u16) -> Droplet {
        let mut d = self.spawn(column, rows, cols);
        d.head_row = 0;
        d
    }
}
