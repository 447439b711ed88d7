// Copyright (c) 2026 rezky_nightky

use crate::palette::RainColor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub color: RainColor,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        color: RainColor::Black,
    };

    pub fn new(ch: char, color: RainColor) -> Self {
        Self { ch, color }
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::BLANK
    }
}
