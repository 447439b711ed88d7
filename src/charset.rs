// Copyright (c) 2026 rezky_nightky

use std::char;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use rand::Rng;

use crate::error::ConfigError;

/// Code-point ranges droplets draw their characters from. Each range is
/// half-open: `start` is included, `end` is not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharRange {
    Ascii,
    Binary,
    Braille,
    Katakana,
    Picto,
    Emoji,
}

impl CharRange {
    pub const NAMES: [&'static str; 6] =
        ["ascii", "binary", "braille", "emoji", "katakana", "picto"];

    pub fn bounds(self) -> (u32, u32) {
        match self {
            CharRange::Ascii => (0x21, 0x7E),
            CharRange::Binary => (0x30, 0x32),
            CharRange::Braille => (0x2840, 0x28FF),
            CharRange::Katakana => (0x30A0, 0x30FF),
            CharRange::Picto => (0x4E00, 0x9FA5),
            CharRange::Emoji => (0x1F601, 0x1F64A),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CharRange::Ascii => "Printable ASCII, ! through }",
            CharRange::Binary => "0 and 1 (aliases: bin, 01)",
            CharRange::Braille => "Braille patterns",
            CharRange::Katakana => "Katakana",
            CharRange::Picto => "CJK ideographs (alias: cjk)",
            CharRange::Emoji => "Smileys (double width)",
        }
    }

    fn sample<R: Rng>(self, rng: &mut R) -> char {
        let (start, end) = self.bounds();
        let v = rng.random_range(start..end);
        // None of the ranges cross the surrogate block.
        char::from_u32(v).unwrap_or(' ')
    }
}

impl FromStr for CharRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascii" => Ok(CharRange::Ascii),
            "bin" | "binary" | "01" => Ok(CharRange::Binary),
            "braille" => Ok(CharRange::Braille),
            "katakana" => Ok(CharRange::Katakana),
            "picto" | "cjk" => Ok(CharRange::Picto),
            "emoji" => Ok(CharRange::Emoji),
            _ => Err(ConfigError::UnknownCharRange(s.to_string())),
        }
    }
}

/// Where trail characters come from.
#[derive(Clone, Debug)]
pub enum CharSource {
    Range(CharRange),
    /// Characters read from a file, handed out in order and wrapping back
    /// to the start once exhausted.
    Text { chars: Vec<char>, pos: usize },
}

impl CharSource {
    pub fn from_text(text: &str) -> Option<Self> {
        let chars: Vec<char> = text.trim().chars().collect();
        if chars.is_empty() {
            return None;
        }
        Some(CharSource::Text { chars, pos: 0 })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::CharFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(&text).ok_or_else(|| ConfigError::EmptyCharFile(path.to_path_buf()))
    }

    /// Produce `len` characters for one droplet trail.
    pub fn generate<R: Rng>(&mut self, rng: &mut R, len: usize) -> Vec<char> {
        match self {
            CharSource::Range(range) => {
                let range = *range;
                (0..len).map(|_| range.sample(&mut *rng)).collect()
            }
            CharSource::Text { chars, pos } => {
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    if *pos >= chars.len() {
                        *pos = 0;
                    }
                    out.push(chars[*pos]);
                    *pos += 1;
                }
                out
            }
        }
    }
}
