// Copyright (c) 2026 rezky_nightky

use std::fmt;
use std::str::FromStr;

use crossterm::{
    style::{Attribute, Color, SetAttribute, SetForegroundColor},
    Command,
};

use crate::error::ConfigError;

/// Logical colors a droplet can be drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RainColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl RainColor {
    pub const ALL: [RainColor; 8] = [
        RainColor::Black,
        RainColor::Red,
        RainColor::Green,
        RainColor::Yellow,
        RainColor::Blue,
        RainColor::Magenta,
        RainColor::Cyan,
        RainColor::White,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RainColor::Black => "black",
            RainColor::Red => "red",
            RainColor::Green => "green",
            RainColor::Yellow => "yellow",
            RainColor::Blue => "blue",
            RainColor::Magenta => "magenta",
            RainColor::Cyan => "cyan",
            RainColor::White => "white",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn terminal_color(self) -> Color {
        match self {
            RainColor::Black => Color::Black,
            RainColor::Red => Color::DarkRed,
            RainColor::Green => Color::DarkGreen,
            RainColor::Yellow => Color::DarkYellow,
            RainColor::Blue => Color::DarkBlue,
            RainColor::Magenta => Color::DarkMagenta,
            RainColor::Cyan => Color::DarkCyan,
            RainColor::White => Color::White,
        }
    }
}

impl fmt::Display for RainColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column banding order for the rainbow theme.
pub const RAINBOW: [RainColor; 6] = [
    RainColor::Red,
    RainColor::Yellow,
    RainColor::Green,
    RainColor::Cyan,
    RainColor::Blue,
    RainColor::Magenta,
];

/// How droplets pick their streak color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Fixed(RainColor),
    Rainbow,
}

impl Theme {
    /// Names accepted by `--color` / `THEME`, in listing order.
    pub const NAMES: [&'static str; 8] = [
        "green", "red", "yellow", "blue", "magenta", "cyan", "white", "rainbow",
    ];

    /// Color for a droplet spawned in `column` while the grid is `cols` wide.
    ///
    /// Rainbow splits the width into six equal bands, rounding the band
    /// width up so every column lands in one.
    pub fn color_for_column(self, column: u16, cols: u16) -> RainColor {
        match self {
            Theme::Fixed(c) => c,
            Theme::Rainbow => {
                let per_band = (cols as usize).div_ceil(RAINBOW.len()).max(1);
                RAINBOW[(column as usize / per_band) % RAINBOW.len()]
            }
        }
    }
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rainbow" => Ok(Theme::Rainbow),
            "green" => Ok(Theme::Fixed(RainColor::Green)),
            "red" => Ok(Theme::Fixed(RainColor::Red)),
            "yellow" => Ok(Theme::Fixed(RainColor::Yellow)),
            "blue" => Ok(Theme::Fixed(RainColor::Blue)),
            "magenta" => Ok(Theme::Fixed(RainColor::Magenta)),
            "cyan" => Ok(Theme::Fixed(RainColor::Cyan)),
            "white" => Ok(Theme::Fixed(RainColor::White)),
            _ => Err(ConfigError::UnknownColor(s.to_string())),
        }
    }
}

fn push_command(buf: &mut String, cmd: impl Command) {
    // fmt::Write for String never fails.
    let _ = cmd.write_ansi(buf);
}

/// Escape-sequence table for every [`RainColor`], built once at startup.
#[derive(Clone, Debug)]
pub struct Palette {
    escapes: [String; 8],
    reset: String,
}

impl Palette {
    pub fn new() -> Self {
        let escapes = RainColor::ALL.map(|c| {
            let mut s = String::with_capacity(16);
            push_command(&mut s, SetAttribute(Attribute::Bold));
            push_command(&mut s, SetForegroundColor(c.terminal_color()));
            s
        });

        let mut reset = String::with_capacity(16);
        push_command(&mut reset, SetForegroundColor(Color::Reset));
        push_command(&mut reset, SetAttribute(Attribute::NormalIntensity));

        Self { escapes, reset }
    }

    /// Sequence that switches subsequent output to `color`.
    pub fn escape(&self, color: RainColor) -> &str {
        &self.escapes[color.index()]
    }

    /// Sequence that returns the foreground to the terminal default.
    pub fn reset(&self) -> &str {
        &self.reset
    }

    pub fn colorize(&self, color: RainColor, text: &str) -> String {
        let esc = self.escape(color);
        let mut out = String::with_capacity(esc.len() + text.len() + self.reset.len());
        out.push_str(esc);
        out.push_str(text);
        out.push_str(&self.reset);
        out
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_color_has_a_distinct_escape() {
        let p = Palette::new();
        for (i, a) in RainColor::ALL.iter().enumerate() {
            assert!(p.escape(*a).starts_with("\x1b["));
            for b in &RainColor::ALL[i + 1..] {
                assert_ne!(p.escape(*a), p.escape(*b));
            }
        }
    }

    #[test]
    fn colorize_wraps_text_in_escape_and_reset() {
        let p = Palette::new();
        let s = p.colorize(RainColor::Green, "Hello");
        assert_eq!(s, format!("{}Hello{}", p.escape(RainColor::Green), p.reset()));
    }

    #[test]
    fn theme_parses_names_case_insensitively() {
        assert_eq!(
            "Green".parse::<Theme>().unwrap(),
            Theme::Fixed(RainColor::Green)
        );
        assert_eq!(" rainbow ".parse::<Theme>().unwrap(), Theme::Rainbow);
        for name in Theme::NAMES {
            assert!(name.parse::<Theme>().is_ok(), "{name}");
        }
    }

    #[test]
    fn theme_rejects_unknown_names() {
        let err = "chartreuse".parse::<Theme>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownColor(ref n) if n == "chartreuse"));
    }

    #[test]
    fn rainbow_bands_columns_evenly() {
        let t = Theme::Rainbow;
        // 12 columns -> two columns per band
        let got: Vec<RainColor> = (0..12).map(|c| t.color_for_column(c, 12)).collect();
        assert_eq!(got[0], RainColor::Red);
        assert_eq!(got[1], RainColor::Red);
        assert_eq!(got[2], RainColor::Yellow);
        assert_eq!(got[11], RainColor::Magenta);
    }

    #[test]
    fn rainbow_handles_narrow_and_empty_grids() {
        let t = Theme::Rainbow;
        assert_eq!(t.color_for_column(0, 0), RainColor::Red);
        assert_eq!(t.color_for_column(3, 4), RainColor::Cyan);
    }

    #[test]
    fn fixed_theme_ignores_column() {
        let t = Theme::Fixed(RainColor::Cyan);
        assert_eq!(t.color_for_column(0, 80), RainColor::Cyan);
        assert_eq!(t.color_for_column(79, 80), RainColor::Cyan);
    }
}
