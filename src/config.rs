// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::charset::{CharRange, CharSource};
use crate::error::ConfigError;
use crate::palette::{Palette, Theme, RAINBOW};

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "matrix-rain",
    about = "The famous Matrix rain effect of falling characters as a cli command",
    after_help = "Keys: q / Esc / Ctrl-C quit, r restarts the rain.",
    disable_version_flag = true
)]
pub struct Args {
    #[arg(
        short = 'c',
        long = "color",
        env = "THEME",
        default_value = "green",
        help_heading = "APPEARANCE",
        help = "Rain color or 'rainbow' (see --list-colors). The droplet head is always white"
    )]
    pub color: String,

    #[arg(
        short = 'k',
        long = "char-range",
        default_value = "ascii",
        help_heading = "CHARSET",
        help = "Use rain characters from char-range (see --list-charsets)"
    )]
    pub char_range: String,

    #[arg(
        short = 'f',
        long = "file-path",
        help_heading = "CHARSET",
        help = "Read characters from a file instead of random characters from char-range"
    )]
    pub file_path: Option<PathBuf>,

    #[arg(
        long = "min-speed",
        env = "MIN_SPEED",
        default_value_t = 2,
        help_heading = "MOTION",
        help = "Slowest frames-per-step a droplet may get (min 1)"
    )]
    pub min_speed: u16,

    #[arg(
        long = "max-speed",
        env = "MAX_SPEED",
        default_value_t = 10,
        help_heading = "MOTION",
        help = "Upper bound (exclusive) for frames-per-step (greater than --min-speed)"
    )]
    pub max_speed: u16,

    #[arg(
        long = "min-length",
        env = "MIN_LENGTH",
        default_value_t = 50,
        help_heading = "MOTION",
        help = "Shortest streak in percent of the screen height (min 1 max 100)"
    )]
    pub min_length: u8,

    #[arg(
        long = "max-length",
        env = "MAX_LENGTH",
        default_value_t = 100,
        help_heading = "MOTION",
        help = "Longest streak in percent of the screen height (min 1 max 100)"
    )]
    pub max_length: u8,

    #[arg(
        long = "fps",
        default_value_t = 60,
        help_heading = "MOTION",
        help = "Target frames per second (min 1 max 240)"
    )]
    pub fps: u16,

    #[arg(
        long = "log-file",
        env = "MATRIX_RAIN_LOG",
        help_heading = "GENERAL",
        help = "Append diagnostics to this file (filter with RUST_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available char ranges and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available colors and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

/// Validated droplet tuning. Speeds are frames per step; lengths are
/// fractions of the screen height in `(0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RainParams {
    pub min_speed: u16,
    pub max_speed: u16,
    pub min_length: f32,
    pub max_length: f32,
}

impl Default for RainParams {
    fn default() -> Self {
        Self {
            min_speed: 2,
            max_speed: 10,
            min_length: 0.5,
            max_length: 1.0,
        }
    }
}

impl RainParams {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if args.min_speed < 1 {
            return Err(ConfigError::MinSpeed(args.min_speed));
        }
        if args.max_speed <= args.min_speed {
            return Err(ConfigError::SpeedRange {
                min: args.min_speed,
                max: args.max_speed,
            });
        }
        let min_length = require_percent("--min-length", args.min_length)?;
        let max_length = require_percent("--max-length", args.max_length)?;
        if args.max_length < args.min_length {
            return Err(ConfigError::LengthRange {
                min: args.min_length,
                max: args.max_length,
            });
        }

        Ok(Self {
            min_speed: args.min_speed,
            max_speed: args.max_speed,
            min_length,
            max_length,
        })
    }

    /// Half-open streak length range for a screen `rows` tall.
    pub fn length_bounds(&self, rows: u16) -> (u16, u16) {
        let rows = f32::from(rows);
        (
            (self.min_length * rows).round() as u16,
            (self.max_length * rows).round() as u16,
        )
    }
}

fn require_percent(flag: &'static str, value: u8) -> Result<f32, ConfigError> {
    if !(1..=100).contains(&value) {
        return Err(ConfigError::LengthPercent { flag, value });
    }
    Ok(f32::from(value) / 100.0)
}

/// Everything the session needs, resolved from [`Args`].
#[derive(Clone, Debug)]
pub struct Settings {
    pub params: RainParams,
    pub theme: Theme,
    pub chars: CharSource,
    pub frame_period: Duration,
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let params = RainParams::from_args(args)?;
        let theme: Theme = args.color.parse()?;

        let chars = match &args.file_path {
            Some(path) => CharSource::from_file(path)?,
            None => CharSource::Range(args.char_range.parse::<CharRange>()?),
        };

        if !(1..=240).contains(&args.fps) {
            return Err(ConfigError::Fps(args.fps));
        }
        let frame_period = Duration::from_nanos(1_000_000_000 / u64::from(args.fps));

        Ok(Self {
            params,
            theme,
            chars,
            frame_period,
        })
    }
}

pub fn print_list_charsets() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE CHAR RANGES:\x1b[0m");
    } else {
        println!("AVAILABLE CHAR RANGES:");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    for name in CharRange::NAMES {
        if let Ok(range) = name.parse::<CharRange>() {
            println!("{:<12} {}", name, range.description());
        }
    }
}

pub fn print_list_colors() {
    let colored = color_enabled_stdout();
    let palette = Palette::new();
    if colored {
        println!("\x1b[1;36mAVAILABLE COLORS:\x1b[0m");
    } else {
        println!("AVAILABLE COLORS:");
    }
    println!();
    for name in Theme::NAMES {
        let sample = match name.parse::<Theme>() {
            Ok(Theme::Fixed(c)) if colored => palette.colorize(c, name),
            Ok(Theme::Rainbow) if colored => name
                .chars()
                .zip(RAINBOW.iter().cycle())
                .map(|(ch, &c)| palette.colorize(c, ch.encode_utf8(&mut [0; 4])))
                .collect(),
            _ => name.to_string(),
        };
        println!("{}", sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        let mut full = vec!["matrix-rain"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        let args = parse(&["--color", "green", "--min-speed", "2", "--max-speed", "10"]);
        let params = RainParams::from_args(&args).unwrap();
        assert_eq!(params.min_speed, 2);
        assert_eq!(params.max_speed, 10);
        assert!((params.min_length - 0.5).abs() < f32::EPSILON);
        assert!((params.max_length - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_min_speed_is_rejected() {
        let args = parse(&["--min-speed", "0", "--max-speed", "4"]);
        assert!(matches!(
            RainParams::from_args(&args),
            Err(ConfigError::MinSpeed(0))
        ));
    }

    #[test]
    fn max_speed_must_exceed_min_speed() {
        let args = parse(&["--min-speed", "5", "--max-speed", "5"]);
        assert!(matches!(
            RainParams::from_args(&args),
            Err(ConfigError::SpeedRange { min: 5, max: 5 })
        ));
    }

    #[test]
    fn length_percent_bounds_are_enforced() {
        let args = parse(&["--min-length", "0", "--min-speed", "2", "--max-speed", "3"]);
        assert!(matches!(
            RainParams::from_args(&args),
            Err(ConfigError::LengthPercent { flag: "--min-length", value: 0 })
        ));

        let args = parse(&["--max-length", "101", "--min-speed", "2", "--max-speed", "3"]);
        assert!(matches!(
            RainParams::from_args(&args),
            Err(ConfigError::LengthPercent { flag: "--max-length", .. })
        ));

        let args = parse(&[
            "--min-length", "80", "--max-length", "20", "--min-speed", "2", "--max-speed", "3",
        ]);
        assert!(matches!(
            RainParams::from_args(&args),
            Err(ConfigError::LengthRange { min: 80, max: 20 })
        ));
    }

    #[test]
    fn length_bounds_scale_with_rows() {
        let p = RainParams {
            min_speed: 1,
            max_speed: 2,
            min_length: 0.25,
            max_length: 0.75,
        };
        assert_eq!(p.length_bounds(40), (10, 30));
        assert_eq!(p.length_bounds(0), (0, 0));
    }

    #[test]
    fn settings_reject_unknown_color() {
        let args = parse(&["--color", "mauve", "--min-speed", "2", "--max-speed", "3"]);
        assert!(matches!(
            Settings::from_args(&args),
            Err(ConfigError::UnknownColor(_))
        ));
    }

    #[test]
    fn settings_reject_fps_out_of_range() {
        let args = parse(&["--fps", "0", "--color", "red", "--min-speed", "2", "--max-speed", "3"]);
        assert!(matches!(Settings::from_args(&args), Err(ConfigError::Fps(0))));
    }

    #[test]
    fn settings_resolve_theme_and_period() {
        let args = parse(&[
            "--color", "rainbow", "-k", "binary", "--fps", "50", "--min-speed", "2",
            "--max-speed", "3",
        ]);
        let s = Settings::from_args(&args).unwrap();
        assert_eq!(s.theme, Theme::Rainbow);
        assert!(matches!(s.chars, CharSource::Range(CharRange::Binary)));
        assert_eq!(s.frame_period, Duration::from_millis(20));
    }
}
