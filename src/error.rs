// Copyright (c) 2026 rezky_nightky

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Rejected configuration. Raised before the animation starts; the
/// rendering core only ever sees validated values.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to apply --min-speed {0} (must be at least 1)")]
    MinSpeed(u16),

    #[error("failed to apply --max-speed {max} (must be greater than --min-speed {min})")]
    SpeedRange { min: u16, max: u16 },

    #[error("failed to apply {flag} {value} (min 1 max 100)")]
    LengthPercent { flag: &'static str, value: u8 },

    #[error("failed to apply --max-length {max} (must be at least --min-length {min})")]
    LengthRange { min: u8, max: u8 },

    #[error("failed to apply --fps {0} (min 1 max 240)")]
    Fps(u16),

    #[error("invalid color: {0} (see --list-colors)")]
    UnknownColor(String),

    #[error("unsupported char range: {0} (see --list-charsets)")]
    UnknownCharRange(String),

    #[error("failed to read characters from {}: {source}", .path.display())]
    CharFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no characters to rain in {}", .0.display())]
    EmptyCharFile(PathBuf),
}

#[derive(Error, Debug)]
pub enum RainError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Output is not a text terminal")]
    NotATerminal,

    #[error("failed to open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RainError>;
