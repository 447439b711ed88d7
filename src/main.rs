// Copyright (c) 2026 rezky_nightky

mod cell;
mod charset;
mod config;
mod droplet;
mod error;
mod frame;
mod grid;
mod palette;
mod session;
mod terminal;

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{print_list_charsets, print_list_colors, Args, Settings};
use crate::droplet::Spawner;
use crate::error::{RainError, Result};
use crate::grid::ColumnGrid;
use crate::palette::Palette;
use crate::session::App;
use crate::terminal::{restore_terminal_best_effort, Terminal};

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::White))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))))
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| RainError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Route SIGINT/SIGTERM/SIGHUP (or Ctrl-C on Windows) into a flag the
/// render loop checks between frames, so teardown always runs.
fn install_interrupt_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));

    #[cfg(unix)]
    {
        use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
        for sig in [SIGINT, SIGTERM, SIGHUP] {
            if let Err(e) = signal_hook::flag::register(sig, Arc::clone(&flag)) {
                error!(signal = sig, "failed to install signal handler: {}", e);
            }
        }
    }

    #[cfg(windows)]
    {
        let f = Arc::clone(&flag);
        if let Err(e) = ctrlc::set_handler(move || {
            f.store(true, std::sync::atomic::Ordering::Relaxed);
        }) {
            error!("failed to install Ctrl-C handler: {}", e);
        }
    }

    flag
}

fn rain(settings: Settings) -> Result<()> {
    if !std::io::stdout().is_terminal() {
        return Err(RainError::NotATerminal);
    }

    let interrupted = install_interrupt_flag();

    let palette = Palette::new();
    let mut term = Terminal::new(palette)?;
    let (cols, rows) = term.size()?;
    info!(cols, rows, theme = ?settings.theme, params = ?settings.params, "rain starting");

    let spawner = Spawner::new(
        StdRng::from_os_rng(),
        settings.chars,
        settings.theme,
        settings.params,
    );
    let mut app = App::new(ColumnGrid::new(spawner, cols, rows));

    let res = session::run(&mut app, &mut term, settings.frame_period, &interrupted);
    if let Err(e) = &res {
        error!("render loop failed: {}", e);
    }
    drop(term);
    res
}

fn main() -> ExitCode {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_charsets {
        print_list_charsets();
        return ExitCode::SUCCESS;
    }

    if args.list_colors {
        print_list_colors();
        return ExitCode::SUCCESS;
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let settings = match Settings::from_args(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &args.log_file {
        if let Err(e) = init_logging(path) {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    match rain(settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
