#![forbid(unsafe_code)]

//! navkit demo binary entry point.

use std::fs::File;
use std::io;
use std::sync::Mutex;

use crossterm::event::{self, Event};
use crossterm::terminal;
use navkit::prelude::*;
use navkit_demo::app::{self, Outputs};
use navkit_demo::cli::Opts;
use navkit_demo::host::Colony;
use tracing_subscriber::EnvFilter;

fn main() {
    let opts = Opts::parse();

    if let Err(err) = init_logging(&opts) {
        eprintln!("Cannot open log file: {err}");
        std::process::exit(1);
    }

    let config = NavConfig::from_env();
    let mut colony = Colony::new().with_slider_step(config.slider_step);

    let result = match opts.script.as_deref() {
        Some(script) => run_script(script, config, &mut colony),
        None => run_interactive(config, &opts, &mut colony),
    };
    if let Err(err) = result {
        eprintln!("Runtime error: {err}");
        std::process::exit(1);
    }
    for line in colony.log() {
        tracing::info!(target: "navkit_demo::host", "{line}");
    }
}

fn init_logging(opts: &Opts) -> io::Result<()> {
    let filter = EnvFilter::try_from_env("NAVKIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    match &opts.log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn run_script(script: &str, config: NavConfig, colony: &mut Colony) -> Result<()> {
    let keys = app::parse_script(script).map_err(|err| Error::Io(io::Error::other(err)))?;
    let outputs = Outputs {
        print: true,
        clipboard: false,
        raw_newlines: false,
    };
    let mut cx = app::build_context(config, outputs)?;
    let passed = app::run_script(&mut cx, colony, keys);
    tracing::info!(passed, silver = colony.silver(), "script finished");
    Ok(())
}

fn run_interactive(config: NavConfig, opts: &Opts, colony: &mut Colony) -> Result<()> {
    let outputs = Outputs {
        print: true,
        clipboard: !opts.no_clipboard,
        raw_newlines: true,
    };
    let mut cx = app::build_context(config, outputs)?;
    println!("F2 stockpile filter, F3 trade, q to quit");

    let _raw = RawMode::enable()?;
    loop {
        let Event::Key(raw) = event::read()? else {
            continue;
        };
        let Some(key) = KeyEvent::from_crossterm(raw) else {
            continue;
        };
        for dispatch in cx.frame([key], colony) {
            if !dispatch.reaches_host() || !key.is_down() {
                continue;
            }
            if key.is_char('q') || (key.ctrl() && key.is_char('c')) {
                return Ok(());
            }
            tracing::debug!(key = ?key.code, "host handles key");
        }
    }
}

/// Raw mode for the lifetime of the guard.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            tracing::warn!(error = %err, "failed to leave raw mode");
        }
    }
}
