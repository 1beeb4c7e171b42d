#![forbid(unsafe_code)]

//! Command-line argument parsing for the navkit demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `NAVKIT_DEMO_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
navkit demo: keyboard and screen-reader access to a simulated colony

USAGE:
    navkit-demo [OPTIONS]

OPTIONS:
    --script=KEYS        Run a comma-separated key script and exit
                         (e.g. \"F3,Down,Enter,Enter\")
    --no-clipboard       Do not copy announcements to the clipboard
    --log-file=PATH      Write logs to PATH instead of stderr
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    F2                   Stockpile filter (tree, sliders, Done)
    F3                   Trade menu
    Up/Down, Home/End    Move
    Left/Right           Collapse/expand, adjust sliders
    Space, Enter         Toggle, activate
    Escape               Close
    F12                  Repeat the last announcement (while a menu is open)
    q / Ctrl+C           Quit (when no menu is open)

ENVIRONMENT VARIABLES:
    NAVKIT_DEMO_SCRIPT        Override --script
    NAVKIT_DEMO_NO_CLIPBOARD  Set to 1 to disable the clipboard
    NAVKIT_DEMO_LOG_FILE      Override --log-file
    NAVKIT_LOG                Log filter (e.g. \"navkit_runtime=debug\")
    NAVKIT_*                  Navigation settings (see navkit-runtime)";

/// Parsed command-line options.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Opts {
    /// Key script for a non-interactive run.
    pub script: Option<String>,
    /// Whether to copy announcements to the clipboard.
    pub no_clipboard: bool,
    /// Log destination; stderr when unset.
    pub log_file: Option<PathBuf>,
}

/// Outcome of parsing that ends the process early.
#[derive(Debug, PartialEq, Eq)]
pub enum Exit {
    /// Print this to stdout and exit successfully.
    Print(String),
    /// Print this to stderr and exit with status 1.
    Fail(String),
}

impl Opts {
    /// Parse command-line arguments and environment variables, exiting on
    /// `--help`, `--version` or bad input.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        let vars = env::vars().filter(|(key, _)| key.starts_with("NAVKIT_DEMO_"));
        match Self::parse_from(vars, env::args().skip(1)) {
            Ok(opts) => opts,
            Err(Exit::Print(text)) => {
                println!("{text}");
                process::exit(0);
            }
            Err(Exit::Fail(text)) => {
                eprintln!("{text}");
                process::exit(1);
            }
        }
    }

    /// Parse from explicit environment pairs and arguments.
    pub fn parse_from(
        vars: impl IntoIterator<Item = (String, String)>,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self, Exit> {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        for (key, val) in vars {
            match key.as_str() {
                "NAVKIT_DEMO_SCRIPT" => opts.script = Some(val),
                "NAVKIT_DEMO_NO_CLIPBOARD" => opts.no_clipboard = val == "1",
                "NAVKIT_DEMO_LOG_FILE" if !val.is_empty() => {
                    opts.log_file = Some(PathBuf::from(val));
                }
                _ => {}
            }
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Err(Exit::Print(HELP_TEXT.to_string())),
                "--version" | "-V" => {
                    return Err(Exit::Print(format!("navkit-demo {VERSION}")));
                }
                "--no-clipboard" => opts.no_clipboard = true,
                other => {
                    if let Some(val) = other.strip_prefix("--script=") {
                        opts.script = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        if val.is_empty() {
                            return Err(Exit::Fail("Empty --log-file value".to_string()));
                        }
                        opts.log_file = Some(PathBuf::from(val));
                    } else {
                        return Err(Exit::Fail(format!(
                            "Unknown argument: {other}\nRun with --help for usage information."
                        )));
                    }
                }
            }
        }

        Ok(opts)
    }
}
