#![forbid(unsafe_code)]

//! Write-only clipboard for the copy-to-clipboard output channel.
//!
//! Announcements are copied as plain text so a user can paste what was last
//! spoken. Two mechanisms are tried:
//!
//! 1. **OSC 52**: a terminal escape carrying the base64 text, wrapped in DCS
//!    passthrough inside tmux or GNU screen.
//! 2. **External tools**: `pbcopy`, `clip`, `wl-copy`, `xclip`/`xsel`
//!    (only with the `clipboard-fallback` feature).
//!
//! `NAVKIT_CLIPBOARD_BACKEND` overrides detection: `osc52`, `macos`,
//! `windows`, `wayland`, `x11` or `none`.

use std::env;
use std::fmt;
use std::io::Write;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};

const ENV_CLIPBOARD_BACKEND: &str = "NAVKIT_CLIPBOARD_BACKEND";

/// Clipboard errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No backend could be found.
    NotAvailable,
    /// The text cannot be sent (too large for OSC 52).
    TooLarge {
        /// Encoded size.
        encoded: usize,
        /// Limit.
        limit: usize,
    },
    /// Writing the escape sequence or running the tool failed.
    WriteError(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAvailable => write!(f, "clipboard not available"),
            Self::TooLarge { encoded, limit } => {
                write!(f, "OSC 52 payload too large ({encoded} > {limit})")
            }
            Self::WriteError(msg) => write!(f, "clipboard write failed: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Selected mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardBackend {
    /// Terminal escape sequence.
    Osc52,
    /// A platform tool.
    External(ExternalTool),
    /// Nothing usable.
    Unavailable,
}

/// Platform clipboard tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalTool {
    /// `pbcopy`.
    MacOS,
    /// `clip`.
    Windows,
    /// `wl-copy`.
    Wayland,
    /// `xclip` or `xsel`.
    X11,
}

/// Multiplexer wrapping for OSC 52.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Passthrough {
    /// Write the sequence as is.
    #[default]
    None,
    /// `ESC P tmux; <ESC-doubled seq> ESC \`.
    Tmux,
    /// `ESC P <seq> ESC \`.
    Screen,
}

/// What the environment offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalEnv {
    /// The terminal understands OSC 52.
    pub osc52: bool,
    /// Running inside tmux.
    pub in_tmux: bool,
    /// Running inside GNU screen.
    pub in_screen: bool,
}

impl TerminalEnv {
    /// Inspect `TERM`, `TERM_PROGRAM`, `TMUX` and `STY`.
    #[must_use]
    pub fn detect() -> Self {
        let term = env::var("TERM").unwrap_or_default();
        let program = env::var("TERM_PROGRAM").unwrap_or_default();
        Self::from_parts(
            &term,
            &program,
            env::var_os("TMUX").is_some(),
            env::var_os("STY").is_some(),
        )
    }

    fn from_parts(term: &str, program: &str, in_tmux: bool, in_screen: bool) -> Self {
        const OSC52_TERMS: [&str; 6] = ["xterm-kitty", "alacritty", "foot", "wezterm", "xterm-ghostty", "contour"];
        const OSC52_PROGRAMS: [&str; 4] = ["iTerm.app", "WezTerm", "vscode", "ghostty"];
        let osc52 = !in_tmux
            && !in_screen
            && (OSC52_TERMS.iter().any(|t| term.starts_with(t))
                || OSC52_PROGRAMS.iter().any(|p| program.eq_ignore_ascii_case(p)));
        Self {
            osc52,
            in_tmux,
            in_screen,
        }
    }
}

/// Write-only clipboard.
#[derive(Debug, Clone)]
pub struct Clipboard {
    backend: ClipboardBackend,
    fallback: Option<ExternalTool>,
    passthrough: Passthrough,
    max_payload: usize,
}

impl Clipboard {
    /// Common OSC 52 size limit (base64 bytes).
    pub const DEFAULT_MAX_OSC52_PAYLOAD: usize = 74_994;

    /// Detect the best backend for the current process.
    #[must_use]
    pub fn detect() -> Self {
        Self::for_env(TerminalEnv::detect())
    }

    /// Pick a backend for `term`.
    ///
    /// Direct OSC 52 first, then OSC 52 through a multiplexer, then external
    /// tools. The environment override is applied last.
    #[must_use]
    pub fn for_env(term: TerminalEnv) -> Self {
        let external = detect_external_tool();
        let (backend, fallback, passthrough) = if term.osc52 {
            (ClipboardBackend::Osc52, external, Passthrough::None)
        } else if term.in_tmux {
            (ClipboardBackend::Osc52, external, Passthrough::Tmux)
        } else if term.in_screen {
            (ClipboardBackend::Osc52, external, Passthrough::Screen)
        } else if let Some(tool) = external {
            (ClipboardBackend::External(tool), None, Passthrough::None)
        } else {
            (ClipboardBackend::Unavailable, None, Passthrough::None)
        };
        let (backend, fallback) = match env::var(ENV_CLIPBOARD_BACKEND) {
            Ok(value) => apply_override(&value, backend, fallback),
            Err(_) => (backend, fallback),
        };
        tracing::info!(?backend, ?passthrough, "clipboard backend selected");
        Self {
            backend,
            fallback,
            passthrough,
            max_payload: Self::DEFAULT_MAX_OSC52_PAYLOAD,
        }
    }

    /// OSC 52 only, with explicit wrapping.
    #[must_use]
    pub const fn osc52(passthrough: Passthrough) -> Self {
        Self {
            backend: ClipboardBackend::Osc52,
            fallback: None,
            passthrough,
            max_payload: Self::DEFAULT_MAX_OSC52_PAYLOAD,
        }
    }

    /// A clipboard that always fails with [`ClipboardError::NotAvailable`].
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            backend: ClipboardBackend::Unavailable,
            fallback: None,
            passthrough: Passthrough::None,
            max_payload: Self::DEFAULT_MAX_OSC52_PAYLOAD,
        }
    }

    /// Override the OSC 52 payload limit (0 restores the default).
    #[must_use]
    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = if max_payload == 0 {
            Self::DEFAULT_MAX_OSC52_PAYLOAD
        } else {
            max_payload
        };
        self
    }

    /// Selected backend.
    #[must_use]
    pub const fn backend(&self) -> ClipboardBackend {
        self.backend
    }

    /// Whether any backend is usable.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !matches!(self.backend, ClipboardBackend::Unavailable)
    }

    /// Copy `content`. OSC 52 sequences go to `writer`.
    pub fn set(&self, content: &str, writer: &mut impl Write) -> Result<(), ClipboardError> {
        match self.backend {
            ClipboardBackend::Osc52 => {
                let result = self.write_osc52(content, writer);
                if let (Err(err), Some(tool)) = (&result, self.fallback) {
                    tracing::warn!(error = %err, ?tool, "OSC 52 failed; using external tool");
                    return set_external(tool, content);
                }
                result
            }
            ClipboardBackend::External(tool) => set_external(tool, content),
            ClipboardBackend::Unavailable => Err(ClipboardError::NotAvailable),
        }
    }

    fn write_osc52(&self, content: &str, writer: &mut impl Write) -> Result<(), ClipboardError> {
        let encoded = STANDARD.encode(content.as_bytes());
        if encoded.len() > self.max_payload {
            return Err(ClipboardError::TooLarge {
                encoded: encoded.len(),
                limit: self.max_payload,
            });
        }
        let seq = format!("\x1b]52;c;{encoded}\x07");
        let wrapped = wrap(self.passthrough, seq.as_bytes());
        writer
            .write_all(&wrapped)
            .and_then(|()| writer.flush())
            .map_err(|e| ClipboardError::WriteError(e.to_string()))
    }
}

fn wrap(passthrough: Passthrough, seq: &[u8]) -> Vec<u8> {
    match passthrough {
        Passthrough::None => seq.to_vec(),
        Passthrough::Tmux => {
            let mut out = b"\x1bPtmux;".to_vec();
            for &byte in seq {
                if byte == 0x1b {
                    out.push(0x1b);
                }
                out.push(byte);
            }
            out.extend_from_slice(b"\x1b\\");
            out
        }
        Passthrough::Screen => {
            let mut out = b"\x1bP".to_vec();
            out.extend_from_slice(seq);
            out.extend_from_slice(b"\x1b\\");
            out
        }
    }
}

fn apply_override(
    value: &str,
    backend: ClipboardBackend,
    fallback: Option<ExternalTool>,
) -> (ClipboardBackend, Option<ExternalTool>) {
    let external = |tool| {
        if tool_available(tool) {
            (ClipboardBackend::External(tool), None)
        } else {
            (ClipboardBackend::Unavailable, None)
        }
    };
    match value.to_ascii_lowercase().as_str() {
        "osc52" => (ClipboardBackend::Osc52, fallback),
        "macos" => external(ExternalTool::MacOS),
        "windows" => external(ExternalTool::Windows),
        "wayland" => external(ExternalTool::Wayland),
        "x11" => external(ExternalTool::X11),
        "none" => (ClipboardBackend::Unavailable, None),
        other => {
            tracing::warn!(value = other, "unknown {ENV_CLIPBOARD_BACKEND} value");
            (backend, fallback)
        }
    }
}

fn detect_external_tool() -> Option<ExternalTool> {
    [
        ExternalTool::MacOS,
        ExternalTool::Windows,
        ExternalTool::Wayland,
        ExternalTool::X11,
    ]
    .into_iter()
    .find(|&tool| tool_available(tool))
}

fn tool_available(tool: ExternalTool) -> bool {
    if !cfg!(feature = "clipboard-fallback") {
        return false;
    }
    match tool {
        ExternalTool::MacOS => cfg!(target_os = "macos") && command_exists("pbcopy"),
        ExternalTool::Windows => cfg!(target_os = "windows") && command_exists("clip"),
        ExternalTool::Wayland => {
            env::var_os("WAYLAND_DISPLAY").is_some() && command_exists("wl-copy")
        }
        ExternalTool::X11 => {
            env::var_os("DISPLAY").is_some() && (command_exists("xclip") || command_exists("xsel"))
        }
    }
}

fn command_exists(command: &str) -> bool {
    if command.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(command).is_file();
    }
    let Some(path) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&path).any(|dir| {
        dir.join(command).is_file()
            || (cfg!(target_os = "windows") && dir.join(format!("{command}.exe")).is_file())
    })
}

#[cfg(feature = "clipboard-fallback")]
fn set_external(tool: ExternalTool, content: &str) -> Result<(), ClipboardError> {
    match tool {
        ExternalTool::MacOS => run_with_input("pbcopy", &[], content),
        ExternalTool::Windows => run_with_input("clip", &[], content),
        ExternalTool::Wayland => run_with_input("wl-copy", &[], content),
        ExternalTool::X11 => run_with_input("xclip", &["-selection", "clipboard"], content)
            .or_else(|_| run_with_input("xsel", &["--clipboard", "--input"], content)),
    }
}

#[cfg(not(feature = "clipboard-fallback"))]
fn set_external(tool: ExternalTool, content: &str) -> Result<(), ClipboardError> {
    let _ = (tool, content);
    Err(ClipboardError::NotAvailable)
}

#[cfg(feature = "clipboard-fallback")]
fn run_with_input(cmd: &str, args: &[&str], content: &str) -> Result<(), ClipboardError> {
    use std::process::{Command, Stdio};

    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| ClipboardError::WriteError(err.to_string()))?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(content.as_bytes())
            .map_err(|err| ClipboardError::WriteError(err.to_string()))?;
    }
    let status = child
        .wait()
        .map_err(|err| ClipboardError::WriteError(err.to_string()))?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::WriteError(format!("{cmd} exited with {status}")))
    }
}
