#![forbid(unsafe_code)]

//! Wiring for the demo: output sinks, feature registration and key scripts.

use std::fmt;
use std::io::{self, Write};

use navkit::prelude::*;
use navkit::{Clipboard, ClipboardSink, SpeechSink, TracingBridge, WriterSink};

use crate::features;
use crate::host::Colony;

/// A key script could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A token does not name a key.
    UnknownKey {
        /// 1-based token position.
        position: usize,
        /// The token.
        name: String,
    },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey { position, name } => {
                write!(f, "unknown key {name:?} at position {position}")
            }
        }
    }
}

impl std::error::Error for ScriptError {}

/// Parse a comma-separated key script such as `"F3, Down, Enter"`.
///
/// Tokens may carry `ctrl+`, `alt+` and `shift+` prefixes. Empty tokens are
/// skipped.
pub fn parse_script(script: &str) -> std::result::Result<Vec<KeyEvent>, ScriptError> {
    script
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(i, token)| {
            parse_key(token).ok_or_else(|| ScriptError::UnknownKey {
                position: i + 1,
                name: token.to_string(),
            })
        })
        .collect()
}

fn parse_key(token: &str) -> Option<KeyEvent> {
    let mut modifiers = Modifiers::NONE;
    let mut rest = token;
    loop {
        let lower = rest.to_ascii_lowercase();
        let (flag, len) = if lower.starts_with("ctrl+") {
            (Modifiers::CTRL, 5)
        } else if lower.starts_with("alt+") {
            (Modifiers::ALT, 4)
        } else if lower.starts_with("shift+") {
            (Modifiers::SHIFT, 6)
        } else {
            break;
        };
        modifiers |= flag;
        rest = &rest[len..];
    }
    let code = KeyCode::parse(rest)?;
    Some(KeyEvent::new(code).with_modifiers(modifiers))
}

/// Where announcements go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outputs {
    /// Print each announcement as a line.
    pub print: bool,
    /// Copy each announcement to the clipboard.
    pub clipboard: bool,
    /// Terminate printed lines with CR LF (raw mode).
    pub raw_newlines: bool,
}

/// Build the access context: config, sinks and the three features.
pub fn build_context(config: NavConfig, outputs: Outputs) -> Result<AccessContext<Colony>> {
    let mut cx = AccessContext::new(config).with_sink(SpeechSink::new(TracingBridge));
    if outputs.print {
        let writer = CrLf {
            inner: io::stdout(),
            enabled: outputs.raw_newlines,
        };
        cx.add_sink(WriterSink::new(writer));
    }
    if outputs.clipboard && cx.config().clipboard {
        let clipboard = Clipboard::detect();
        if clipboard.is_available() {
            cx.add_sink(ClipboardSink::new(clipboard, io::stdout()));
        } else {
            tracing::info!("no clipboard backend; clipboard output disabled");
        }
    }
    features::register_all(&mut cx)?;
    Ok(cx)
}

/// Feed `keys` one frame at a time. Returns how many reached the host.
pub fn run_script(
    cx: &mut AccessContext<Colony>,
    colony: &mut Colony,
    keys: impl IntoIterator<Item = KeyEvent>,
) -> usize {
    let mut passed = 0;
    for key in keys {
        for dispatch in cx.frame([key], colony) {
            if dispatch.reaches_host() {
                tracing::debug!(key = ?key.code, "host handles key");
                passed += 1;
            }
        }
    }
    passed
}

/// Writes `\r\n` for every `\n` when enabled.
struct CrLf<W> {
    inner: W,
    enabled: bool,
}

impl<W: Write> Write for CrLf<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.enabled {
            return self.inner.write(buf);
        }
        for line in buf.split_inclusive(|&b| b == b'\n') {
            match line.strip_suffix(b"\n") {
                Some(body) => {
                    self.inner.write_all(body)?;
                    self.inner.write_all(b"\r\n")?;
                }
                None => self.inner.write_all(line)?,
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
