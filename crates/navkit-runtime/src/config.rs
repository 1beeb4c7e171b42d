#![forbid(unsafe_code)]

//! Runtime configuration.
//!
//! # Environment variables
//!
//! | variable | field | values |
//! |----------|-------|--------|
//! | `NAVKIT_ANNOUNCE_POSITION` | `announce_position` | `1`/`true`, `0`/`false` |
//! | `NAVKIT_SUPPRESS_REPEATS` | `suppress_repeats` | `1`/`true`, `0`/`false` |
//! | `NAVKIT_HISTORY_LIMIT` | `history_limit` | integer, clamped to 0..=1024 |
//! | `NAVKIT_SPEECH_PRIORITY` | `speech_priority` | `low`, `normal`, `high` |
//! | `NAVKIT_CLIPBOARD` | `clipboard` | `1`/`true`, `0`/`false` |
//! | `NAVKIT_SLIDER_STEP` | `slider_step` | float in (0, 1] |
//! | `NAVKIT_REPEAT_KEY` | `repeat_key` | key name (`F12`, `Tab`), `none` |
//!
//! Unparseable values are logged and ignored.

use std::fmt;

use navkit_core::announce::{Announcer, SpeechPriority};
use navkit_core::event::KeyCode;

/// Upper bound for `history_limit`.
pub const MAX_HISTORY_LIMIT: usize = 1024;

/// Default step for fractional range sliders.
pub const DEFAULT_SLIDER_STEP: f64 = 0.05;

/// Default key that re-speaks the last announcement while a menu is open.
pub const DEFAULT_REPEAT_KEY: KeyCode = KeyCode::F(12);

/// A configuration value could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The value does not parse as the expected type.
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// The raw value.
        value: String,
        /// What was expected.
        expected: &'static str,
    },
    /// The variable is not a navkit setting.
    UnknownKey(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "invalid value for {key}: {value:?} (expected {expected})"),
            Self::UnknownKey(key) => write!(f, "unknown setting: {key}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Navigation and output settings.
#[derive(Debug, Clone, PartialEq)]
pub struct NavConfig {
    /// Append "N of M" to item announcements.
    pub announce_position: bool,
    /// Drop successive identical announcements.
    pub suppress_repeats: bool,
    /// Past announcements kept for review.
    pub history_limit: usize,
    /// Priority of navigation announcements.
    pub speech_priority: SpeechPriority,
    /// Copy announcements to the clipboard.
    pub clipboard: bool,
    /// Step for fractional range sliders.
    pub slider_step: f64,
    /// Re-speaks the last announcement while a feature is active.
    pub repeat_key: Option<KeyCode>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            announce_position: true,
            suppress_repeats: true,
            history_limit: Announcer::DEFAULT_HISTORY_LIMIT,
            speech_priority: SpeechPriority::Normal,
            clipboard: true,
            slider_step: DEFAULT_SLIDER_STEP,
            repeat_key: Some(DEFAULT_REPEAT_KEY),
        }
    }
}

impl NavConfig {
    /// All recognised variable names.
    pub const ENV_KEYS: [&'static str; 7] = [
        "NAVKIT_ANNOUNCE_POSITION",
        "NAVKIT_SUPPRESS_REPEATS",
        "NAVKIT_HISTORY_LIMIT",
        "NAVKIT_SPEECH_PRIORITY",
        "NAVKIT_CLIPBOARD",
        "NAVKIT_SLIDER_STEP",
        "NAVKIT_REPEAT_KEY",
    ];

    /// Load from `NAVKIT_*` environment variables over the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(
            Self::ENV_KEYS
                .iter()
                .filter_map(|key| std::env::var(key).ok().map(|value| (*key, value))),
        )
    }

    /// Load from `(key, value)` pairs over the defaults.
    ///
    /// Bad pairs are logged and skipped.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            if let Err(err) = config.set(key.as_ref(), value.as_ref()) {
                tracing::warn!(error = %err, "ignoring configuration value");
            }
        }
        config.validated()
    }

    /// Apply one setting.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "NAVKIT_ANNOUNCE_POSITION" => {
                self.announce_position = parse_flag("NAVKIT_ANNOUNCE_POSITION", value)?;
            }
            "NAVKIT_SUPPRESS_REPEATS" => {
                self.suppress_repeats = parse_flag("NAVKIT_SUPPRESS_REPEATS", value)?;
            }
            "NAVKIT_HISTORY_LIMIT" => {
                self.history_limit =
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue {
                            key: "NAVKIT_HISTORY_LIMIT",
                            value: value.to_string(),
                            expected: "a non-negative integer",
                        })?;
            }
            "NAVKIT_SPEECH_PRIORITY" => {
                self.speech_priority =
                    SpeechPriority::parse(value).ok_or_else(|| ConfigError::InvalidValue {
                        key: "NAVKIT_SPEECH_PRIORITY",
                        value: value.to_string(),
                        expected: "low, normal or high",
                    })?;
            }
            "NAVKIT_CLIPBOARD" => {
                self.clipboard = parse_flag("NAVKIT_CLIPBOARD", value)?;
            }
            "NAVKIT_SLIDER_STEP" => {
                self.slider_step = value
                    .trim()
                    .parse()
                    .ok()
                    .filter(|step: &f64| step.is_finite())
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: "NAVKIT_SLIDER_STEP",
                        value: value.to_string(),
                        expected: "a number",
                    })?;
            }
            "NAVKIT_REPEAT_KEY" => {
                let name = value.trim();
                self.repeat_key = if name.eq_ignore_ascii_case("none") {
                    None
                } else {
                    let code = KeyCode::parse(name).ok_or_else(|| ConfigError::InvalidValue {
                        key: "NAVKIT_REPEAT_KEY",
                        value: value.to_string(),
                        expected: "a key name or none",
                    })?;
                    Some(code)
                };
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Clamp values into their valid ranges.
    ///
    /// - `history_limit` to `0..=1024`
    /// - `slider_step` to `(0, 1]`; non-positive steps fall back to the default
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.history_limit = self.history_limit.min(MAX_HISTORY_LIMIT);
        if !(self.slider_step.is_finite() && self.slider_step > 0.0) {
            self.slider_step = DEFAULT_SLIDER_STEP;
        }
        self.slider_step = self.slider_step.min(1.0);
        self
    }

    /// Apply the announcement settings to `announcer`.
    pub fn apply(&self, announcer: &mut Announcer) {
        announcer.set_include_position(self.announce_position);
        announcer.set_suppress_repeats(self.suppress_repeats);
        announcer.set_history_limit(self.history_limit);
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    let value = value.trim();
    if value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("on") {
        Ok(true)
    } else if value == "0" || value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("off")
    {
        Ok(false)
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            expected: "1, 0, true or false",
        })
    }
}
