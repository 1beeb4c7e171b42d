#![forbid(unsafe_code)]

//! Announcement formatting and delivery.
//!
//! After every state-changing step a controller produces one string that says
//! where the user is. [`Describe`] builds that string with the same rules
//! everywhere; [`Announcer`] fans it out to the configured output channels
//! and drops successive duplicates.
//!
//! # Format
//!
//! ```text
//! label [(Allowed|Disallowed|Partially allowed)] [, expanded|collapsed]
//!       [(reason|unavailable)] [, detail] [, N of M]
//! ```
//!
//! # Example
//!
//! ```
//! use navkit_core::announce::{CheckState, Describe, Expansion};
//!
//! let text = Describe::new("Wood").check(CheckState::Allowed).position(2, 9).to_string();
//! assert_eq!(text, "Wood (Allowed), 3 of 9");
//!
//! let text = Describe::new("Food").expansion(Expansion::Collapsed).position(0, 4).to_string();
//! assert_eq!(text, "Food, collapsed, 1 of 4");
//! ```

use std::collections::VecDeque;
use std::fmt;

use crate::selection;

/// Generic suffix for disabled items with no known reason.
pub const UNAVAILABLE: &str = "unavailable";

/// Announcement spoken for an empty list.
pub const NO_ITEMS: &str = "No items";

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Urgency of an announcement on the speech channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum SpeechPriority {
    /// Queued behind whatever is being spoken.
    Low,
    /// Ordinary navigation feedback.
    #[default]
    Normal,
    /// Interrupts current speech.
    High,
}

impl SpeechPriority {
    /// Whether this priority cuts off speech in progress.
    #[must_use]
    pub const fn interrupts(self) -> bool {
        matches!(self, Self::High)
    }

    /// Parse a priority name (`low`, `normal`, `high`).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// A single announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// The text to speak / copy.
    pub text: String,
    /// Speech urgency.
    pub priority: SpeechPriority,
}

impl Announcement {
    /// Create an announcement.
    pub fn new(text: impl Into<String>, priority: SpeechPriority) -> Self {
        Self {
            text: text.into(),
            priority,
        }
    }
}

/// An output channel for announcements.
pub trait AnnouncementSink {
    /// Deliver one announcement. Sinks swallow their own failures.
    fn deliver(&mut self, announcement: &Announcement);

    /// Short name for logs.
    fn name(&self) -> &str {
        "sink"
    }
}

// ---------------------------------------------------------------------------
// Node state vocabulary
// ---------------------------------------------------------------------------

/// Allow/disallow state of a checkbox-style node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckState {
    /// Every covered item is allowed.
    Allowed,
    /// No covered item is allowed.
    Disallowed,
    /// Some, but not all, covered items are allowed (categories only).
    Partial,
}

impl CheckState {
    /// Map a plain flag.
    #[must_use]
    pub const fn from_flag(allowed: bool) -> Self {
        if allowed {
            Self::Allowed
        } else {
            Self::Disallowed
        }
    }

    /// Combine the states of several children.
    ///
    /// Returns `None` when there is nothing to aggregate.
    pub fn aggregate(states: impl IntoIterator<Item = CheckState>) -> Option<Self> {
        let mut result: Option<Self> = None;
        for state in states {
            result = Some(match (result, state) {
                (None, s) => s,
                (Some(Self::Allowed), Self::Allowed) => Self::Allowed,
                (Some(Self::Disallowed), Self::Disallowed) => Self::Disallowed,
                _ => Self::Partial,
            });
            if result == Some(Self::Partial) {
                break;
            }
        }
        result
    }

    /// Spoken label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Allowed => "Allowed",
            Self::Disallowed => "Disallowed",
            Self::Partial => "Partially allowed",
        }
    }
}

/// Expansion state of a category node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expansion {
    /// Children are visible.
    Expanded,
    /// Children are hidden.
    Collapsed,
}

impl Expansion {
    /// Map a plain flag.
    #[must_use]
    pub const fn from_flag(expanded: bool) -> Self {
        if expanded {
            Self::Expanded
        } else {
            Self::Collapsed
        }
    }

    /// Spoken label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Expanded => "expanded",
            Self::Collapsed => "collapsed",
        }
    }
}

/// Whether an item can be executed, and why not.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Availability {
    /// The item can be executed.
    #[default]
    Enabled,
    /// The item is shown but cannot be executed.
    Disabled {
        /// Human-readable reason, if the host provides one.
        reason: Option<String>,
    },
}

impl Availability {
    /// Disabled with a known reason.
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self::Disabled {
            reason: Some(reason.into()),
        }
    }

    /// Disabled without a reason.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self::Disabled { reason: None }
    }

    /// Whether the item can be executed.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }

    /// The reason text to speak for a disabled item.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Enabled => None,
            Self::Disabled { reason } => Some(reason.as_deref().unwrap_or(UNAVAILABLE)),
        }
    }
}

// ---------------------------------------------------------------------------
// Describe
// ---------------------------------------------------------------------------

/// Builder for the announcement of one navigable item.
#[derive(Debug, Clone, Copy)]
pub struct Describe<'a> {
    label: &'a str,
    check: Option<CheckState>,
    expansion: Option<Expansion>,
    unavailable: Option<&'a str>,
    detail: Option<&'a str>,
    position: Option<(usize, usize)>,
}

impl<'a> Describe<'a> {
    /// Start describing an item with the given label.
    #[must_use]
    pub const fn new(label: &'a str) -> Self {
        Self {
            label,
            check: None,
            expansion: None,
            unavailable: None,
            detail: None,
            position: None,
        }
    }

    /// Add an allow/disallow state.
    #[must_use]
    pub const fn check(mut self, state: CheckState) -> Self {
        self.check = Some(state);
        self
    }

    /// Add an expanded/collapsed state.
    #[must_use]
    pub const fn expansion(mut self, expansion: Expansion) -> Self {
        self.expansion = Some(expansion);
        self
    }

    /// Mark the item as disabled, using `availability`'s reason.
    #[must_use]
    pub fn availability(mut self, availability: &'a Availability) -> Self {
        self.unavailable = availability.reason();
        self
    }

    /// Extra detail (a slider's current range, a price).
    #[must_use]
    pub const fn detail(mut self, detail: &'a str) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Add the 1-based "N of M" suffix for a 0-based `index`.
    ///
    /// A stale index is clamped; an empty count adds nothing.
    #[must_use]
    pub const fn position(mut self, index: usize, count: usize) -> Self {
        self.position = selection::ordinal(index, count);
        self
    }

    /// Drop the position suffix (when configured off).
    #[must_use]
    pub const fn without_position(mut self) -> Self {
        self.position = None;
        self
    }
}

impl fmt::Display for Describe<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)?;
        if let Some(check) = self.check {
            write!(f, " ({})", check.label())?;
        }
        if let Some(expansion) = self.expansion {
            write!(f, ", {}", expansion.label())?;
        }
        if let Some(reason) = self.unavailable {
            write!(f, " ({reason})")?;
        }
        if let Some(detail) = self.detail {
            write!(f, ", {detail}")?;
        }
        if let Some((n, m)) = self.position {
            write!(f, ", {n} of {m}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Announcer
// ---------------------------------------------------------------------------

/// Fans announcements out to every sink and remembers what was said last.
pub struct Announcer {
    sinks: Vec<Box<dyn AnnouncementSink>>,
    last: Option<Announcement>,
    suppress_repeats: bool,
    include_position: bool,
    history: VecDeque<Announcement>,
    history_limit: usize,
}

impl Announcer {
    /// Default number of announcements kept in history.
    pub const DEFAULT_HISTORY_LIMIT: usize = 64;

    /// Create an announcer with no sinks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sinks: Vec::new(),
            last: None,
            suppress_repeats: true,
            include_position: true,
            history: VecDeque::new(),
            history_limit: Self::DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Add an output channel.
    #[must_use]
    pub fn with_sink(mut self, sink: impl AnnouncementSink + 'static) -> Self {
        self.add_sink(sink);
        self
    }

    /// Add an output channel.
    pub fn add_sink(&mut self, sink: impl AnnouncementSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Number of output channels.
    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Enable or disable dropping successive identical announcements.
    pub fn set_suppress_repeats(&mut self, suppress: bool) {
        self.suppress_repeats = suppress;
    }

    /// Enable or disable the "N of M" suffix in controller announcements.
    pub fn set_include_position(&mut self, include: bool) {
        self.include_position = include;
    }

    /// Whether controllers should append "N of M".
    #[must_use]
    pub fn include_position(&self) -> bool {
        self.include_position
    }

    /// Set how many past announcements are kept (0 keeps none).
    pub fn set_history_limit(&mut self, limit: usize) {
        self.history_limit = limit;
        while self.history.len() > limit {
            self.history.pop_front();
        }
    }

    /// Announce at normal priority. Returns whether anything was delivered.
    pub fn announce(&mut self, text: impl Into<String>) -> bool {
        self.announce_with(text, SpeechPriority::Normal)
    }

    /// Announce at the given priority, dropping an exact repeat of the last
    /// announcement when suppression is on.
    pub fn announce_with(&mut self, text: impl Into<String>, priority: SpeechPriority) -> bool {
        let text = text.into();
        if self.suppress_repeats && self.last.as_ref().is_some_and(|last| last.text == text) {
            crate::trace!(text = %text, "suppressed repeat announcement");
            return false;
        }
        self.deliver(Announcement::new(text, priority));
        true
    }

    /// Announce regardless of what was said last.
    pub fn force(&mut self, text: impl Into<String>, priority: SpeechPriority) {
        self.deliver(Announcement::new(text, priority));
    }

    /// Speak the last announcement again. Returns `false` if there is none.
    pub fn repeat_last(&mut self) -> bool {
        match self.last.clone() {
            Some(last) => {
                self.deliver(last);
                true
            }
            None => false,
        }
    }

    /// Forget the last announcement so the next one is never suppressed.
    pub fn reset_last(&mut self) {
        self.last = None;
    }

    /// Text of the last delivered announcement.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.last.as_ref().map(|a| a.text.as_str())
    }

    /// Past announcements, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Announcement> {
        self.history.iter()
    }

    /// Drop the recorded history (the last announcement is kept).
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn deliver(&mut self, announcement: Announcement) {
        crate::debug!(text = %announcement.text, priority = ?announcement.priority, "announce");
        for sink in &mut self.sinks {
            sink.deliver(&announcement);
        }
        if self.history_limit > 0 {
            if self.history.len() == self.history_limit {
                self.history.pop_front();
            }
            self.history.push_back(announcement.clone());
        }
        self.last = Some(announcement);
    }
}

impl Default for Announcer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Announcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Announcer")
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("last", &self.last)
            .field("suppress_repeats", &self.suppress_repeats)
            .field("include_position", &self.include_position)
            .finish()
    }
}
