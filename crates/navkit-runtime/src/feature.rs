#![forbid(unsafe_code)]

//! The contract between the router and one accessibility feature.
//!
//! A feature wraps one host screen (a filter tree, a trade menu, a dialog).
//! It is dormant until its hotkey fires or another feature asks it to open,
//! then it owns keyboard input until it closes.

use std::fmt;

use navkit_core::event::KeyEvent;

use crate::context::FeatureContext;

/// Stable name of a registered feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(&'static str);

impl FeatureId {
    /// Wrap a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Routing priority. Higher values see input first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Priority(pub u16);

impl Priority {
    /// Background helpers.
    pub const LOW: Self = Self(100);
    /// Ordinary menus.
    pub const NORMAL: Self = Self(500);
    /// Menus opened from within other menus.
    pub const HIGH: Self = Self(800);
    /// Confirmation dialogs; preempt everything else.
    pub const MODAL: Self = Self(1000);
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a feature consumed an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handled {
    /// The event was used; stop routing.
    Consumed,
    /// Not interested; keep routing.
    Declined,
}

impl Handled {
    /// Whether the event was used.
    #[must_use]
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

impl From<bool> for Handled {
    fn from(consumed: bool) -> Self {
        if consumed {
            Self::Consumed
        } else {
            Self::Declined
        }
    }
}

/// A request from one feature (or the host) to open another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    /// The feature to open.
    pub target: FeatureId,
    /// Text the opened feature should present (a dialog question).
    pub prompt: Option<String>,
}

impl OpenRequest {
    /// Open `target` with no prompt.
    #[must_use]
    pub const fn new(target: FeatureId) -> Self {
        Self {
            target,
            prompt: None,
        }
    }

    /// Attach a prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

/// One accessibility feature, generic over the host adapter `H`.
pub trait Feature<H> {
    /// Stable identifier used for focus and routing.
    fn id(&self) -> FeatureId;

    /// Whether the feature currently owns a menu.
    fn is_active(&self) -> bool;

    /// Handle a key-down while active.
    fn handle_key(&mut self, key: &KeyEvent, cx: &mut FeatureContext<'_, H>) -> Handled;

    /// Offered key-downs while inactive; return `Consumed` after opening.
    fn on_hotkey(&mut self, key: &KeyEvent, cx: &mut FeatureContext<'_, H>) -> Handled {
        let _ = (key, cx);
        Handled::Declined
    }

    /// Called once per frame while active, after input.
    fn on_frame(&mut self, cx: &mut FeatureContext<'_, H>) {
        let _ = cx;
    }

    /// Another feature (or the host) asked this one to open.
    fn on_open_request(&mut self, request: &OpenRequest, cx: &mut FeatureContext<'_, H>) -> Handled {
        let _ = (request, cx);
        Handled::Declined
    }

    /// Focus came back after a higher-priority feature released it.
    fn on_focus_restored(&mut self, cx: &mut FeatureContext<'_, H>) {
        let _ = cx;
    }

    /// Close immediately without announcing (host screen went away).
    fn force_close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_by_value() {
        assert!(Priority::MODAL > Priority::HIGH);
        assert!(Priority::HIGH > Priority::NORMAL);
        assert!(Priority::NORMAL > Priority::LOW);
        assert_eq!(Priority::default(), Priority(0));
    }

    #[test]
    fn handled_from_bool() {
        assert_eq!(Handled::from(true), Handled::Consumed);
        assert!(!Handled::from(false).is_consumed());
    }

    #[test]
    fn feature_id_display() {
        assert_eq!(FeatureId::new("trade").to_string(), "trade");
        assert_eq!(FeatureId::new("trade").as_str(), "trade");
    }

    #[test]
    fn open_request_prompt() {
        let request = OpenRequest::new(FeatureId::new("confirm")).with_prompt("Buy?");
        assert_eq!(request.prompt.as_deref(), Some("Buy?"));
    }
}
