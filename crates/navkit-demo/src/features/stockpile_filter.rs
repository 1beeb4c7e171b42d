#![forbid(unsafe_code)]

//! Keyboard access to the stockpile filter.
//!
//! F2 opens a tree of thing categories. Quality and hit-point range sliders
//! sit above the tree and a "Done" action below it.

use navkit::prelude::*;

use crate::host::{Colony, FilterKey};

/// Feature id.
pub const ID: FeatureId = FeatureId::new("stockpile-filter");

/// Opening hotkey.
pub const HOTKEY: KeyCode = KeyCode::F(2);

/// The stockpile filter tree.
#[derive(Debug, Default)]
pub struct StockpileFilter {
    tree: TreeController<FilterKey>,
}

impl StockpileFilter {
    /// A closed filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The tree controller.
    #[must_use]
    pub fn tree(&self) -> &TreeController<FilterKey> {
        &self.tree
    }

    fn close(&mut self, cx: &mut FeatureContext<'_, Colony>) {
        self.tree.close();
        cx.release_focus();
        cx.announce("Filter closed");
    }
}

impl Feature<Colony> for StockpileFilter {
    fn id(&self) -> FeatureId {
        ID
    }

    fn is_active(&self) -> bool {
        self.tree.is_active()
    }

    fn handle_key(&mut self, key: &KeyEvent, cx: &mut FeatureContext<'_, Colony>) -> Handled {
        let (host, announcer) = cx.split();
        match self.tree.handle_key(key, host, announcer) {
            TreeResponse::Activated(FilterKey::Done) | TreeResponse::Closed => {
                self.close(cx);
                Handled::Consumed
            }
            TreeResponse::Activated(other) => {
                tracing::debug!(key = %other, "unhandled filter action");
                Handled::Consumed
            }
            TreeResponse::Handled => Handled::Consumed,
            TreeResponse::Ignored => Handled::Declined,
        }
    }

    fn on_hotkey(&mut self, key: &KeyEvent, cx: &mut FeatureContext<'_, Colony>) -> Handled {
        if key.code != HOTKEY {
            return Handled::Declined;
        }
        if let Err(err) = cx.claim_focus() {
            tracing::debug!(error = %err, "stockpile filter not opened");
            return Handled::Declined;
        }
        let host = cx.host();
        let root = host.filter_tree();
        let options = TreeOptions::default()
            .leading(TreeNode::slider("Quality", FilterKey::Quality, host.quality()))
            .leading(TreeNode::slider("Hit points", FilterKey::HitPoints, host.hit_points()))
            .trailing(TreeNode::action("Done", FilterKey::Done));
        self.tree.activate(root, options, cx.announcer());
        Handled::Consumed
    }

    fn on_frame(&mut self, cx: &mut FeatureContext<'_, Colony>) {
        let failures = self.tree.refresh(cx.host());
        if failures > 0 {
            tracing::trace!(failures, "filter refresh incomplete");
        }
    }

    fn force_close(&mut self) {
        self.tree.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navkit::RecordingSink;

    fn context() -> (AccessContext<Colony>, RecordingSink) {
        let sink = RecordingSink::new();
        let mut cx = AccessContext::new(NavConfig::default()).with_sink(sink.clone());
        cx.register(Priority::NORMAL, StockpileFilter::new()).unwrap();
        (cx, sink)
    }

    fn press(cx: &mut AccessContext<Colony>, colony: &mut Colony, codes: &[KeyCode]) {
        for &code in codes {
            cx.dispatch(&KeyEvent::new(code), colony);
        }
    }

    #[test]
    fn opens_on_first_slider() {
        let (mut cx, sink) = context();
        let mut colony = Colony::new();
        press(&mut cx, &mut colony, &[HOTKEY]);
        assert!(cx.routes().is_active(ID));
        assert_eq!(sink.texts(), ["Quality, 0% to 100%, 1 of 6"]);
    }

    #[test]
    fn cascade_writes_to_host() {
        let (mut cx, sink) = context();
        let mut colony = Colony::new();
        // Quality, Hit points, Foods
        press(&mut cx, &mut colony, &[HOTKEY, KeyCode::Down, KeyCode::Down]);
        assert_eq!(
            sink.last_text().as_deref(),
            Some("Foods (Partially allowed), collapsed, 3 of 6")
        );
        press(&mut cx, &mut colony, &[KeyCode::Char(' ')]);
        assert_eq!(colony.allowed("Berries"), Some(true));
        assert_eq!(
            sink.last_text().as_deref(),
            Some("Foods (Allowed), collapsed, 3 of 6")
        );
    }

    #[test]
    fn broken_def_is_not_available() {
        let (mut cx, sink) = context();
        let mut colony = Colony::new();
        colony.break_def("Wood");
        // Materials is the fourth row; expand it, step onto Wood.
        press(
            &mut cx,
            &mut colony,
            &[HOTKEY, KeyCode::Down, KeyCode::Down, KeyCode::Down, KeyCode::Right, KeyCode::Right],
        );
        assert_eq!(sink.last_text().as_deref(), Some("Wood (Allowed), 5 of 9"));
        press(&mut cx, &mut colony, &[KeyCode::Enter]);
        assert_eq!(sink.last_text().as_deref(), Some("Wood not available"));
        assert_eq!(colony.allowed("Wood"), Some(true));
    }

    #[test]
    fn slider_commit_reaches_host() {
        let (mut cx, sink) = context();
        let mut colony = Colony::new();
        press(
            &mut cx,
            &mut colony,
            &[HOTKEY, KeyCode::Enter, KeyCode::Right, KeyCode::Right, KeyCode::Enter],
        );
        assert!((colony.quality().min() - 0.1).abs() < 1e-9);
        assert_eq!(
            sink.last_text().as_deref(),
            Some("Quality, 10% to 100%, 1 of 6")
        );
    }

    #[test]
    fn done_closes_and_releases_focus() {
        let (mut cx, sink) = context();
        let mut colony = Colony::new();
        press(&mut cx, &mut colony, &[HOTKEY, KeyCode::End, KeyCode::Enter]);
        assert!(!cx.any_active());
        assert!(!cx.focus().is_owned());
        assert_eq!(sink.last_text().as_deref(), Some("Filter closed"));
    }
}
