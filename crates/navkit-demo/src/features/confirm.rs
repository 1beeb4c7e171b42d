#![forbid(unsafe_code)]

//! Yes/No confirmation for a staged trade.
//!
//! Registered at modal priority, so opening it preempts whichever menu
//! asked for it. Closing hands focus back to that menu.

use navkit::prelude::*;

use crate::host::Colony;

/// Feature id.
pub const ID: FeatureId = FeatureId::new("confirm");

/// The confirmation dialog.
#[derive(Debug)]
pub struct Confirm {
    list: ListController<bool>,
}

impl Default for Confirm {
    fn default() -> Self {
        Self::new()
    }
}

impl Confirm {
    /// A closed dialog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            list: ListController::new(),
        }
    }

    fn finish(&mut self, accepted: bool, cx: &mut FeatureContext<'_, Colony>) {
        self.list.close();
        cx.release_focus();
        if !accepted {
            cx.host().cancel_trade();
            cx.announce("Cancelled");
            return;
        }
        match cx.host().complete_trade() {
            Ok(name) => {
                cx.announce(format!("Bought {name}"));
            }
            Err(err) => {
                tracing::warn!(error = %err, "trade failed");
                cx.announce("Trade not available");
            }
        }
    }
}

impl Feature<Colony> for Confirm {
    fn id(&self) -> FeatureId {
        ID
    }

    fn is_active(&self) -> bool {
        self.list.is_active()
    }

    fn handle_key(&mut self, key: &KeyEvent, cx: &mut FeatureContext<'_, Colony>) -> Handled {
        match self.list.handle_key(key, cx.announcer()) {
            ListResponse::Executed(accepted) => self.finish(accepted, cx),
            ListResponse::Closed => self.finish(false, cx),
            ListResponse::Moved | ListResponse::Rejected | ListResponse::Ignored => {}
        }
        // Nothing gets past a modal dialog.
        Handled::Consumed
    }

    fn on_open_request(
        &mut self,
        request: &OpenRequest,
        cx: &mut FeatureContext<'_, Colony>,
    ) -> Handled {
        if let Err(err) = cx.claim_focus() {
            tracing::warn!(error = %err, "confirmation refused");
            return Handled::Declined;
        }
        let title = request.prompt.clone().unwrap_or_else(|| "Confirm".to_string());
        self.list = ListController::new().with_title(title);
        self.list.open(
            vec![MenuItem::new("Yes", true), MenuItem::new("No", false)],
            cx.announcer(),
        );
        Handled::Consumed
    }

    fn force_close(&mut self) {
        self.list.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navkit::RecordingSink;

    fn open(colony: &mut Colony) -> (AccessContext<Colony>, RecordingSink) {
        let sink = RecordingSink::new();
        let mut cx = AccessContext::new(NavConfig::default()).with_sink(sink.clone());
        cx.register(Priority::MODAL, Confirm::new()).unwrap();
        colony.stage_trade(0).unwrap();
        assert!(cx.open(OpenRequest::new(ID).with_prompt("Buy Rice for 20 silver"), colony));
        (cx, sink)
    }

    #[test]
    fn announces_prompt_and_first_choice() {
        let mut colony = Colony::new();
        let (_, sink) = open(&mut colony);
        assert_eq!(sink.texts(), ["Buy Rice for 20 silver. Yes, 1 of 2"]);
    }

    #[test]
    fn yes_completes_the_trade() {
        let mut colony = Colony::new();
        let (mut cx, sink) = open(&mut colony);
        cx.dispatch(&KeyEvent::new(KeyCode::Enter), &mut colony);
        assert_eq!(colony.silver(), 80);
        assert_eq!(sink.last_text().as_deref(), Some("Bought Rice"));
        assert!(!cx.focus().is_owned());
    }

    #[test]
    fn escape_cancels() {
        let mut colony = Colony::new();
        let (mut cx, sink) = open(&mut colony);
        cx.dispatch(&KeyEvent::new(KeyCode::Escape), &mut colony);
        assert_eq!(colony.silver(), 100);
        assert!(colony.pending_trade().is_none());
        assert_eq!(sink.last_text().as_deref(), Some("Cancelled"));
    }

    #[test]
    fn unrelated_keys_are_swallowed() {
        let mut colony = Colony::new();
        let (mut cx, _) = open(&mut colony);
        assert_eq!(
            cx.dispatch(&KeyEvent::new(KeyCode::F(3)), &mut colony),
            Dispatch::Consumed(ID)
        );
    }
}
