#![forbid(unsafe_code)]

//! Keyboard access to the trader's goods.
//!
//! F3 opens a flat list of offers. Offers the colony cannot afford stay in
//! the list but are disabled with the reason spoken. Enter on an affordable
//! offer stages it and asks the confirmation dialog to open; the list stays
//! open underneath and is refreshed when focus returns.

use navkit::prelude::*;

use crate::features::confirm;
use crate::host::Colony;

/// Feature id.
pub const ID: FeatureId = FeatureId::new("trade");

/// Opening hotkey.
pub const HOTKEY: KeyCode = KeyCode::F(3);

/// The trade menu.
#[derive(Debug)]
pub struct TradeMenu {
    list: ListController<usize>,
}

impl Default for TradeMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeMenu {
    /// A closed menu.
    #[must_use]
    pub fn new() -> Self {
        Self {
            list: ListController::new().with_close_on_execute(false),
        }
    }

    /// The list controller.
    #[must_use]
    pub fn list(&self) -> &ListController<usize> {
        &self.list
    }

    fn stage(&mut self, index: usize, cx: &mut FeatureContext<'_, Colony>) {
        match cx.host().stage_trade(index) {
            Ok(good) => {
                let prompt = format!("Buy {} for {} silver", good.name, good.price);
                cx.request_open(OpenRequest::new(confirm::ID).with_prompt(prompt));
            }
            Err(err) => {
                tracing::warn!(index, error = %err, "trade offer vanished");
                cx.announce("Trade not available");
            }
        }
    }
}

/// Project the trader's goods into menu items.
#[must_use]
pub fn offers(colony: &Colony) -> Vec<MenuItem<usize>> {
    colony
        .goods()
        .iter()
        .enumerate()
        .map(|(i, good)| {
            let item = MenuItem::new(good.name, i)
                .with_detail(format!("{} silver, {} left", good.price, good.stock));
            match colony.purchase_blocker(good) {
                Some(reason) => item.disabled(reason),
                None => item,
            }
        })
        .collect()
}

impl Feature<Colony> for TradeMenu {
    fn id(&self) -> FeatureId {
        ID
    }

    fn is_active(&self) -> bool {
        self.list.is_active()
    }

    fn handle_key(&mut self, key: &KeyEvent, cx: &mut FeatureContext<'_, Colony>) -> Handled {
        match self.list.handle_key(key, cx.announcer()) {
            ListResponse::Executed(index) => {
                self.stage(index, cx);
                Handled::Consumed
            }
            ListResponse::Closed => {
                cx.release_focus();
                cx.announce("Trade closed");
                Handled::Consumed
            }
            ListResponse::Moved | ListResponse::Rejected => Handled::Consumed,
            ListResponse::Ignored => Handled::Declined,
        }
    }

    fn on_hotkey(&mut self, key: &KeyEvent, cx: &mut FeatureContext<'_, Colony>) -> Handled {
        if key.code != HOTKEY {
            return Handled::Declined;
        }
        if let Err(err) = cx.claim_focus() {
            tracing::debug!(error = %err, "trade menu not opened");
            return Handled::Declined;
        }
        let silver = cx.host().silver();
        let items = offers(cx.host());
        self.list = ListController::new()
            .with_close_on_execute(false)
            .with_title(format!("Trade, {silver} silver"));
        self.list.open(items, cx.announcer());
        Handled::Consumed
    }

    fn on_focus_restored(&mut self, cx: &mut FeatureContext<'_, Colony>) {
        let items = offers(cx.host());
        self.list.replace_items(items);
        self.list.announce_current(cx.announcer());
    }

    fn force_close(&mut self) {
        self.list.close();
    }
}
