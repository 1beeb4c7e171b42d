#![forbid(unsafe_code)]

//! The demo's accessibility features.
//!
//! | feature | hotkey | priority |
//! |---------|--------|----------|
//! | [`StockpileFilter`] | F2 | normal |
//! | [`TradeMenu`] | F3 | normal |
//! | [`Confirm`] | opened by request | modal |

pub mod confirm;
pub mod stockpile_filter;
pub mod trade_menu;

pub use confirm::Confirm;
pub use stockpile_filter::StockpileFilter;
pub use trade_menu::TradeMenu;

use navkit::prelude::*;

use crate::host::Colony;

/// Register every demo feature on `cx`.
pub fn register_all(cx: &mut AccessContext<Colony>) -> Result<()> {
    cx.register(Priority::NORMAL, StockpileFilter::new())?;
    cx.register(Priority::NORMAL, TradeMenu::new())?;
    cx.register(Priority::MODAL, Confirm::new())?;
    Ok(())
}
