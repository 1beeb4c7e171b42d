//! Property-based invariant tests for a full demo session.
//!
//! 1. Every active feature owns focus or is suspended beneath the owner.
//! 2. The host only sees keys while no feature is active.
//! 3. Silver spent equals the prices of the goods the host logged as bought.
//! 4. Filter ranges stay ordered and inside their bounds.

use navkit::prelude::*;
use navkit_demo::app::{self, Outputs};
use navkit_demo::host::Colony;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const POOL: [KeyCode; 14] = [
    KeyCode::F(2),
    KeyCode::F(3),
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Home,
    KeyCode::End,
    KeyCode::PageUp,
    KeyCode::PageDown,
    KeyCode::Enter,
    KeyCode::Escape,
    KeyCode::Char(' '),
    KeyCode::Char('s'),
];

fn keys() -> impl Strategy<Value = Vec<KeyEvent>> {
    prop::collection::vec(prop::sample::select(POOL.to_vec()), 0..80)
        .prop_map(|codes| codes.into_iter().map(KeyEvent::new).collect())
}

fn context() -> AccessContext<Colony> {
    app::build_context(
        NavConfig::default(),
        Outputs {
            print: false,
            clipboard: false,
            raw_newlines: false,
        },
    )
    .unwrap()
}

fn range_ok(range: RangeValue) -> bool {
    let (lower, upper) = range.bounds();
    lower <= range.min() && range.min() <= range.max() && range.max() <= upper
}

// ═════════════════════════════════════════════════════════════════════════
// 1-4. Session invariants
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn session_invariants_hold(keys in keys()) {
        let mut cx = context();
        let mut colony = Colony::new();
        let prices: Vec<(&str, u32)> = colony.goods().iter().map(|g| (g.name, g.price)).collect();

        for key in keys {
            let was_active = cx.any_active();
            for dispatch in cx.frame([key], &mut colony) {
                if was_active {
                    prop_assert!(!dispatch.reaches_host());
                }
            }

            let owner = cx.focus().owner();
            let suspended: Vec<FeatureId> = cx.focus().suspended().collect();
            for id in cx.routes().active_ids() {
                prop_assert!(owner == Some(id) || suspended.contains(&id));
            }
            prop_assert_eq!(cx.any_active(), owner.is_some());
            prop_assert!(range_ok(colony.quality()));
            prop_assert!(range_ok(colony.hit_points()));
        }

        let spent: u32 = colony
            .log()
            .iter()
            .filter_map(|line| line.strip_prefix("bought "))
            .filter_map(|name| prices.iter().find(|(n, _)| *n == name).map(|(_, p)| *p))
            .sum();
        prop_assert_eq!(colony.silver() + spent, 100);
    }
}
