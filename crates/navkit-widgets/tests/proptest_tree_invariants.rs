//! Property-based invariant tests for the tree controller.
//!
//! 1. The projection length equals synthetic rows plus visible tree nodes.
//! 2. Toggling expansion twice restores the projection and the selection.
//! 3. The selection stays inside the projection under any key sequence.
//! 4. A category toggle leaves every descendant leaf with the same flag.
//! 5. Range slider ends never cross and never leave their bounds.
//! 6. After a cascade, toggling one leaf leaves every other leaf alone.
//! 7. Expanding a category never disturbs the rows above or below it.

use std::collections::HashMap;

use navkit_core::Announcer;
use navkit_core::error::HostResult;
use navkit_core::event::{KeyCode, KeyEvent};
use navkit_widgets::slider::{RangeEnd, RangeValue};
use navkit_widgets::tree::{FilterHost, NodeKind, TreeController, TreeNode, TreeOptions};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryHost {
    allowed: HashMap<u32, bool>,
    ranges: HashMap<u32, RangeValue>,
}

impl FilterHost<u32> for MemoryHost {
    fn is_allowed(&self, key: &u32) -> HostResult<bool> {
        Ok(self.allowed.get(key).copied().unwrap_or(false))
    }

    fn set_allowed(&mut self, key: &u32, allowed: bool) -> HostResult<()> {
        self.allowed.insert(*key, allowed);
        Ok(())
    }

    fn set_range(&mut self, key: &u32, range: RangeValue) -> HostResult<()> {
        self.ranges.insert(*key, range);
        Ok(())
    }
}

/// Random tree of depth <= 3. Keys are assigned afterwards so they are unique.
fn tree_strategy() -> impl Strategy<Value = TreeNode<u32>> {
    let leaf = any::<bool>().prop_map(|allowed| TreeNode::leaf("leaf", 0u32, allowed));
    leaf.prop_recursive(3, 32, 4, |inner| {
        (prop::collection::vec(inner, 0..4), any::<bool>()).prop_map(|(children, expanded)| {
            TreeNode::category("group", 0u32)
                .with_expanded(expanded)
                .with_children(children)
        })
    })
}

fn renumber(node: &TreeNode<u32>, next: &mut u32) -> TreeNode<u32> {
    *next += 1;
    let key = *next;
    match node.kind() {
        NodeKind::Leaf => TreeNode::leaf(format!("leaf {key}"), key, node.is_checked()),
        _ => {
            let children = node.children().iter().map(|c| renumber(c, next)).collect();
            TreeNode::category(format!("group {key}"), key)
                .with_expanded(node.is_expanded())
                .with_children(children)
        }
    }
}

fn rooted() -> impl Strategy<Value = TreeNode<u32>> {
    prop::collection::vec(tree_strategy(), 1..5).prop_map(|children| {
        let mut next = 0;
        let root = TreeNode::category("root", 0)
            .with_expanded(true)
            .with_children(children);
        renumber(&root, &mut next)
    })
}

fn key_strategy() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        Just(KeyCode::Up),
        Just(KeyCode::Down),
        Just(KeyCode::Left),
        Just(KeyCode::Right),
        Just(KeyCode::Home),
        Just(KeyCode::End),
        Just(KeyCode::Enter),
        Just(KeyCode::Char(' ')),
    ]
}

/// Move forward from the current row to the first row matching `pred`.
fn seek(
    tree: &mut TreeController<u32>,
    announcer: &mut Announcer,
    pred: impl Fn(&TreeNode<u32>) -> bool,
) -> bool {
    for _ in 0..tree.len() {
        if tree.selected_node().is_some_and(&pred) {
            return true;
        }
        tree.select_next(announcer);
    }
    tree.selected_node().is_some_and(&pred)
}

fn leaf_flags(tree: &TreeController<u32>) -> Vec<(u32, bool)> {
    tree.root()
        .map(|root| root.leaves().map(|l| (*l.key(), l.is_checked())).collect())
        .unwrap_or_default()
}

fn options() -> TreeOptions<u32> {
    TreeOptions::default()
        .leading(TreeNode::slider("range", 9000, RangeValue::new(0.0, 1.0, 0.1)))
        .trailing(TreeNode::action("Done", 9001))
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Projection length
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn projection_counts_visible_nodes(root in rooted(), show_root in any::<bool>()) {
        let visible = if show_root {
            root.visible_count()
        } else {
            root.children().iter().map(TreeNode::visible_count).sum()
        };
        let mut announcer = Announcer::new();
        let mut tree = TreeController::new();
        tree.activate(root, options().with_show_root(show_root), &mut announcer);
        prop_assert_eq!(tree.len(), visible + 2);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Expansion round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn double_toggle_is_identity(root in rooted(), moves in 0usize..40) {
        let mut announcer = Announcer::new();
        let mut tree = TreeController::new();
        tree.activate(root, options(), &mut announcer);
        for _ in 0..moves {
            tree.select_next(&mut announcer);
        }
        let before = tree.flat().to_vec();
        let selected = tree.selected_index();
        if tree.toggle_expand(&mut announcer) {
            prop_assert!(tree.toggle_expand(&mut announcer));
        }
        prop_assert_eq!(tree.flat(), &before[..]);
        prop_assert_eq!(tree.selected_index(), selected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Selection bound
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn selection_stays_in_projection(
        root in rooted(),
        keys in prop::collection::vec(key_strategy(), 0..64),
    ) {
        let mut host = MemoryHost::default();
        let mut announcer = Announcer::new();
        let mut tree = TreeController::new();
        tree.activate(root, options(), &mut announcer);
        for code in keys {
            tree.handle_key(&KeyEvent::new(code), &mut host, &mut announcer);
            if !tree.is_active() {
                break;
            }
            let index = tree.selected_index();
            prop_assert!(index.is_some_and(|i| i < tree.len()));
            prop_assert!(tree.selected_node().is_some());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Cascade
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn category_toggle_unifies_leaves(root in rooted(), moves in 0usize..40) {
        let mut host = MemoryHost::default();
        let mut announcer = Announcer::new();
        let mut tree = TreeController::new();
        tree.activate(root, options(), &mut announcer);
        for _ in 0..moves {
            tree.select_next(&mut announcer);
        }
        let is_category = tree.selected_node().map(TreeNode::kind) == Some(NodeKind::Category);
        prop_assume!(is_category);

        tree.toggle_checked(&mut host, &mut announcer);
        let node = tree.selected_node().cloned();
        prop_assert!(node.is_some());
        let node = node.unwrap_or_else(|| TreeNode::category("none", 0));
        let flags: Vec<bool> = node.leaves().map(TreeNode::is_checked).collect();
        prop_assert!(flags.windows(2).all(|w| w[0] == w[1]));
        for leaf in node.leaves() {
            prop_assert_eq!(host.allowed.get(leaf.key()).copied().unwrap_or(leaf.is_checked()), leaf.is_checked());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Range bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn range_ends_stay_ordered(
        steps in prop::collection::vec((any::<bool>(), -12i32..=12), 0..64),
    ) {
        let mut value = RangeValue::new(0.0, 1.0, 0.05);
        for (max_end, n) in steps {
            let end = if max_end { RangeEnd::Max } else { RangeEnd::Min };
            value.adjust(end, n);
            prop_assert!(value.min() <= value.max());
            prop_assert!(value.min() >= 0.0 && value.max() <= 1.0);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Leaf toggle after cascade
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn leaf_toggle_after_cascade_spares_others(root in rooted(), moves in 0usize..40) {
        let mut host = MemoryHost::default();
        let mut announcer = Announcer::new();
        let mut tree = TreeController::new();
        tree.activate(root, options().with_show_root(true), &mut announcer);
        for _ in 0..moves {
            tree.select_next(&mut announcer);
        }
        prop_assert!(seek(&mut tree, &mut announcer, |n| n.kind() == NodeKind::Category));
        tree.toggle_checked(&mut host, &mut announcer);
        if tree.selected_node().is_some_and(|n| !n.is_expanded()) {
            tree.toggle_expand(&mut announcer);
        }
        if !seek(&mut tree, &mut announcer, |n| n.kind() == NodeKind::Leaf) {
            return Ok(());
        }
        let target = tree.selected_node().map(|n| *n.key()).unwrap_or_default();
        let flags_before = leaf_flags(&tree);
        let host_before = host.allowed.clone();

        prop_assert!(tree.toggle_checked(&mut host, &mut announcer));

        for ((key, before), (after_key, after)) in flags_before.iter().zip(leaf_flags(&tree)) {
            prop_assert_eq!(*key, after_key);
            if *key == target {
                prop_assert_eq!(after, !*before);
                prop_assert_eq!(host.allowed.get(key).copied(), Some(after));
            } else {
                prop_assert_eq!(after, *before);
                prop_assert_eq!(host.allowed.get(key), host_before.get(key));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Expansion keeps surrounding rows
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn expansion_keeps_rows_above_and_below(root in rooted(), moves in 0usize..40) {
        let mut announcer = Announcer::new();
        let mut tree = TreeController::new();
        tree.activate(root, options(), &mut announcer);
        for _ in 0..moves {
            tree.select_next(&mut announcer);
        }
        let collapsed = |n: &TreeNode<u32>| n.kind() == NodeKind::Category && !n.is_expanded();
        if !seek(&mut tree, &mut announcer, collapsed) {
            return Ok(());
        }
        let index = tree.selected_index().unwrap_or_default();
        let before = tree.flat().to_vec();

        prop_assert!(tree.toggle_expand(&mut announcer));
        let after = tree.flat();
        let grown = after.len() - before.len();
        prop_assert_eq!(&after[..=index], &before[..=index]);
        prop_assert_eq!(&after[index + 1 + grown..], &before[index + 1..]);
        prop_assert_eq!(tree.selected_index(), Some(index));
    }
}
