#![forbid(unsafe_code)]

//! Hierarchical tree navigation with allow/disallow toggles.
//!
//! A [`TreeController`] walks a tree of categories and leaves through its
//! flattened, visible projection: a collapsed category hides its subtree,
//! and the projection is rebuilt after every expand, collapse or toggle.
//! Synthetic nodes can be placed before the tree (range sliders) and after
//! it (a confirm action).
//!
//! Leaf toggles are written through a [`FilterHost`]. The node's cached flag
//! changes only when the host write succeeds; a failed write is logged and
//! announced as "not available".
//!
//! ```text
//! Hit points, 0% to 100%, 1 of 5     <- leading slider
//! Foods (Partially allowed), expanded, 2 of 5
//!   Rice (Allowed), 3 of 5
//!   Corn (Disallowed), 4 of 5
//! Done, 5 of 5                       <- trailing action
//! ```

use navkit_core::announce::{Announcer, CheckState, Describe, Expansion, NO_ITEMS};
use navkit_core::error::{HostError, HostResult};
use navkit_core::event::{KeyCode, KeyEvent};
use navkit_core::selection;

use crate::slider::{RangeEditor, RangeResponse, RangeValue};

/// Writes filter changes back to the host.
///
/// `K` is the host's opaque key for the thing a node stands for.
pub trait FilterHost<K> {
    /// Read whether `key` is currently allowed.
    fn is_allowed(&self, key: &K) -> HostResult<bool>;

    /// Allow or disallow `key`.
    fn set_allowed(&mut self, key: &K, allowed: bool) -> HostResult<()>;

    /// Store a range slider's value.
    fn set_range(&mut self, key: &K, range: RangeValue) -> HostResult<()> {
        let _ = (key, range);
        Err(HostError::missing("set_range"))
    }
}

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Groups children; can expand and collapse; toggling cascades.
    Category,
    /// A single allow/disallow checkbox.
    Leaf,
    /// A button; activating it hands its key to the caller.
    Action,
    /// A two-ended range; activating it enters range editing.
    Slider,
}

/// A node in the navigation tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<K> {
    kind: NodeKind,
    label: String,
    key: K,
    expanded: bool,
    checked: bool,
    range: Option<RangeValue>,
    children: Vec<TreeNode<K>>,
}

impl<K> TreeNode<K> {
    fn with_kind(kind: NodeKind, label: impl Into<String>, key: K) -> Self {
        Self {
            kind,
            label: label.into(),
            key,
            expanded: false,
            checked: false,
            range: None,
            children: Vec::new(),
        }
    }

    /// A collapsed category.
    pub fn category(label: impl Into<String>, key: K) -> Self {
        Self::with_kind(NodeKind::Category, label, key)
    }

    /// A leaf with its current allow flag.
    pub fn leaf(label: impl Into<String>, key: K, allowed: bool) -> Self {
        let mut node = Self::with_kind(NodeKind::Leaf, label, key);
        node.checked = allowed;
        node
    }

    /// An action button.
    pub fn action(label: impl Into<String>, key: K) -> Self {
        Self::with_kind(NodeKind::Action, label, key)
    }

    /// A range slider.
    pub fn slider(label: impl Into<String>, key: K, range: RangeValue) -> Self {
        let mut node = Self::with_kind(NodeKind::Slider, label, key);
        node.range = Some(range);
        node
    }

    /// Add a child node.
    #[must_use]
    pub fn child(mut self, node: TreeNode<K>) -> Self {
        self.children.push(node);
        self
    }

    /// Set children from a vec.
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<TreeNode<K>>) -> Self {
        self.children = nodes;
        self
    }

    /// Set whether this node is expanded.
    #[must_use]
    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    /// The node kind.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The host key.
    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The children.
    #[must_use]
    pub fn children(&self) -> &[TreeNode<K>] {
        &self.children
    }

    /// Whether this node is an expanded category.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.kind == NodeKind::Category && self.expanded
    }

    /// Cached allow flag of a leaf.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Current value of a slider.
    #[must_use]
    pub fn range(&self) -> Option<RangeValue> {
        self.range
    }

    /// Allow state of this node.
    ///
    /// Leaves report their own flag; categories aggregate every descendant
    /// leaf and report `None` when they have none. Actions and sliders have
    /// no check state.
    #[must_use]
    pub fn check_state(&self) -> Option<CheckState> {
        match self.kind {
            NodeKind::Leaf => Some(CheckState::from_flag(self.checked)),
            NodeKind::Category => CheckState::aggregate(self.leaves().map(|leaf| {
                CheckState::from_flag(leaf.checked)
            })),
            NodeKind::Action | NodeKind::Slider => None,
        }
    }

    /// Count this node and every node visible beneath it.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        let mut count = 1;
        if self.is_expanded() {
            for child in &self.children {
                count += child.visible_count();
            }
        }
        count
    }

    /// Every descendant leaf, depth first.
    pub fn leaves(&self) -> impl Iterator<Item = &TreeNode<K>> {
        let mut stack: Vec<&TreeNode<K>> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            while let Some(node) = stack.pop() {
                stack.extend(node.children.iter().rev());
                if node.kind == NodeKind::Leaf {
                    return Some(node);
                }
            }
            None
        })
    }

    fn for_each_leaf_mut(&mut self, f: &mut impl FnMut(&mut TreeNode<K>)) {
        for child in &mut self.children {
            if child.kind == NodeKind::Leaf {
                f(child);
            }
            child.for_each_leaf_mut(f);
        }
    }

    fn describe(&self, index: usize, count: usize, include_position: bool) -> String {
        let detail = self.range.map(|range| range.to_string());
        let mut describe = Describe::new(&self.label);
        if let Some(state) = self.check_state() {
            describe = describe.check(state);
        }
        if self.kind == NodeKind::Category {
            describe = describe.expansion(Expansion::from_flag(self.expanded));
        }
        if let Some(detail) = &detail {
            describe = describe.detail(detail);
        }
        if include_position {
            describe = describe.position(index, count);
        }
        describe.to_string()
    }
}

/// Where a flattened entry lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeRef {
    /// The `i`th node placed before the tree.
    Leading(usize),
    /// A tree node, by child indices from the root (`[]` is the root).
    Tree(Vec<usize>),
    /// The `i`th node placed after the tree.
    Trailing(usize),
}

/// One row of the visible projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry {
    /// The node this row shows.
    pub node: NodeRef,
    /// Indent level.
    pub depth: usize,
}

/// How a tree is presented.
#[derive(Debug, Clone)]
pub struct TreeOptions<K> {
    /// Show the root as its own row.
    pub show_root: bool,
    /// Synthetic nodes before the tree.
    pub leading: Vec<TreeNode<K>>,
    /// Synthetic nodes after the tree.
    pub trailing: Vec<TreeNode<K>>,
}

impl<K> Default for TreeOptions<K> {
    fn default() -> Self {
        Self {
            show_root: false,
            leading: Vec::new(),
            trailing: Vec::new(),
        }
    }
}

impl<K> TreeOptions<K> {
    /// Show or hide the root row.
    #[must_use]
    pub fn with_show_root(mut self, show: bool) -> Self {
        self.show_root = show;
        self
    }

    /// Add a synthetic node before the tree.
    #[must_use]
    pub fn leading(mut self, node: TreeNode<K>) -> Self {
        self.leading.push(node);
        self
    }

    /// Add a synthetic node after the tree.
    #[must_use]
    pub fn trailing(mut self, node: TreeNode<K>) -> Self {
        self.trailing.push(node);
        self
    }
}

/// What a tree did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeResponse<K> {
    /// The key has no meaning for the tree.
    Ignored,
    /// Navigation, toggling or range editing happened.
    Handled,
    /// An action node was activated; the caller performs it.
    Activated(K),
    /// The tree closed itself (Escape).
    Closed,
}

impl<K> TreeResponse<K> {
    /// Whether the event was consumed.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Navigation state over a tree and its synthetic rows.
#[derive(Debug, Clone)]
pub struct TreeController<K> {
    root: Option<TreeNode<K>>,
    leading: Vec<TreeNode<K>>,
    trailing: Vec<TreeNode<K>>,
    show_root: bool,
    flat: Vec<FlatEntry>,
    selected: usize,
    active: bool,
    editor: Option<RangeEditor>,
}

impl<K> Default for TreeController<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TreeController<K> {
    /// Create an inactive controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: None,
            leading: Vec::new(),
            trailing: Vec::new(),
            show_root: false,
            flat: Vec::new(),
            selected: 0,
            active: false,
            editor: None,
        }
    }

    /// Take ownership of `root`, build the projection, select the first row
    /// and announce it.
    pub fn activate(&mut self, root: TreeNode<K>, options: TreeOptions<K>, announcer: &mut Announcer) {
        self.root = Some(root);
        self.leading = options.leading;
        self.trailing = options.trailing;
        self.show_root = options.show_root;
        self.selected = 0;
        self.editor = None;
        self.active = true;
        self.rebuild();
        navkit_core::debug!(rows = self.flat.len(), "tree activated");
        announcer.reset_last();
        self.announce_current(announcer);
    }

    /// Drop the tree and deactivate.
    pub fn close(&mut self) {
        navkit_core::debug!("tree closed");
        self.root = None;
        self.leading.clear();
        self.trailing.clear();
        self.flat.clear();
        self.selected = 0;
        self.editor = None;
        self.active = false;
    }

    /// Whether the tree owns navigation.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a slider is being edited.
    #[must_use]
    pub fn is_editing_range(&self) -> bool {
        self.editor.is_some()
    }

    /// The range editor, while editing.
    #[must_use]
    pub fn range_editor(&self) -> Option<&RangeEditor> {
        self.editor.as_ref()
    }

    /// Number of visible rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flat.len()
    }

    /// Whether there are no visible rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// The visible projection.
    #[must_use]
    pub fn flat(&self) -> &[FlatEntry] {
        &self.flat
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> Option<&TreeNode<K>> {
        self.root.as_ref()
    }

    /// The current row index, clamped.
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        selection::clamp(self.selected, self.flat.len())
    }

    /// The current row's node.
    #[must_use]
    pub fn selected_node(&self) -> Option<&TreeNode<K>> {
        let index = self.selected_index()?;
        self.node(&self.flat[index].node)
    }

    /// Resolve a node reference.
    #[must_use]
    pub fn node(&self, node: &NodeRef) -> Option<&TreeNode<K>> {
        match node {
            NodeRef::Leading(i) => self.leading.get(*i),
            NodeRef::Trailing(i) => self.trailing.get(*i),
            NodeRef::Tree(path) => {
                let mut current = self.root.as_ref()?;
                for &idx in path {
                    current = current.children.get(idx)?;
                }
                Some(current)
            }
        }
    }

    fn node_mut(&mut self, node: &NodeRef) -> Option<&mut TreeNode<K>> {
        match node {
            NodeRef::Leading(i) => self.leading.get_mut(*i),
            NodeRef::Trailing(i) => self.trailing.get_mut(*i),
            NodeRef::Tree(path) => {
                let mut current = self.root.as_mut()?;
                for &idx in path {
                    current = current.children.get_mut(idx)?;
                }
                Some(current)
            }
        }
    }

    fn selected_ref(&self) -> Option<NodeRef> {
        self.selected_index().map(|i| self.flat[i].node.clone())
    }

    /// Move to the next row, wrapping.
    pub fn select_next(&mut self, announcer: &mut Announcer) -> Option<usize> {
        let next = selection::wrap_next(self.selected, self.flat.len());
        self.move_to(next, announcer)
    }

    /// Move to the previous row, wrapping.
    pub fn select_previous(&mut self, announcer: &mut Announcer) -> Option<usize> {
        let previous = selection::wrap_previous(self.selected, self.flat.len());
        self.move_to(previous, announcer)
    }

    /// Move to the first row.
    pub fn select_first(&mut self, announcer: &mut Announcer) -> Option<usize> {
        let first = selection::clamp(0, self.flat.len());
        self.move_to(first, announcer)
    }

    /// Move to the last row.
    pub fn select_last(&mut self, announcer: &mut Announcer) -> Option<usize> {
        let last = self.flat.len().checked_sub(1);
        self.move_to(last, announcer)
    }

    /// Expand or collapse the selected category and re-announce it.
    ///
    /// Other node kinds are left alone. Returns whether anything changed.
    pub fn toggle_expand(&mut self, announcer: &mut Announcer) -> bool {
        let Some(selected) = self.selected_ref() else {
            return false;
        };
        let Some(node) = self.node_mut(&selected) else {
            return false;
        };
        if node.kind != NodeKind::Category {
            return false;
        }
        node.expanded = !node.expanded;
        navkit_core::debug!(label = %node.label, expanded = node.expanded, "category toggled");
        self.rebuild_keeping(&selected);
        self.announce_current(announcer);
        true
    }

    /// Speak the selected row.
    pub fn announce_current(&self, announcer: &mut Announcer) {
        match self.describe_current(announcer.include_position()) {
            Some(text) => announcer.announce(text),
            None => announcer.announce(NO_ITEMS),
        };
    }

    /// Announcement text for the selected row.
    #[must_use]
    pub fn describe_current(&self, include_position: bool) -> Option<String> {
        let index = self.selected_index()?;
        let node = self.node(&self.flat[index].node)?;
        Some(node.describe(index, self.flat.len(), include_position))
    }

    /// Re-read every leaf's allow flag from the host.
    ///
    /// Leaves whose read fails keep their cached flag. Returns the number of
    /// failed reads.
    pub fn refresh<H: FilterHost<K> + ?Sized>(&mut self, host: &H) -> usize {
        let mut failures = 0;
        let mut sync = |leaf: &mut TreeNode<K>| match host.is_allowed(&leaf.key) {
            Ok(allowed) => leaf.checked = allowed,
            Err(err) => {
                navkit_core::warn!(label = %leaf.label, error = %err, "leaf refresh failed");
                failures += 1;
            }
        };
        if let Some(root) = self.root.as_mut() {
            if root.kind == NodeKind::Leaf {
                sync(root);
            }
            root.for_each_leaf_mut(&mut sync);
        }
        failures
    }

    /// Flip the allow flag of the selected leaf, or cascade over a category.
    ///
    /// A category is set to "disallow" when every descendant leaf is allowed
    /// and to "allow" otherwise. Failed host writes leave the cached flag
    /// untouched and announce "<label> not available". Actions and sliders
    /// are left alone. Returns whether any flag changed.
    pub fn toggle_checked<H: FilterHost<K> + ?Sized>(
        &mut self,
        host: &mut H,
        announcer: &mut Announcer,
    ) -> bool {
        let Some(selected) = self.selected_ref() else {
            return false;
        };
        let Some(node) = self.node_mut(&selected) else {
            return false;
        };
        let (changed, failed) = match node.kind {
            NodeKind::Leaf => {
                let target = !node.checked;
                match host.set_allowed(&node.key, target) {
                    Ok(()) => {
                        node.checked = target;
                        (1, 0)
                    }
                    Err(err) => {
                        navkit_core::warn!(label = %node.label, error = %err, "allow toggle failed");
                        (0, 1)
                    }
                }
            }
            NodeKind::Category => {
                let target = node.check_state() != Some(CheckState::Allowed);
                let mut changed = 0;
                let mut failed = 0;
                node.for_each_leaf_mut(&mut |leaf: &mut TreeNode<K>| {
                    if leaf.checked == target {
                        return;
                    }
                    match host.set_allowed(&leaf.key, target) {
                        Ok(()) => {
                            leaf.checked = target;
                            changed += 1;
                        }
                        Err(err) => {
                            navkit_core::warn!(label = %leaf.label, error = %err, "cascade write failed");
                            failed += 1;
                        }
                    }
                });
                navkit_core::debug!(label = %node.label, allowed = target, changed, failed, "category cascade");
                (changed, failed)
            }
            NodeKind::Action | NodeKind::Slider => return false,
        };
        if failed > 0 {
            let label = node.label.clone();
            announcer.announce(format!("{label} not available"));
        } else {
            self.rebuild_keeping(&selected);
            self.announce_current(announcer);
        }
        changed > 0
    }

    /// Enter range editing on the selected slider.
    pub fn enter_range(&mut self, announcer: &mut Announcer) -> bool {
        let Some(node) = self.selected_node() else {
            return false;
        };
        let Some(range) = node.range.filter(|_| node.kind == NodeKind::Slider) else {
            return false;
        };
        let editor = RangeEditor::new(range);
        announcer.announce(editor.describe_entry(&node.label));
        self.editor = Some(editor);
        true
    }

    /// Expand the selected category, or step into its first child when it
    /// is already expanded.
    pub fn expand_or_enter(&mut self, announcer: &mut Announcer) -> bool {
        let Some(node) = self.selected_node() else {
            return false;
        };
        if node.kind != NodeKind::Category {
            return false;
        }
        if !node.expanded {
            return self.toggle_expand(announcer);
        }
        if node.children.is_empty() {
            return false;
        }
        self.move_to(self.selected_index().map(|i| i + 1), announcer);
        true
    }

    /// Collapse the selected category, or step out to the parent row.
    pub fn collapse_or_leave(&mut self, announcer: &mut Announcer) -> bool {
        let Some(selected) = self.selected_ref() else {
            return false;
        };
        if self.node(&selected).is_some_and(TreeNode::is_expanded) {
            return self.toggle_expand(announcer);
        }
        let NodeRef::Tree(path) = &selected else {
            return false;
        };
        let Some((_, parent)) = path.split_last() else {
            return false;
        };
        let parent = NodeRef::Tree(parent.to_vec());
        match self.flat.iter().position(|entry| entry.node == parent) {
            Some(index) => {
                self.move_to(Some(index), announcer);
                true
            }
            None => false,
        }
    }

    /// Route a key-down event.
    ///
    /// While a slider is being edited every key goes to the range editor.
    pub fn handle_key<H: FilterHost<K> + ?Sized>(
        &mut self,
        key: &KeyEvent,
        host: &mut H,
        announcer: &mut Announcer,
    ) -> TreeResponse<K>
    where
        K: Clone,
    {
        if !self.active || !key.is_down() {
            return TreeResponse::Ignored;
        }
        if let Some(editor) = self.editor.as_mut() {
            match editor.handle_key(key, announcer) {
                RangeResponse::Commit(value) => self.commit_range(value, host, announcer),
                RangeResponse::Cancel(_) => {
                    self.editor = None;
                    announcer.reset_last();
                    self.announce_current(announcer);
                }
                RangeResponse::Adjusted | RangeResponse::Ignored => {}
            }
            return TreeResponse::Handled;
        }
        let handled = match key.code {
            KeyCode::Up => self.select_previous(announcer).is_some(),
            KeyCode::Down => self.select_next(announcer).is_some(),
            KeyCode::Home => self.select_first(announcer).is_some(),
            KeyCode::End => self.select_last(announcer).is_some(),
            KeyCode::Right => self.expand_or_enter(announcer),
            KeyCode::Left => self.collapse_or_leave(announcer),
            KeyCode::Char(' ') => {
                self.toggle_checked(host, announcer);
                true
            }
            KeyCode::Enter => {
                let Some(node) = self.selected_node() else {
                    return TreeResponse::Ignored;
                };
                match node.kind {
                    NodeKind::Category => self.toggle_expand(announcer),
                    NodeKind::Leaf => {
                        self.toggle_checked(host, announcer);
                        true
                    }
                    NodeKind::Slider => self.enter_range(announcer),
                    NodeKind::Action => {
                        let key = node.key.clone();
                        navkit_core::debug!(label = %node.label, "tree action activated");
                        return TreeResponse::Activated(key);
                    }
                }
            }
            KeyCode::Escape => {
                self.close();
                return TreeResponse::Closed;
            }
            _ => false,
        };
        if handled {
            TreeResponse::Handled
        } else {
            TreeResponse::Ignored
        }
    }

    fn commit_range<H: FilterHost<K> + ?Sized>(
        &mut self,
        value: RangeValue,
        host: &mut H,
        announcer: &mut Announcer,
    ) {
        self.editor = None;
        let Some(selected) = self.selected_ref() else {
            return;
        };
        let Some(node) = self.node_mut(&selected) else {
            return;
        };
        match host.set_range(&node.key, value) {
            Ok(()) => {
                node.range = Some(value);
                announcer.reset_last();
                self.announce_current(announcer);
            }
            Err(err) => {
                navkit_core::warn!(label = %node.label, error = %err, "range write failed");
                let label = node.label.clone();
                announcer.announce(format!("{label} not available"));
            }
        }
    }

    fn move_to(&mut self, index: Option<usize>, announcer: &mut Announcer) -> Option<usize> {
        match index {
            Some(index) => {
                self.selected = index;
                self.announce_current(announcer);
                Some(index)
            }
            None => {
                announcer.announce(NO_ITEMS);
                None
            }
        }
    }

    fn rebuild_keeping(&mut self, keep: &NodeRef) {
        self.rebuild();
        if let Some(index) = self.flat.iter().position(|entry| &entry.node == keep) {
            self.selected = index;
        }
    }

    fn rebuild(&mut self) {
        let mut flat = Vec::with_capacity(self.flat.len());
        for i in 0..self.leading.len() {
            flat.push(FlatEntry {
                node: NodeRef::Leading(i),
                depth: 0,
            });
        }
        if let Some(root) = &self.root {
            let mut path = Vec::new();
            if self.show_root {
                flatten_visible(root, 0, &mut path, &mut flat);
            } else {
                for (i, child) in root.children.iter().enumerate() {
                    path.push(i);
                    flatten_visible(child, 0, &mut path, &mut flat);
                    path.pop();
                }
            }
        }
        for i in 0..self.trailing.len() {
            flat.push(FlatEntry {
                node: NodeRef::Trailing(i),
                depth: 0,
            });
        }
        self.flat = flat;
        self.selected = selection::clamp(self.selected, self.flat.len()).unwrap_or(0);
    }
}

fn flatten_visible<K>(
    node: &TreeNode<K>,
    depth: usize,
    path: &mut Vec<usize>,
    out: &mut Vec<FlatEntry>,
) {
    out.push(FlatEntry {
        node: NodeRef::Tree(path.clone()),
        depth,
    });
    if node.is_expanded() {
        for (i, child) in node.children.iter().enumerate() {
            path.push(i);
            flatten_visible(child, depth + 1, path, out);
            path.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slider::ValueFormat;
    use std::collections::{HashMap, HashSet};

    #[derive(Default)]
    struct Stockpile {
        allowed: HashMap<&'static str, bool>,
        broken: HashSet<&'static str>,
        ranges: HashMap<&'static str, RangeValue>,
        writes: usize,
    }

    impl FilterHost<&'static str> for Stockpile {
        fn is_allowed(&self, key: &&'static str) -> HostResult<bool> {
            if self.broken.contains(key) {
                return Err(HostError::missing("allowedDefs"));
            }
            Ok(self.allowed.get(key).copied().unwrap_or(false))
        }

        fn set_allowed(&mut self, key: &&'static str, allowed: bool) -> HostResult<()> {
            if self.broken.contains(key) {
                return Err(HostError::missing("allowedDefs"));
            }
            self.writes += 1;
            self.allowed.insert(*key, allowed);
            Ok(())
        }

        fn set_range(&mut self, key: &&'static str, range: RangeValue) -> HostResult<()> {
            self.writes += 1;
            self.ranges.insert(*key, range);
            Ok(())
        }
    }

    // Root{ A(expanded){a1, a2}, B(collapsed){b1} }
    fn sample() -> TreeNode<&'static str> {
        TreeNode::category("Root", "root")
            .with_expanded(true)
            .child(
                TreeNode::category("A", "a")
                    .with_expanded(true)
                    .child(TreeNode::leaf("a1", "a1", true))
                    .child(TreeNode::leaf("a2", "a2", false)),
            )
            .child(TreeNode::category("B", "b").child(TreeNode::leaf("b1", "b1", true)))
    }

    fn activate(
        root: TreeNode<&'static str>,
        options: TreeOptions<&'static str>,
    ) -> (TreeController<&'static str>, Announcer) {
        let mut announcer = Announcer::new();
        let mut tree = TreeController::new();
        tree.activate(root, options, &mut announcer);
        (tree, announcer)
    }

    fn labels(tree: &TreeController<&'static str>) -> Vec<String> {
        tree.flat()
            .iter()
            .filter_map(|entry| tree.node(&entry.node))
            .map(|node| node.label().to_string())
            .collect()
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code)
    }

    #[test]
    fn hidden_root_projection() {
        let (tree, announcer) = activate(sample(), TreeOptions::default());
        assert_eq!(labels(&tree), ["A", "a1", "a2", "B"]);
        assert_eq!(tree.flat()[1].depth, 1);
        assert_eq!(
            announcer.last(),
            Some("A (Partially allowed), expanded, 1 of 4")
        );
    }

    #[test]
    fn shown_root_projection() {
        let (tree, _) = activate(sample(), TreeOptions::default().with_show_root(true));
        assert_eq!(labels(&tree), ["Root", "A", "a1", "a2", "B"]);
        assert_eq!(tree.flat()[0].node, NodeRef::Tree(Vec::new()));
        assert_eq!(tree.flat()[2].depth, 2);
    }

    #[test]
    fn synthetic_rows_wrap_the_tree() {
        let options = TreeOptions::default()
            .leading(TreeNode::slider("Hit points", "hp", RangeValue::new(0.0, 1.0, 0.05)))
            .trailing(TreeNode::action("Done", "done"));
        let (tree, _) = activate(sample(), options);
        assert_eq!(labels(&tree), ["Hit points", "A", "a1", "a2", "B", "Done"]);
        assert_eq!(tree.len(), sample().visible_count() - 1 + 2);
    }

    #[test]
    fn expand_and_collapse_change_length() {
        let (mut tree, mut announcer) = activate(sample(), TreeOptions::default());
        tree.select_last(&mut announcer);
        assert_eq!(announcer.last(), Some("B (Allowed), collapsed, 4 of 4"));

        assert!(tree.toggle_expand(&mut announcer));
        assert_eq!(tree.len(), 5);
        assert_eq!(announcer.last(), Some("B (Allowed), expanded, 4 of 5"));

        tree.select_first(&mut announcer);
        assert!(tree.toggle_expand(&mut announcer));
        assert_eq!(labels(&tree), ["A", "B", "b1"]);
        assert_eq!(tree.selected_index(), Some(0));
    }

    #[test]
    fn toggle_expand_ignores_leaves() {
        let (mut tree, mut announcer) = activate(sample(), TreeOptions::default());
        tree.select_next(&mut announcer);
        assert!(!tree.toggle_expand(&mut announcer));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn navigation_wraps() {
        let (mut tree, mut announcer) = activate(sample(), TreeOptions::default());
        assert_eq!(tree.select_previous(&mut announcer), Some(3));
        assert_eq!(tree.select_next(&mut announcer), Some(0));
    }

    #[test]
    fn leaf_toggle_writes_host() {
        let mut host = Stockpile::default();
        let (mut tree, mut announcer) = activate(sample(), TreeOptions::default());
        tree.select_next(&mut announcer);
        assert_eq!(announcer.last(), Some("a1 (Allowed), 2 of 4"));
        assert!(tree.toggle_checked(&mut host, &mut announcer));
        assert_eq!(host.allowed.get("a1"), Some(&false));
        assert_eq!(announcer.last(), Some("a1 (Disallowed), 2 of 4"));
    }

    #[test]
    fn category_cascade_allows_then_disallows() {
        let mut host = Stockpile::default();
        let (mut tree, mut announcer) = activate(sample(), TreeOptions::default());

        // A is partial: the first toggle allows everything beneath it.
        assert!(tree.toggle_checked(&mut host, &mut announcer));
        assert_eq!(host.allowed.get("a2"), Some(&true));
        assert_eq!(host.writes, 1);
        assert_eq!(announcer.last(), Some("A (Allowed), expanded, 1 of 4"));

        assert!(tree.toggle_checked(&mut host, &mut announcer));
        assert_eq!(host.allowed.get("a1"), Some(&false));
        assert_eq!(host.allowed.get("a2"), Some(&false));
        assert_eq!(announcer.last(), Some("A (Disallowed), expanded, 1 of 4"));
    }

    #[test]
    fn leaf_toggle_after_cascade_spares_siblings() {
        let mut host = Stockpile::default();
        let (mut tree, mut announcer) = activate(sample(), TreeOptions::default());
        tree.toggle_checked(&mut host, &mut announcer);
        assert_eq!(host.writes, 1);

        tree.select_next(&mut announcer);
        tree.select_next(&mut announcer);
        assert!(tree.toggle_checked(&mut host, &mut announcer));
        assert_eq!(announcer.last(), Some("a2 (Disallowed), 3 of 4"));
        assert_eq!(host.allowed.get("a1"), None);
        assert_eq!(host.allowed.get("b1"), None);
        assert_eq!(host.writes, 2);

        let root = tree.root().unwrap();
        let flags: Vec<(&str, bool)> = root.leaves().map(|l| (*l.key(), l.is_checked())).collect();
        assert_eq!(flags, [("a1", true), ("a2", false), ("b1", true)]);
    }

    #[test]
    fn expanding_a_category_keeps_earlier_rows() {
        let (mut tree, mut announcer) = activate(sample(), TreeOptions::default());
        let before = tree.flat().to_vec();
        tree.select_last(&mut announcer);
        assert!(tree.toggle_expand(&mut announcer));
        assert_eq!(&tree.flat()[..4], &before[..]);
        assert_eq!(labels(&tree), ["A", "a1", "a2", "B", "b1"]);
    }

    #[test]
    fn cascade_reaches_collapsed_descendants() {
        let mut host = Stockpile::default();
        let (mut tree, mut announcer) = activate(sample(), TreeOptions::default());
        tree.select_last(&mut announcer);
        tree.toggle_checked(&mut host, &mut announcer);
        assert_eq!(host.allowed.get("b1"), Some(&false));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn failed_write_keeps_cache_and_announces() {
        let mut host = Stockpile::default();
        host.broken.insert("a1");
        let (mut tree, mut announcer) = activate(sample(), TreeOptions::default());
        tree.select_next(&mut announcer);
        assert!(!tree.toggle_checked(&mut host, &mut announcer));
        assert!(tree.selected_node().is_some_and(TreeNode::is_checked));
        assert_eq!(announcer.last(), Some("a1 not available"));
    }

    #[test]
    fn refresh_reads_host_flags() {
        let mut host = Stockpile::default();
        host.allowed.insert("a2", true);
        host.broken.insert("b1");
        let (mut tree, mut announcer) = activate(sample(), TreeOptions::default());
        assert_eq!(tree.refresh(&host), 1);
        assert_eq!(
            tree.describe_current(true).as_deref(),
            Some("A (Partially allowed), expanded, 1 of 4")
        );
        tree.select_next(&mut announcer);
        tree.select_next(&mut announcer);
        assert_eq!(announcer.last(), Some("a2 (Allowed), 3 of 4"));
    }

    #[test]
    fn right_and_left_walk_the_hierarchy() {
        let mut host = Stockpile::default();
        let (mut tree, mut announcer) = activate(sample(), TreeOptions::default());
        tree.handle_key(&press(KeyCode::Right), &mut host, &mut announcer);
        assert_eq!(tree.selected_index(), Some(1));
        tree.handle_key(&press(KeyCode::Left), &mut host, &mut announcer);
        assert_eq!(tree.selected_index(), Some(0));
        tree.handle_key(&press(KeyCode::Left), &mut host, &mut announcer);
        assert_eq!(tree.len(), 2);
        tree.handle_key(&press(KeyCode::Right), &mut host, &mut announcer);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn enter_dispatches_by_kind() {
        let mut host = Stockpile::default();
        let options = TreeOptions::default().trailing(TreeNode::action("Done", "done"));
        let (mut tree, mut announcer) = activate(sample(), options);

        assert_eq!(
            tree.handle_key(&press(KeyCode::Enter), &mut host, &mut announcer),
            TreeResponse::Handled
        );
        assert_eq!(labels(&tree), ["A", "B", "Done"]);

        tree.select_last(&mut announcer);
        assert_eq!(
            tree.handle_key(&press(KeyCode::Enter), &mut host, &mut announcer),
            TreeResponse::Activated("done")
        );
        assert_eq!(
            tree.handle_key(&press(KeyCode::Escape), &mut host, &mut announcer),
            TreeResponse::Closed
        );
        assert!(!tree.is_active());
    }

    #[test]
    fn slider_commit_writes_host() {
        let mut host = Stockpile::default();
        let range = RangeValue::new(0.0, 1.0, 0.05).with_format(ValueFormat::Percent);
        let options = TreeOptions::default().leading(TreeNode::slider("Hit points", "hp", range));
        let (mut tree, mut announcer) = activate(sample(), options);
        assert_eq!(announcer.last(), Some("Hit points, 0% to 100%, 1 of 5"));

        tree.handle_key(&press(KeyCode::Enter), &mut host, &mut announcer);
        assert!(tree.is_editing_range());
        tree.handle_key(&press(KeyCode::Right), &mut host, &mut announcer);
        // Down switches ends inside the editor instead of moving the row.
        tree.handle_key(&press(KeyCode::Down), &mut host, &mut announcer);
        assert_eq!(tree.selected_index(), Some(0));
        tree.handle_key(&press(KeyCode::Enter), &mut host, &mut announcer);

        assert!(!tree.is_editing_range());
        let stored = host.ranges.get("hp").copied();
        assert!(stored.is_some_and(|r| (r.min() - 0.05).abs() < 1e-9));
        assert_eq!(announcer.last(), Some("Hit points, 5% to 100%, 1 of 5"));
    }

    #[test]
    fn slider_escape_restores_without_writing() {
        let mut host = Stockpile::default();
        let range = RangeValue::new(0.0, 10.0, 1.0);
        let options = TreeOptions::default().leading(TreeNode::slider("Quality", "q", range));
        let (mut tree, mut announcer) = activate(sample(), options);

        tree.handle_key(&press(KeyCode::Enter), &mut host, &mut announcer);
        tree.handle_key(&press(KeyCode::Right), &mut host, &mut announcer);
        tree.handle_key(&press(KeyCode::Escape), &mut host, &mut announcer);

        assert!(!tree.is_editing_range());
        assert!(tree.is_active());
        assert_eq!(host.writes, 0);
        assert_eq!(tree.selected_node().and_then(TreeNode::range), Some(range));
        assert_eq!(announcer.last(), Some("Quality, 0 to 10, 1 of 5"));
    }

    #[test]
    fn slider_without_host_support_is_not_available() {
        struct ReadOnly;
        impl FilterHost<&'static str> for ReadOnly {
            fn is_allowed(&self, _: &&'static str) -> HostResult<bool> {
                Ok(true)
            }
            fn set_allowed(&mut self, _: &&'static str, _: bool) -> HostResult<()> {
                Ok(())
            }
        }
        let range = RangeValue::new(0.0, 10.0, 1.0);
        let options = TreeOptions::default().leading(TreeNode::slider("Quality", "q", range));
        let (mut tree, mut announcer) = activate(sample(), options);
        let mut host = ReadOnly;
        tree.handle_key(&press(KeyCode::Enter), &mut host, &mut announcer);
        tree.handle_key(&press(KeyCode::Right), &mut host, &mut announcer);
        tree.handle_key(&press(KeyCode::Enter), &mut host, &mut announcer);
        assert_eq!(announcer.last(), Some("Quality not available"));
        assert_eq!(tree.selected_node().and_then(TreeNode::range), Some(range));
    }

    #[test]
    fn empty_tree_announces_no_items() {
        let (mut tree, mut announcer) =
            activate(TreeNode::category("Root", "root"), TreeOptions::default());
        assert!(tree.is_empty());
        assert_eq!(announcer.last(), Some(NO_ITEMS));
        assert_eq!(tree.select_next(&mut announcer), None);
        assert!(!tree.toggle_expand(&mut announcer));
    }

    #[test]
    fn leaves_iterates_depth_first() {
        let root = sample();
        let keys: Vec<_> = root.leaves().map(|leaf| *leaf.key()).collect();
        assert_eq!(keys, ["a1", "a2", "b1"]);
        assert_eq!(root.check_state(), Some(CheckState::Partial));
        assert_eq!(TreeNode::<()>::category("Empty", ()).check_state(), None);
    }
}
