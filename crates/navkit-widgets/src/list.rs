#![forbid(unsafe_code)]

//! Flat-list navigation controller.
//!
//! A [`ListController`] owns one single-level menu: the items projected from
//! the host, the current index, and the active flag. Every step speaks the
//! new position through an [`Announcer`].
//!
//! # Example
//!
//! ```
//! use navkit_core::Announcer;
//! use navkit_widgets::list::{ListController, MenuItem};
//!
//! let mut announcer = Announcer::new();
//! let mut list = ListController::new();
//! list.open(
//!     vec![
//!         MenuItem::new("Apple", 1),
//!         MenuItem::new("Banana", 2).disabled("out of stock"),
//!         MenuItem::new("Cherry", 3),
//!     ],
//!     &mut announcer,
//! );
//! assert_eq!(announcer.last(), Some("Apple, 1 of 3"));
//!
//! assert_eq!(list.select_next(&mut announcer), Some(2));
//! assert_eq!(announcer.last(), Some("Cherry, 3 of 3"));
//! ```

use navkit_core::announce::{Announcer, Availability, Describe, NO_ITEMS, SpeechPriority};
use navkit_core::event::{KeyCode, KeyEvent};
use navkit_core::selection::{self, Direction};

/// A single entry in a flat menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem<A> {
    label: String,
    availability: Availability,
    detail: Option<String>,
    action: A,
}

impl<A> MenuItem<A> {
    /// Create an enabled item that yields `action` when executed.
    pub fn new(label: impl Into<String>, action: A) -> Self {
        Self {
            label: label.into(),
            availability: Availability::Enabled,
            detail: None,
            action,
        }
    }

    /// Disable the item with a spoken reason.
    #[must_use]
    pub fn disabled(mut self, reason: impl Into<String>) -> Self {
        self.availability = Availability::disabled(reason);
        self
    }

    /// Disable the item without a known reason.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.availability = Availability::unavailable();
        self
    }

    /// Set availability explicitly.
    #[must_use]
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Extra text spoken after the label (a price, a count).
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// The label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The availability.
    #[must_use]
    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    /// Whether the item can be executed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.availability.is_enabled()
    }

    /// The action executed for this item.
    #[must_use]
    pub fn action(&self) -> &A {
        &self.action
    }

    fn matches_prefix(&self, c: char) -> bool {
        self.label
            .chars()
            .next()
            .is_some_and(|first| first.to_lowercase().eq(c.to_lowercase()))
    }
}

/// What a list did with a key or command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListResponse<A> {
    /// Nothing happened; the caller may try something else.
    Ignored,
    /// The selection moved (or was re-announced).
    Moved,
    /// An enabled item was executed; the caller applies the action to the host.
    Executed(A),
    /// The selected item is disabled; its reason was announced.
    Rejected,
    /// The list closed itself (Escape).
    Closed,
}

impl<A> ListResponse<A> {
    /// Whether the event was consumed.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Navigation state for a single-level menu.
#[derive(Debug, Clone)]
pub struct ListController<A> {
    title: Option<String>,
    items: Vec<MenuItem<A>>,
    selected: usize,
    active: bool,
    close_on_execute: bool,
}

impl<A> Default for ListController<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> ListController<A> {
    /// Create an inactive, empty controller that closes after executing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            items: Vec::new(),
            selected: 0,
            active: false,
            close_on_execute: true,
        }
    }

    /// Keep the list open after executing an item.
    #[must_use]
    pub fn with_close_on_execute(mut self, close: bool) -> Self {
        self.close_on_execute = close;
        self
    }

    /// Title spoken before the first item when the list opens.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Whether this list currently owns navigation.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items, in display order.
    #[must_use]
    pub fn items(&self) -> &[MenuItem<A>] {
        &self.items
    }

    /// The current index, clamped into range; `None` for an empty list.
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        selection::clamp(self.selected, self.items.len())
    }

    /// The current item.
    #[must_use]
    pub fn selected_item(&self) -> Option<&MenuItem<A>> {
        self.selected_index().map(|i| &self.items[i])
    }

    /// Whether any item can be executed.
    #[must_use]
    pub fn has_selectable(&self) -> bool {
        self.items.iter().any(MenuItem::is_enabled)
    }

    /// Replace the items, select the first enabled one and announce it.
    ///
    /// With nothing enabled the index stays at 0 and [`has_selectable`]
    /// reports `false`.
    ///
    /// [`has_selectable`]: Self::has_selectable
    pub fn open(&mut self, items: Vec<MenuItem<A>>, announcer: &mut Announcer) {
        self.items = items;
        self.selected =
            selection::first_enabled(self.items.len(), |i| self.items[i].is_enabled()).unwrap_or(0);
        self.active = true;
        navkit_core::debug!(
            title = ?self.title,
            items = self.items.len(),
            selectable = self.has_selectable(),
            "list opened"
        );
        announcer.reset_last();
        let text = match (&self.title, self.describe_current(announcer.include_position())) {
            (Some(title), Some(item)) => format!("{title}. {item}"),
            (Some(title), None) => format!("{title}. {NO_ITEMS}"),
            (None, Some(item)) => item,
            (None, None) => NO_ITEMS.to_string(),
        };
        announcer.announce(text);
    }

    /// Swap in freshly projected items without announcing.
    ///
    /// Used when the host data changes shape while the list is open; the
    /// index is kept and clamped.
    pub fn replace_items(&mut self, items: Vec<MenuItem<A>>) {
        self.items = items;
        self.selected = self.selected_index().unwrap_or(0);
    }

    /// Clear items, index and active flag.
    pub fn close(&mut self) {
        navkit_core::debug!(title = ?self.title, "list closed");
        self.items.clear();
        self.selected = 0;
        self.active = false;
    }

    /// Move to the next enabled item, wrapping.
    ///
    /// Returns `None` when no item is enabled; the cursor then advances one
    /// plain step so the user still hears each entry and its reason.
    pub fn select_next(&mut self, announcer: &mut Announcer) -> Option<usize> {
        self.step(Direction::Forward, announcer)
    }

    /// Move to the previous enabled item, wrapping.
    pub fn select_previous(&mut self, announcer: &mut Announcer) -> Option<usize> {
        self.step(Direction::Backward, announcer)
    }

    /// Jump to the first enabled item.
    pub fn select_first(&mut self, announcer: &mut Announcer) -> Option<usize> {
        let found = selection::first_enabled(self.items.len(), |i| self.items[i].is_enabled());
        self.jump(found, announcer)
    }

    /// Jump to the last enabled item.
    pub fn select_last(&mut self, announcer: &mut Announcer) -> Option<usize> {
        let found = selection::last_enabled(self.items.len(), |i| self.items[i].is_enabled());
        self.jump(found, announcer)
    }

    /// Type-ahead: move to the next item whose label starts with `c`.
    ///
    /// Enabled matches win over disabled ones.
    pub fn jump_to_prefix(&mut self, c: char, announcer: &mut Announcer) -> Option<usize> {
        let count = self.items.len();
        let current = self.selected_index()?;
        let items = &self.items;
        let found = selection::seek_enabled(current, count, Direction::Forward, |i| {
            items[i].matches_prefix(c) && items[i].is_enabled()
        })
        .or_else(|| {
            selection::seek_enabled(current, count, Direction::Forward, |i| {
                items[i].matches_prefix(c)
            })
        });
        if let Some(index) = found {
            self.selected = index;
            self.announce_current(announcer);
        }
        found
    }

    /// Execute the current item.
    ///
    /// A disabled item announces its reason and yields
    /// [`ListResponse::Rejected`]. An enabled item yields its action and, if
    /// configured, closes the list.
    pub fn execute_selected(&mut self, announcer: &mut Announcer) -> ListResponse<A>
    where
        A: Clone,
    {
        let Some(index) = self.selected_index() else {
            announcer.announce(NO_ITEMS);
            return ListResponse::Ignored;
        };
        let item = &self.items[index];
        if let Some(reason) = item.availability.reason() {
            announcer.force(format!("{}: {reason}", item.label), SpeechPriority::Normal);
            return ListResponse::Rejected;
        }
        let action = item.action.clone();
        navkit_core::debug!(index, label = %item.label, "list item executed");
        if self.close_on_execute {
            self.close();
        }
        ListResponse::Executed(action)
    }

    /// Speak the current item again.
    pub fn announce_current(&self, announcer: &mut Announcer) {
        match self.describe_current(announcer.include_position()) {
            Some(text) => announcer.announce(text),
            None => announcer.announce(NO_ITEMS),
        };
    }

    /// The announcement text for the current item.
    #[must_use]
    pub fn describe_current(&self, include_position: bool) -> Option<String> {
        let index = self.selected_index()?;
        let item = &self.items[index];
        let mut describe = Describe::new(&item.label).availability(&item.availability);
        if let Some(detail) = &item.detail {
            describe = describe.detail(detail);
        }
        if include_position {
            describe = describe.position(index, self.items.len());
        }
        Some(describe.to_string())
    }

    /// Route a key-down event.
    ///
    /// Up/Down move, Home/End jump, Enter executes, Escape closes, printable
    /// characters jump by first letter.
    pub fn handle_key(&mut self, key: &KeyEvent, announcer: &mut Announcer) -> ListResponse<A>
    where
        A: Clone,
    {
        if !self.active || !key.is_down() {
            return ListResponse::Ignored;
        }
        match key.code {
            KeyCode::Up => {
                self.select_previous(announcer);
                ListResponse::Moved
            }
            KeyCode::Down => {
                self.select_next(announcer);
                ListResponse::Moved
            }
            KeyCode::Home => {
                self.select_first(announcer);
                ListResponse::Moved
            }
            KeyCode::End => {
                self.select_last(announcer);
                ListResponse::Moved
            }
            KeyCode::Enter => self.execute_selected(announcer),
            KeyCode::Escape => {
                self.close();
                ListResponse::Closed
            }
            _ => match key.typed_char() {
                Some(c) if !c.is_whitespace() => match self.jump_to_prefix(c, announcer) {
                    Some(_) => ListResponse::Moved,
                    None => ListResponse::Ignored,
                },
                _ => ListResponse::Ignored,
            },
        }
    }

    fn step(&mut self, direction: Direction, announcer: &mut Announcer) -> Option<usize> {
        let count = self.items.len();
        let Some(current) = self.selected_index() else {
            announcer.announce(NO_ITEMS);
            return None;
        };
        let found =
            selection::seek_enabled(current, count, direction, |i| self.items[i].is_enabled());
        self.selected = match found {
            Some(index) => index,
            None => selection::step(current, count, direction).unwrap_or(0),
        };
        self.announce_current(announcer);
        found
    }

    fn jump(&mut self, found: Option<usize>, announcer: &mut Announcer) -> Option<usize> {
        if self.items.is_empty() {
            announcer.announce(NO_ITEMS);
            return None;
        }
        if let Some(index) = found {
            self.selected = index;
        }
        self.announce_current(announcer);
        found
    }
}
