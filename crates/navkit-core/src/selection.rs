#![forbid(unsafe_code)]

//! Selection-index laws shared by every navigable list.
//!
//! A selection is a plain index paired with a count. Two adjustment laws
//! apply everywhere:
//!
//! ```text
//! next(i, n)     = (i + 1) mod n
//! previous(i, n) = (i - 1 + n) mod n
//! ```
//!
//! When items can be disabled, [`seek_enabled`] probes at most `n` positions
//! and reports `None` ("no valid selection") instead of looping. An empty
//! list (`n == 0`) has no selection at all.
//!
//! # Example
//!
//! ```
//! use navkit_core::selection::{Direction, seek_enabled, wrap_next};
//!
//! assert_eq!(wrap_next(2, 3), Some(0));
//!
//! let disabled = [false, true, false];
//! let next = seek_enabled(0, 3, Direction::Forward, |i| !disabled[i]);
//! assert_eq!(next, Some(2));
//! ```

/// Direction of a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward higher indices (wrapping to 0).
    Forward,
    /// Toward lower indices (wrapping to `n - 1`).
    Backward,
}

impl Direction {
    /// The opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// `(index + 1) mod count`, or `None` for an empty list.
#[must_use]
pub const fn wrap_next(index: usize, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    Some((index % count + 1) % count)
}

/// `(index - 1 + count) mod count`, or `None` for an empty list.
#[must_use]
pub const fn wrap_previous(index: usize, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let index = index % count;
    Some((index + count - 1) % count)
}

/// One wrapping step in `direction`.
#[must_use]
pub const fn step(index: usize, count: usize, direction: Direction) -> Option<usize> {
    match direction {
        Direction::Forward => wrap_next(index, count),
        Direction::Backward => wrap_previous(index, count),
    }
}

/// Clamp a possibly stale index into `[0, count)`.
///
/// Lists can shrink between frames while a controller still holds the old
/// index; every read goes through this first.
#[must_use]
pub const fn clamp(index: usize, count: usize) -> Option<usize> {
    if count == 0 {
        None
    } else if index >= count {
        Some(count - 1)
    } else {
        Some(index)
    }
}

/// Find the next index in `direction` (starting after `start`) for which
/// `is_enabled` holds.
///
/// Probes at most `count` positions; the final probe is `start` itself, so a
/// list with exactly one enabled item returns to it. Returns `None` when no
/// probed index is enabled or the list is empty.
pub fn seek_enabled(
    start: usize,
    count: usize,
    direction: Direction,
    mut is_enabled: impl FnMut(usize) -> bool,
) -> Option<usize> {
    let mut index = clamp(start, count)?;
    for _ in 0..count {
        index = step(index, count, direction)?;
        if is_enabled(index) {
            return Some(index);
        }
    }
    None
}

/// First enabled index by forward scan from 0.
pub fn first_enabled(count: usize, mut is_enabled: impl FnMut(usize) -> bool) -> Option<usize> {
    (0..count).find(|&i| is_enabled(i))
}

/// Last enabled index by backward scan from `count - 1`.
pub fn last_enabled(count: usize, mut is_enabled: impl FnMut(usize) -> bool) -> Option<usize> {
    (0..count).rev().find(|&i| is_enabled(i))
}

/// 1-based "position of count" pair for announcements.
#[must_use]
pub const fn ordinal(index: usize, count: usize) -> Option<(usize, usize)> {
    match clamp(index, count) {
        Some(i) => Some((i + 1, count)),
        None => None,
    }
}
