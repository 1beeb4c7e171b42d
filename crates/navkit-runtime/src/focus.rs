#![forbid(unsafe_code)]

//! The single keyboard-focus slot.
//!
//! Exactly zero or one feature owns focus. A claimant with strictly higher
//! priority preempts the owner, which is suspended and gets focus back when
//! the claimant releases. Equal or lower priority claims fail with
//! [`FocusError::Held`].
//!
//! ```
//! use navkit_runtime::feature::{FeatureId, Priority};
//! use navkit_runtime::focus::FocusSlot;
//!
//! let trade = FeatureId::new("trade");
//! let confirm = FeatureId::new("confirm");
//!
//! let mut slot = FocusSlot::new();
//! slot.claim(trade, Priority::NORMAL).unwrap();
//! slot.claim(confirm, Priority::MODAL).unwrap();
//! assert_eq!(slot.owner(), Some(confirm));
//! assert_eq!(slot.release(confirm), Some(trade));
//! ```

use std::fmt;

use crate::feature::{FeatureId, Priority};

/// Focus could not be claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusError {
    /// Another feature of equal or higher priority owns focus.
    Held {
        /// Current owner.
        owner: FeatureId,
        /// The feature that asked.
        requested: FeatureId,
    },
}

impl fmt::Display for FocusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Held { owner, requested } => {
                write!(f, "focus held by {owner}; {requested} cannot claim it")
            }
        }
    }
}

impl std::error::Error for FocusError {}

/// Result of a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The slot was empty.
    Acquired,
    /// The claimant already owned it.
    AlreadyOwned,
    /// The previous owner was suspended.
    Preempted(FeatureId),
}

/// Owner record plus the stack of suspended owners.
#[derive(Debug, Clone, Default)]
pub struct FocusSlot {
    owner: Option<(FeatureId, Priority)>,
    suspended: Vec<(FeatureId, Priority)>,
}

impl FocusSlot {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current owner.
    #[must_use]
    pub fn owner(&self) -> Option<FeatureId> {
        self.owner.map(|(id, _)| id)
    }

    /// Priority of the current owner.
    #[must_use]
    pub fn owner_priority(&self) -> Option<Priority> {
        self.owner.map(|(_, priority)| priority)
    }

    /// Whether anyone owns focus.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// Whether `id` owns focus.
    #[must_use]
    pub fn is_held_by(&self, id: FeatureId) -> bool {
        self.owner() == Some(id)
    }

    /// Suspended owners, most recently suspended last.
    pub fn suspended(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.suspended.iter().map(|(id, _)| *id)
    }

    /// Claim focus for `id`.
    pub fn claim(&mut self, id: FeatureId, priority: Priority) -> Result<Claim, FocusError> {
        match self.owner {
            None => {
                self.suspended.retain(|(s, _)| *s != id);
                self.owner = Some((id, priority));
                tracing::debug!(feature = %id, %priority, "focus acquired");
                Ok(Claim::Acquired)
            }
            Some((owner, _)) if owner == id => Ok(Claim::AlreadyOwned),
            Some((owner, owner_priority)) if priority > owner_priority => {
                self.suspended.retain(|(s, _)| *s != id);
                self.suspended.push((owner, owner_priority));
                self.owner = Some((id, priority));
                tracing::debug!(feature = %id, suspended = %owner, "focus preempted");
                Ok(Claim::Preempted(owner))
            }
            Some((owner, _)) => {
                tracing::debug!(feature = %id, %owner, "focus claim refused");
                Err(FocusError::Held {
                    owner,
                    requested: id,
                })
            }
        }
    }

    /// Release focus held (or suspended) by `id`.
    ///
    /// Returns the suspended owner that regains focus, if any.
    pub fn release(&mut self, id: FeatureId) -> Option<FeatureId> {
        if self.is_held_by(id) {
            self.owner = self.suspended.pop();
            let restored = self.owner();
            tracing::debug!(feature = %id, restored = ?restored.map(FeatureId::as_str), "focus released");
            return restored;
        }
        self.suspended.retain(|(s, _)| *s != id);
        None
    }

    /// Drop the owner and every suspended owner.
    pub fn clear(&mut self) {
        self.owner = None;
        self.suspended.clear();
    }
}
