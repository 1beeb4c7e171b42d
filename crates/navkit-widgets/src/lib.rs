#![forbid(unsafe_code)]

//! Navigation controllers for navkit.
//!
//! - [`list::ListController`] walks a flat menu and skips disabled entries.
//! - [`tree::TreeController`] walks a category tree through its visible
//!   projection and writes allow/disallow toggles to a [`tree::FilterHost`].
//! - [`slider::RangeEditor`] is the range sub-mode a tree enters on a slider.
//!
//! Controllers own no output channel; every state change is spoken through
//! the [`navkit_core::Announcer`] passed in by the caller.

pub mod list;
pub mod slider;
pub mod tree;

pub use list::{ListController, ListResponse, MenuItem};
pub use slider::{RangeEditor, RangeEnd, RangeResponse, RangeValue, ValueFormat};
pub use tree::{FilterHost, FlatEntry, NodeKind, NodeRef, TreeController, TreeNode, TreeOptions, TreeResponse};
