#![forbid(unsafe_code)]

//! Core: key events, selection laws, announcement formatting, host errors.
//!
//! Everything here is host-agnostic. Controllers in `navkit-widgets` build on
//! the [`selection`] laws and speak through an [`announce::Announcer`]; the
//! runtime routes [`event::KeyEvent`]s to them.

pub mod announce;
pub mod error;
pub mod event;
pub mod logging;
pub mod selection;

pub use announce::{
    Announcement, AnnouncementSink, Announcer, Availability, CheckState, Describe, Expansion,
    SpeechPriority,
};
pub use error::{HostError, HostResult};
pub use event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use selection::Direction;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, trace, warn};
