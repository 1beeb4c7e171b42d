#![forbid(unsafe_code)]

//! navkit public facade crate.
//!
//! Keyboard and screen-reader navigation for menus that were built for the
//! mouse. This crate re-exports the stable surface of the internal crates
//! and offers a prelude for host integrations.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use navkit_core::announce::{
    Announcement, AnnouncementSink, Announcer, Availability, CheckState, Describe, Expansion,
    NO_ITEMS, SpeechPriority, UNAVAILABLE,
};
pub use navkit_core::error::{HostError, HostResult};
pub use navkit_core::event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};

// --- Widget re-exports -----------------------------------------------------

pub use navkit_widgets::list::{ListController, ListResponse, MenuItem};
pub use navkit_widgets::slider::{RangeEditor, RangeEnd, RangeResponse, RangeValue, ValueFormat};
pub use navkit_widgets::tree::{
    FilterHost, NodeKind, TreeController, TreeNode, TreeOptions, TreeResponse,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use navkit_runtime::{
    AccessContext, Clipboard, ClipboardSink, ConfigError, Dispatch, Feature, FeatureContext,
    FeatureId, Handled, NavConfig, OpenRequest, Priority, RecordingSink, RouteError,
    SpeechBridge, SpeechSink, TracingBridge, WriterSink,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for navkit integrations.
#[derive(Debug)]
pub enum Error {
    /// I/O failure on an output channel or the terminal.
    Io(std::io::Error),
    /// A host adapter call failed.
    Host(HostError),
    /// Configuration could not be loaded.
    #[cfg(feature = "runtime")]
    Config(ConfigError),
    /// A feature could not be registered.
    #[cfg(feature = "runtime")]
    Route(RouteError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Host(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Config(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Route(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Host(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Config(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Route(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<HostError> for Error {
    fn from(err: HostError) -> Self {
        Self::Host(err)
    }
}

#[cfg(feature = "runtime")]
impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(feature = "runtime")]
impl From<RouteError> for Error {
    fn from(err: RouteError) -> Self {
        Self::Route(err)
    }
}

/// Standard result type for navkit APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Announcer, Availability, Error, FilterHost, HostError, HostResult, KeyCode, KeyEvent,
        ListController, ListResponse, MenuItem, Modifiers, RangeValue, Result, TreeController,
        TreeNode, TreeOptions, TreeResponse,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        AccessContext, Dispatch, Feature, FeatureContext, FeatureId, Handled, NavConfig,
        OpenRequest, Priority,
    };

    pub use crate::{core, widgets};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use navkit_core as core;
#[cfg(feature = "runtime")]
pub use navkit_runtime as runtime;
pub use navkit_widgets as widgets;
