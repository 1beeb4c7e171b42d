#![forbid(unsafe_code)]

//! Errors raised by host adapters.
//!
//! Adapters reach into the host's live object graph, sometimes through
//! members the host never meant to expose. When the host changes underneath
//! them the failure surfaces here, is logged by the caller, and becomes a
//! "not available" announcement. It never propagates into the host.

use std::fmt;

/// A failed read or write against the host's object graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// A field or method the adapter relies on no longer exists.
    MissingMember(String),
    /// The object exists but cannot be used right now (no active map, no selection).
    Unavailable(String),
    /// The host refused the write.
    Rejected(String),
}

impl HostError {
    /// Shorthand for [`HostError::MissingMember`].
    pub fn missing(member: impl Into<String>) -> Self {
        Self::MissingMember(member.into())
    }

    /// Shorthand for [`HostError::Unavailable`].
    pub fn unavailable(what: impl Into<String>) -> Self {
        Self::Unavailable(what.into())
    }

    /// Shorthand for [`HostError::Rejected`].
    pub fn rejected(why: impl Into<String>) -> Self {
        Self::Rejected(why.into())
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMember(name) => write!(f, "host member missing: {name}"),
            Self::Unavailable(what) => write!(f, "host object unavailable: {what}"),
            Self::Rejected(why) => write!(f, "host rejected the change: {why}"),
        }
    }
}

impl std::error::Error for HostError {}

/// Result type for host adapter calls.
pub type HostResult<T> = Result<T, HostError>;
