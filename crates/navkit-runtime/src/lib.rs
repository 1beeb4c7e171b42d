#![forbid(unsafe_code)]

//! Runtime for navkit: the input router, focus slot and output channels.
//!
//! A host builds one [`AccessContext`], registers its [`Feature`]s with a
//! [`Priority`], adds output sinks, and feeds every key event through
//! [`AccessContext::dispatch`]. The returned [`Dispatch`] says whether the
//! host should still process the key.
//!
//! ```
//! use navkit_runtime::{AccessContext, Dispatch, NavConfig};
//! use navkit_core::{KeyCode, KeyEvent};
//!
//! let mut cx: AccessContext<()> = AccessContext::new(NavConfig::default());
//! assert_eq!(cx.dispatch(&KeyEvent::new(KeyCode::Down), &mut ()), Dispatch::PassThrough);
//! ```

pub mod clipboard;
pub mod config;
pub mod context;
pub mod feature;
pub mod focus;
pub mod output;
pub mod router;

pub use clipboard::{Clipboard, ClipboardBackend, ClipboardError, Passthrough, TerminalEnv};
pub use config::{ConfigError, NavConfig};
pub use context::{AccessContext, Dispatch, FeatureContext};
pub use feature::{Feature, FeatureId, Handled, OpenRequest, Priority};
pub use focus::{Claim, FocusError, FocusSlot};
pub use output::{
    ClipboardSink, RecordingSink, SpeechBridge, SpeechSink, TracingBridge, WriterSink,
};
pub use router::{Route, RouteError, RouteTable};
