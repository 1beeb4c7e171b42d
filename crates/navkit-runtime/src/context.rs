#![forbid(unsafe_code)]

//! The access context: routing table, focus slot, announcer and config in
//! one explicitly passed object.
//!
//! # Dispatch order
//!
//! For every key event the host delivers:
//!
//! 1. Key releases are swallowed while any feature is active and passed
//!    through otherwise. The configured repeat key re-speaks the last
//!    announcement while any feature is active.
//! 2. The focus owner sees the key first, unless another active feature
//!    ranks strictly higher; that one goes first.
//! 3. Then every other active feature, in priority order. Active features
//!    outside the focus chain are unexpected and logged; the higher priority
//!    one always wins.
//! 4. Then inactive features' hotkeys, in priority order.
//! 5. Anything left is swallowed while a feature is active or focus is owned,
//!    and passed through to the host otherwise.
//!
//! Open and release requests raised inside a handler are applied after the
//! handler returns, so a feature never observes another mid-call.

use navkit_core::announce::{AnnouncementSink, Announcer, SpeechPriority};
use navkit_core::event::KeyEvent;

use crate::config::NavConfig;
use crate::feature::{Feature, FeatureId, Handled, OpenRequest, Priority};
use crate::focus::{Claim, FocusError, FocusSlot};
use crate::router::{RouteError, RouteTable};

/// Where a key event ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A feature used it.
    Consumed(FeatureId),
    /// Nobody used it, but it must not reach the host.
    Suppressed,
    /// The host should process it normally.
    PassThrough,
}

impl Dispatch {
    /// Whether the host should see the event.
    #[must_use]
    pub const fn reaches_host(self) -> bool {
        matches!(self, Self::PassThrough)
    }
}

#[derive(Debug)]
enum Request {
    Release(FeatureId),
    Open(OpenRequest),
}

/// Everything a feature may touch while it handles an event.
pub struct FeatureContext<'a, H> {
    id: FeatureId,
    priority: Priority,
    host: &'a mut H,
    announcer: &'a mut Announcer,
    focus: &'a mut FocusSlot,
    config: &'a NavConfig,
    requests: &'a mut Vec<Request>,
}

impl<'a, H> FeatureContext<'a, H> {
    /// The feature being called.
    #[must_use]
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Its routing priority.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// The host adapter.
    pub fn host(&mut self) -> &mut H {
        &mut *self.host
    }

    /// The announcer.
    pub fn announcer(&mut self) -> &mut Announcer {
        &mut *self.announcer
    }

    /// Host and announcer together, for controllers that need both.
    pub fn split(&mut self) -> (&mut H, &mut Announcer) {
        (&mut *self.host, &mut *self.announcer)
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &NavConfig {
        self.config
    }

    /// Announce at the configured navigation priority.
    pub fn announce(&mut self, text: impl Into<String>) -> bool {
        self.announcer.announce_with(text, self.config.speech_priority)
    }

    /// Announce something that must cut off current speech.
    pub fn announce_urgent(&mut self, text: impl Into<String>) {
        self.announcer.force(text, SpeechPriority::High);
    }

    /// Claim keyboard focus for this feature now.
    pub fn claim_focus(&mut self) -> Result<Claim, FocusError> {
        self.focus.claim(self.id, self.priority)
    }

    /// Release focus once the current handler returns.
    pub fn release_focus(&mut self) {
        self.requests.push(Request::Release(self.id));
    }

    /// Whether this feature owns focus.
    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.focus.is_held_by(self.id)
    }

    /// Ask another feature to open once the current handler returns.
    pub fn request_open(&mut self, request: OpenRequest) {
        self.requests.push(Request::Open(request));
    }
}

/// Routing table, focus slot, announcer and configuration.
pub struct AccessContext<H> {
    routes: RouteTable<H>,
    focus: FocusSlot,
    announcer: Announcer,
    config: NavConfig,
}

impl<H> std::fmt::Debug for AccessContext<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessContext")
            .field("routes", &self.routes)
            .field("focus", &self.focus)
            .field("announcer", &self.announcer)
            .finish()
    }
}

impl<H> Default for AccessContext<H> {
    fn default() -> Self {
        Self::new(NavConfig::default())
    }
}

impl<H> AccessContext<H> {
    /// Create a context with no features and no sinks.
    #[must_use]
    pub fn new(config: NavConfig) -> Self {
        let config = config.validated();
        let mut announcer = Announcer::new();
        config.apply(&mut announcer);
        Self {
            routes: RouteTable::new(),
            focus: FocusSlot::new(),
            announcer,
            config,
        }
    }

    /// Add an output channel.
    #[must_use]
    pub fn with_sink(mut self, sink: impl AnnouncementSink + 'static) -> Self {
        self.announcer.add_sink(sink);
        self
    }

    /// Add an output channel.
    pub fn add_sink(&mut self, sink: impl AnnouncementSink + 'static) {
        self.announcer.add_sink(sink);
    }

    /// Register a feature.
    pub fn register(
        &mut self,
        priority: Priority,
        feature: impl Feature<H> + 'static,
    ) -> Result<(), RouteError> {
        let result = self.routes.insert(priority, Box::new(feature));
        if let Err(err) = &result {
            tracing::warn!(error = %err, "feature registration failed");
        }
        result
    }

    /// The routing table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable<H> {
        &self.routes
    }

    /// The focus slot.
    #[must_use]
    pub fn focus(&self) -> &FocusSlot {
        &self.focus
    }

    /// The announcer.
    #[must_use]
    pub fn announcer(&self) -> &Announcer {
        &self.announcer
    }

    /// The announcer, mutably.
    pub fn announcer_mut(&mut self) -> &mut Announcer {
        &mut self.announcer
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Whether any feature is active.
    #[must_use]
    pub fn any_active(&self) -> bool {
        self.routes.any_active()
    }

    /// Route one key event.
    pub fn dispatch(&mut self, key: &KeyEvent, host: &mut H) -> Dispatch {
        let _span = tracing::trace_span!("dispatch", key = ?key.code).entered();

        if !key.is_down() {
            return self.leftover();
        }

        if self.is_repeat_key(key) && self.routes.any_active() {
            let repeated = self.announcer.repeat_last();
            tracing::debug!(repeated, "repeat key");
            return Dispatch::Suppressed;
        }

        if let Some(owner) = self.focus.owner() {
            if !self.routes.is_active(owner) {
                tracing::warn!(feature = %owner, "focus owner went inactive without releasing");
                self.release(owner, host);
            }
        }

        let owner = self.focus.owner();
        let stray: Vec<FeatureId> = self
            .routes
            .active_ids()
            .into_iter()
            .filter(|id| Some(*id) != owner && !self.focus.suspended().any(|s| s == *id))
            .collect();
        if stray.len() > 1 || (owner.is_some() && !stray.is_empty()) {
            tracing::warn!(
                active = ?stray.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                owner = ?owner.map(FeatureId::as_str),
                "several features active; routing by priority"
            );
        }
        for id in self.routing_order(owner) {
            if self.routes.is_active(id) && self.call_key(id, key, host) {
                return Dispatch::Consumed(id);
            }
        }

        for id in self.routes.inactive_ids() {
            let consumed = self
                .call(id, host, |feature, cx| feature.on_hotkey(key, cx))
                .is_some_and(Handled::is_consumed);
            if consumed {
                tracing::debug!(feature = %id, "hotkey consumed");
                return Dispatch::Consumed(id);
            }
        }

        self.leftover()
    }

    /// Route one frame's key events, then give every active feature its
    /// per-frame update.
    pub fn frame(
        &mut self,
        keys: impl IntoIterator<Item = KeyEvent>,
        host: &mut H,
    ) -> Vec<Dispatch> {
        let results = keys
            .into_iter()
            .map(|key| self.dispatch(&key, host))
            .collect();
        for id in self.routes.active_ids() {
            self.call(id, host, |feature, cx| feature.on_frame(cx));
        }
        results
    }

    /// Ask `request.target` to open. Returns whether it accepted.
    pub fn open(&mut self, request: OpenRequest, host: &mut H) -> bool {
        let target = request.target;
        let accepted = self
            .call(target, host, |feature, cx| feature.on_open_request(&request, cx))
            .is_some_and(Handled::is_consumed);
        if !accepted {
            tracing::debug!(feature = %target, "open request declined");
        }
        accepted
    }

    /// Force every feature closed and clear focus (the host screen changed).
    pub fn close_all(&mut self) {
        for route in self.routes.iter_mut() {
            if route.feature.is_active() {
                route.feature.force_close();
            }
        }
        self.focus.clear();
        tracing::debug!("all features closed");
    }

    /// Active features in the order they see a key: anything ranked strictly
    /// above the focus owner, then the owner, then the rest by priority.
    fn routing_order(&self, owner: Option<FeatureId>) -> Vec<FeatureId> {
        let active = self.routes.active_ids();
        let Some(owner) = owner.filter(|id| active.contains(id)) else {
            return active;
        };
        let owner_priority = self.routes.priority(owner).unwrap_or_default();
        let (above, rest): (Vec<FeatureId>, Vec<FeatureId>) = active
            .into_iter()
            .filter(|id| *id != owner)
            .partition(|id| self.routes.priority(*id).is_some_and(|p| p > owner_priority));
        above.into_iter().chain(std::iter::once(owner)).chain(rest).collect()
    }

    fn is_repeat_key(&self, key: &KeyEvent) -> bool {
        self.config.repeat_key == Some(key.code) && !key.ctrl() && !key.alt()
    }

    fn leftover(&self) -> Dispatch {
        if self.routes.any_active() || self.focus.is_owned() {
            Dispatch::Suppressed
        } else {
            Dispatch::PassThrough
        }
    }

    fn call_key(&mut self, id: FeatureId, key: &KeyEvent, host: &mut H) -> bool {
        self.call(id, host, |feature, cx| feature.handle_key(key, cx))
            .is_some_and(Handled::is_consumed)
    }

    fn call<R>(
        &mut self,
        id: FeatureId,
        host: &mut H,
        f: impl FnOnce(&mut dyn Feature<H>, &mut FeatureContext<'_, H>) -> R,
    ) -> Option<R> {
        let mut requests = Vec::new();
        let result = {
            let route = self.routes.get_mut(id)?;
            let mut cx = FeatureContext {
                id,
                priority: route.priority,
                host: &mut *host,
                announcer: &mut self.announcer,
                focus: &mut self.focus,
                config: &self.config,
                requests: &mut requests,
            };
            f(&mut *route.feature, &mut cx)
        };
        for request in requests {
            match request {
                Request::Release(id) => self.release(id, host),
                Request::Open(request) => {
                    self.open(request, host);
                }
            }
        }
        Some(result)
    }

    fn release(&mut self, id: FeatureId, host: &mut H) {
        if let Some(restored) = self.focus.release(id) {
            tracing::debug!(released = %id, restored = %restored, "focus restored");
            self.announcer.reset_last();
            self.call(restored, host, |feature, cx| feature.on_focus_restored(cx));
        }
    }
}
