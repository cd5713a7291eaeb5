//! Typed event dispatch with per-kind suppression.
//!
//! The workbench re-broadcasts structural events from the layout engine,
//! and some of those events are echoes of mutations the workbench itself
//! just performed (restoring a perspective fires the same state-changed
//! event a user drag would). [`EventBus::suppress_next`] arms a counter for
//! one event kind; the next emission of that kind is swallowed instead of
//! delivered, which is how self-triggered echoes are kept from being
//! re-interpreted as user edits.
//!
//! # Invariants
//!
//! 1. Suppression is counted per event kind, never global.
//! 2. Each suppressed emission consumes exactly one count.
//! 3. Listener registration order is delivery order.
//! 4. Unsubscribing an unknown id is a no-op.

use rustc_hash::FxHashMap;

/// Key trait for events dispatched through [`EventBus`].
///
/// `kind` must be stable for a given variant; it is the suppression key.
pub trait BusEvent {
    /// Stable name of this event's variant.
    fn kind(&self) -> &'static str;
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Synchronous fan-out dispatcher with per-kind suppress counts.
pub struct EventBus<E: BusEvent> {
    listeners: Vec<(ListenerId, Box<dyn Fn(&E)>)>,
    suppressed: FxHashMap<&'static str, u32>,
    next_listener: u64,
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> EventBus<E> {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            suppressed: FxHashMap::default(),
            next_listener: 0,
        }
    }

    /// Register a listener; delivery follows registration order.
    pub fn subscribe(&mut self, listener: impl Fn(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(listener, _)| *listener != id);
    }

    /// Arm one suppression for `kind`: the next matching emission is
    /// swallowed. Calls accumulate.
    pub fn suppress_next(&mut self, kind: &'static str) {
        *self.suppressed.entry(kind).or_insert(0) += 1;
    }

    /// Outstanding suppression count for `kind`.
    #[must_use]
    pub fn suppressed(&self, kind: &'static str) -> u32 {
        self.suppressed.get(kind).copied().unwrap_or(0)
    }

    /// Deliver `event` to every listener, unless a suppression for its kind
    /// is armed. Returns whether the event was delivered.
    pub fn emit(&mut self, event: &E) -> bool {
        if let Some(count) = self.suppressed.get_mut(event.kind()) {
            if *count > 0 {
                *count -= 1;
                if *count == 0 {
                    self.suppressed.remove(event.kind());
                }
                return false;
            }
        }
        for (_, listener) in &self.listeners {
            listener(event);
        }
        true
    }
}

impl<E: BusEvent> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("suppressed", &self.suppressed)
            .finish()
    }
}
