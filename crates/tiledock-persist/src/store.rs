//! The asynchronous perspective storage contract.
//!
//! Every operation returns a boxed future even where a backend resolves
//! synchronously: the same contract has to serve in-memory stores and
//! network-backed ones, and callers must never assume synchronous
//! completion. There is no cancellation primitive — callers discard
//! superseded results on arrival (see the perspective bar's generation
//! guard) rather than aborting in-flight fetches.
//!
//! # Contract
//!
//! - `load`/`list` return the *current editable view*: the modified state
//!   when one exists, else the base state.
//! - `load_original`/`list_originals` always return the base state.
//! - `update` with a state equal to base ignoring selection discards any
//!   modified state instead of recording it — writing back an unmodified
//!   arrangement reverts the id to clean. Unusual, but load-bearing:
//!   callers rely on "no structural difference" meaning "not dirty".
//! - Subscribers are notified synchronously after every observable change.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::perspective::{Perspective, WorkbenchSnapshot};

/// Boxed, dyn-compatible future returned by every store operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Storage failures, delivered through the rejected future.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no perspective with id `{id}`")]
    NotFound { id: String },
    #[error("unsupported perspective schema version {found} (expected {expected})")]
    SchemaVersion { found: u16, expected: u16 },
    #[error("invalid perspective: {message}")]
    Invalid { message: String },
    #[error("storage backend failure: {message}")]
    Backend { message: String },
}

impl StoreError {
    /// Convenience constructor for backend-side failures.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Target position for [`PerspectiveStore::move_to`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePosition {
    First,
    Last,
    /// Absolute index, clamped to the list length.
    Index(usize),
    /// Immediately before the named perspective; unknown anchors are a
    /// no-op.
    Before(String),
    /// Immediately after the named perspective; unknown anchors are a
    /// no-op.
    After(String),
}

/// Change listener; invoked synchronously after each observable mutation.
pub type StoreListener = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`PerspectiveStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Abstract, backend-polymorphic perspective storage.
///
/// Each id maps to exactly one base state and at most one modified state;
/// `is_modified` is true iff both exist.
pub trait PerspectiveStore: Send + Sync {
    /// All perspectives in store order, each in its current editable view.
    fn list(&self) -> StoreFuture<'_, Vec<Perspective>>;

    /// All perspectives in store order, each in its base (last-saved) view.
    fn list_originals(&self) -> StoreFuture<'_, Vec<Perspective>>;

    /// Current editable view of one perspective.
    fn load<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Perspective>;

    /// Base (last-saved) view of one perspective.
    fn load_original<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Perspective>;

    /// Whether an unsaved modified state exists for `id`.
    fn is_modified<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool>;

    /// Insert a new perspective (or overwrite an existing base), dropping
    /// any modified state for the id.
    fn save(&self, perspective: Perspective) -> StoreFuture<'_, ()>;

    /// Record `state` as the modified overlay for `id` — or, when `state`
    /// equals the base ignoring selection, discard the overlay entirely.
    fn update<'a>(&'a self, id: &'a str, state: WorkbenchSnapshot) -> StoreFuture<'a, ()>;

    /// Promote the modified state to base. No-op when clean.
    fn persist_modifications<'a>(&'a self, id: &'a str) -> StoreFuture<'a, ()>;

    /// Discard the modified state, keeping base. No-op when clean.
    fn revert_modifications<'a>(&'a self, id: &'a str) -> StoreFuture<'a, ()>;

    /// Change the display label.
    fn rename<'a>(&'a self, id: &'a str, label: &'a str) -> StoreFuture<'a, ()>;

    /// Change icon and accent color.
    fn update_visual_style<'a>(
        &'a self,
        id: &'a str,
        icon: Option<String>,
        color: Option<String>,
    ) -> StoreFuture<'a, ()>;

    /// Delete the perspective and both of its states.
    fn remove<'a>(&'a self, id: &'a str) -> StoreFuture<'a, ()>;

    /// Reposition `id` within the store order.
    fn move_to<'a>(&'a self, id: &'a str, position: MovePosition) -> StoreFuture<'a, ()>;

    /// Register a change listener. Notification is synchronous with the
    /// mutation that triggered it.
    fn subscribe(&self, listener: StoreListener) -> SubscriptionId;

    /// Drop a listener. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}
