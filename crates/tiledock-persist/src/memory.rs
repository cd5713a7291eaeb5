//! In-memory reference backend for [`PerspectiveStore`].
//!
//! An ordered entry list behind a mutex. Every operation resolves on first
//! poll, but callers still receive futures — the contract is shared with
//! network-backed stores. Perspectives are handed out as deep clones, so
//! a caller's edit buffer never aliases the persisted base or modified
//! state.
//!
//! Listener notification runs synchronously inside the mutating operation,
//! after the entry lock is released; a listener may therefore immediately
//! issue new store calls without deadlocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::perspective::{PERSPECTIVE_SCHEMA_VERSION, Perspective, WorkbenchSnapshot};
use crate::store::{
    MovePosition, PerspectiveStore, StoreError, StoreFuture, StoreListener, SubscriptionId,
};

#[derive(Debug)]
struct Entry {
    base: Perspective,
    modified: Option<WorkbenchSnapshot>,
}

impl Entry {
    /// Current editable view: modified over base.
    fn current(&self) -> Perspective {
        let mut perspective = self.base.clone();
        if let Some(modified) = &self.modified {
            perspective.state = modified.clone();
        }
        perspective
    }
}

/// Array-backed reference store.
pub struct MemoryPerspectiveStore {
    entries: Mutex<Vec<Entry>>,
    listeners: Mutex<Vec<(SubscriptionId, StoreListener)>>,
    next_subscription: AtomicU64,
}

impl Default for MemoryPerspectiveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryPerspectiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPerspectiveStore")
            .field("entries", &self.lock_entries().len())
            .finish()
    }
}

impl MemoryPerspectiveStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Create a store seeded with base perspectives, in order.
    #[must_use]
    pub fn with_perspectives(perspectives: Vec<Perspective>) -> Self {
        let store = Self::new();
        {
            let mut entries = store.lock_entries();
            entries.extend(perspectives.into_iter().map(|base| Entry {
                base,
                modified: None,
            }));
        }
        store
    }

    fn lock_entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        let listeners: Vec<StoreListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }

    fn not_found(id: &str) -> StoreError {
        StoreError::NotFound { id: id.to_string() }
    }

    // ---------------------------------------------------------------------
    // Synchronous cores; the trait wraps these in ready futures.
    // ---------------------------------------------------------------------

    fn save_sync(&self, perspective: Perspective) -> Result<(), StoreError> {
        if perspective.schema_version != PERSPECTIVE_SCHEMA_VERSION {
            return Err(StoreError::SchemaVersion {
                found: perspective.schema_version,
                expected: PERSPECTIVE_SCHEMA_VERSION,
            });
        }
        if perspective.id.is_empty() {
            return Err(StoreError::Invalid {
                message: "perspective id must not be empty".to_string(),
            });
        }
        if let Err(source) = tiledock_layout::validate(&perspective.state.content) {
            return Err(StoreError::Invalid {
                message: source.to_string(),
            });
        }
        tracing::debug!(id = %perspective.id, "saving perspective base state");
        {
            let mut entries = self.lock_entries();
            match entries.iter_mut().find(|entry| entry.base.id == perspective.id) {
                Some(entry) => {
                    entry.base = perspective;
                    entry.modified = None;
                }
                None => entries.push(Entry {
                    base: perspective,
                    modified: None,
                }),
            }
        }
        self.notify();
        Ok(())
    }

    fn update_sync(&self, id: &str, state: WorkbenchSnapshot) -> Result<(), StoreError> {
        let changed = {
            let mut entries = self.lock_entries();
            let entry = entries
                .iter_mut()
                .find(|entry| entry.base.id == id)
                .ok_or_else(|| Self::not_found(id))?;
            if entry.base.state.equals_ignoring_selection(&state) {
                // Writing back an arrangement structurally equal to base
                // reverts the id to clean.
                entry.modified.take().is_some()
            } else if entry.modified.as_ref() == Some(&state) {
                false
            } else {
                entry.modified = Some(state);
                true
            }
        };
        if changed {
            tracing::debug!(id, "perspective modified state updated");
            self.notify();
        }
        Ok(())
    }

    fn persist_sync(&self, id: &str) -> Result<(), StoreError> {
        let changed = {
            let mut entries = self.lock_entries();
            let entry = entries
                .iter_mut()
                .find(|entry| entry.base.id == id)
                .ok_or_else(|| Self::not_found(id))?;
            match entry.modified.take() {
                Some(modified) => {
                    entry.base.state = modified;
                    true
                }
                None => false,
            }
        };
        if changed {
            tracing::debug!(id, "perspective modifications persisted");
            self.notify();
        }
        Ok(())
    }

    fn revert_sync(&self, id: &str) -> Result<(), StoreError> {
        let changed = {
            let mut entries = self.lock_entries();
            let entry = entries
                .iter_mut()
                .find(|entry| entry.base.id == id)
                .ok_or_else(|| Self::not_found(id))?;
            entry.modified.take().is_some()
        };
        if changed {
            tracing::debug!(id, "perspective modifications reverted");
            self.notify();
        }
        Ok(())
    }

    fn rename_sync(&self, id: &str, label: &str) -> Result<(), StoreError> {
        let changed = {
            let mut entries = self.lock_entries();
            let entry = entries
                .iter_mut()
                .find(|entry| entry.base.id == id)
                .ok_or_else(|| Self::not_found(id))?;
            if entry.base.label == label {
                false
            } else {
                entry.base.label = label.to_string();
                true
            }
        };
        if changed {
            self.notify();
        }
        Ok(())
    }

    fn style_sync(
        &self,
        id: &str,
        icon: Option<String>,
        color: Option<String>,
    ) -> Result<(), StoreError> {
        let changed = {
            let mut entries = self.lock_entries();
            let entry = entries
                .iter_mut()
                .find(|entry| entry.base.id == id)
                .ok_or_else(|| Self::not_found(id))?;
            if entry.base.icon == icon && entry.base.color == color {
                false
            } else {
                entry.base.icon = icon;
                entry.base.color = color;
                true
            }
        };
        if changed {
            self.notify();
        }
        Ok(())
    }

    fn remove_sync(&self, id: &str) -> Result<(), StoreError> {
        {
            let mut entries = self.lock_entries();
            let index = entries
                .iter()
                .position(|entry| entry.base.id == id)
                .ok_or_else(|| Self::not_found(id))?;
            entries.remove(index);
        }
        tracing::debug!(id, "perspective removed");
        self.notify();
        Ok(())
    }

    fn move_sync(&self, id: &str, position: MovePosition) -> Result<(), StoreError> {
        let moved = {
            let mut entries = self.lock_entries();
            let from = entries
                .iter()
                .position(|entry| entry.base.id == id)
                .ok_or_else(|| Self::not_found(id))?;
            let entry = entries.remove(from);
            let len = entries.len();
            let to = match &position {
                MovePosition::First => 0,
                MovePosition::Last => len,
                MovePosition::Index(index) => (*index).min(len),
                MovePosition::Before(anchor) | MovePosition::After(anchor) => {
                    match entries.iter().position(|entry| &entry.base.id == anchor) {
                        Some(at) if matches!(position, MovePosition::Before(_)) => at,
                        Some(at) => at + 1,
                        // Unknown anchor (or the moved id itself): no-op.
                        None => from,
                    }
                }
            };
            entries.insert(to, entry);
            to != from
        };
        if moved {
            tracing::debug!(id, "perspective reordered");
            self.notify();
        }
        Ok(())
    }
}

impl PerspectiveStore for MemoryPerspectiveStore {
    fn list(&self) -> StoreFuture<'_, Vec<Perspective>> {
        Box::pin(async move { Ok(self.lock_entries().iter().map(Entry::current).collect()) })
    }

    fn list_originals(&self) -> StoreFuture<'_, Vec<Perspective>> {
        Box::pin(async move {
            Ok(self
                .lock_entries()
                .iter()
                .map(|entry| entry.base.clone())
                .collect())
        })
    }

    fn load<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Perspective> {
        Box::pin(async move {
            self.lock_entries()
                .iter()
                .find(|entry| entry.base.id == id)
                .map(Entry::current)
                .ok_or_else(|| Self::not_found(id))
        })
    }

    fn load_original<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Perspective> {
        Box::pin(async move {
            self.lock_entries()
                .iter()
                .find(|entry| entry.base.id == id)
                .map(|entry| entry.base.clone())
                .ok_or_else(|| Self::not_found(id))
        })
    }

    fn is_modified<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            self.lock_entries()
                .iter()
                .find(|entry| entry.base.id == id)
                .map(|entry| entry.modified.is_some())
                .ok_or_else(|| Self::not_found(id))
        })
    }

    fn save(&self, perspective: Perspective) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.save_sync(perspective) })
    }

    fn update<'a>(&'a self, id: &'a str, state: WorkbenchSnapshot) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.update_sync(id, state) })
    }

    fn persist_modifications<'a>(&'a self, id: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.persist_sync(id) })
    }

    fn revert_modifications<'a>(&'a self, id: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.revert_sync(id) })
    }

    fn rename<'a>(&'a self, id: &'a str, label: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.rename_sync(id, label) })
    }

    fn update_visual_style<'a>(
        &'a self,
        id: &'a str,
        icon: Option<String>,
        color: Option<String>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.style_sync(id, icon, color) })
    }

    fn remove<'a>(&'a self, id: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.remove_sync(id) })
    }

    fn move_to<'a>(&'a self, id: &'a str, position: MovePosition) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.move_sync(id, position) })
    }

    fn subscribe(&self, listener: StoreListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(subscription, _)| *subscription != id);
    }
}
