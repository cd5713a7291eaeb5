//! Perspective bar synchronization.
//!
//! [`PerspectiveBar`] keeps three parties agreeing about which arrangement
//! is on screen: the live layout (reached through [`WorkbenchSurface`]),
//! the perspective store, and the bar's own selection. The hazards it
//! exists to manage:
//!
//! - **Echo suppression.** Restoring a perspective makes the engine fire
//!   the same state-changed event a user drag would. Each restore arms a
//!   suppression; the very next layout-change notification is swallowed so
//!   the bar never reads its own restore back as a user edit.
//! - **Selection is not dirt.** A genuine layout change is compared to the
//!   selected perspective's last-known state *ignoring tab selection*;
//!   flipping tabs never marks a perspective modified.
//! - **Superseded fetches.** List fetches carry a generation. There is no
//!   way to cancel an in-flight store future, so a result arriving for an
//!   older generation is discarded on arrival. Hosts that drive fetches
//!   themselves use the [`begin_refresh`](PerspectiveBar::begin_refresh) /
//!   [`complete_refresh`](PerspectiveBar::complete_refresh) pair; the
//!   convenience [`refresh`](PerspectiveBar::refresh) wraps both.
//!
//! Storage failures never crash the bar: a failed list fetch parks it in
//! [`LoadPhase::Failed`] (surfaced as a reload affordance), and failed
//! loads/saves are logged and left for the caller to retry.

use std::sync::Arc;

use tiledock_persist::{
    Perspective, PerspectiveStore, StoreError, WorkbenchSnapshot,
};

use crate::engine::EngineError;

/// The live layout as the bar sees it.
pub trait WorkbenchSurface {
    /// Serialize the current arrangement.
    fn capture_state(&self) -> WorkbenchSnapshot;
    /// Tear down and mount `snapshot` instead.
    fn restore_state(&mut self, snapshot: WorkbenchSnapshot) -> Result<(), EngineError>;
}

/// Async loading lifecycle of the perspective list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// The list fetch rejected; surfaced as "error, click to reload".
    Failed,
}

/// Failures surfaced by bar operations.
#[derive(Debug, thiserror::Error)]
pub enum BarError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Delegate hooks an application installs on the bar.
///
/// The default implementation approves everything and never takes over, so
/// an uncontrolled bar needs no delegate at all.
pub trait BarDelegate: Send {
    /// Called before switching to another perspective.
    fn on_select(&self, id: &str) -> SelectDecision {
        let _ = id;
        SelectDecision::Proceed
    }

    /// Called before reverting unsaved modifications.
    fn confirm_revert(&self, id: &str) -> bool {
        let _ = id;
        true
    }

    /// Called before capturing the live state as a new perspective.
    fn confirm_create(&self, label: &str) -> bool {
        let _ = label;
        true
    }
}

/// No-delegate default.
struct ApproveAll;

impl BarDelegate for ApproveAll {}

/// A controlling delegate's answer to a selection switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectDecision {
    /// Let the bar load and restore the perspective itself.
    Proceed,
    /// Refuse the switch entirely.
    Veto,
    /// The application performs the switch; the bar only records the new
    /// selection once the host calls
    /// [`PerspectiveBar::set_selected`].
    Handled,
}

/// Outcome of a refresh completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Loaded,
    Failed,
    /// The result belonged to an older fetch and was discarded.
    Superseded,
}

/// Outcome of a layout-change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutChangeOutcome {
    /// A self-triggered echo; consumed one suppression.
    Suppressed,
    /// No perspective is selected; nothing to compare against.
    NoSelection,
    /// The live state matches the last-known state ignoring selection.
    Clean,
    /// A genuine structural edit; the modified state was written through.
    MarkedDirty,
}

/// Outcome of a selection click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Loaded and restored into the live layout.
    Restored,
    /// Clicking the selected, dirty perspective reverted it to base.
    Reverted,
    /// The revert confirmation was declined.
    RevertDeclined,
    /// Clicking the selected, clean perspective changes nothing.
    AlreadySelected,
    Vetoed,
    /// A controlling delegate took over the switch.
    Delegated,
}

/// Ticket tying a list fetch to the generation that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "complete_refresh needs the ticket to detect superseded results"]
pub struct FetchTicket {
    generation: u64,
}

/// Bar-side synchronization state machine.
pub struct PerspectiveBar {
    store: Arc<dyn PerspectiveStore>,
    delegate: Box<dyn BarDelegate>,
    phase: LoadPhase,
    perspectives: Vec<Perspective>,
    selected: Option<String>,
    /// Last state of the selected perspective the bar has seen (restored or
    /// written through); the baseline for dirty detection.
    last_known: Option<WorkbenchSnapshot>,
    /// Outstanding self-triggered layout-change echoes to swallow.
    suppressed_changes: u32,
    /// Generation of the newest list fetch; older results are stale.
    fetch_generation: u64,
}

impl std::fmt::Debug for PerspectiveBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerspectiveBar")
            .field("phase", &self.phase)
            .field("perspectives", &self.perspectives.len())
            .field("selected", &self.selected)
            .field("suppressed_changes", &self.suppressed_changes)
            .finish()
    }
}

impl PerspectiveBar {
    /// Create an idle bar over a store.
    #[must_use]
    pub fn new(store: Arc<dyn PerspectiveStore>) -> Self {
        Self {
            store,
            delegate: Box::new(ApproveAll),
            phase: LoadPhase::Idle,
            perspectives: Vec::new(),
            selected: None,
            last_known: None,
            suppressed_changes: 0,
            fetch_generation: 0,
        }
    }

    /// Install application hooks.
    pub fn set_delegate(&mut self, delegate: Box<dyn BarDelegate>) {
        self.delegate = delegate;
    }

    /// Current loading phase.
    #[must_use]
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// The most recently loaded perspective list.
    #[must_use]
    pub fn perspectives(&self) -> &[Perspective] {
        &self.perspectives
    }

    /// Id of the selected perspective.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Outstanding layout-change suppressions.
    #[must_use]
    pub fn suppressed_changes(&self) -> u32 {
        self.suppressed_changes
    }

    // ---------------------------------------------------------------------
    // List loading
    // ---------------------------------------------------------------------

    /// Start a list fetch: bump the generation and enter `Loading`.
    ///
    /// Any fetch started earlier becomes stale; its result will be
    /// discarded by [`complete_refresh`](Self::complete_refresh).
    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.fetch_generation += 1;
        self.phase = LoadPhase::Loading;
        FetchTicket {
            generation: self.fetch_generation,
        }
    }

    /// Deliver a fetch result. Stale tickets are discarded without
    /// touching any state.
    pub fn complete_refresh(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Perspective>, StoreError>,
    ) -> RefreshOutcome {
        if ticket.generation != self.fetch_generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.fetch_generation,
                "discarding superseded perspective list fetch"
            );
            return RefreshOutcome::Superseded;
        }
        match result {
            Ok(perspectives) => {
                if let Some(selected) = &self.selected {
                    if !perspectives.iter().any(|p| &p.id == selected) {
                        self.selected = None;
                        self.last_known = None;
                    }
                }
                self.perspectives = perspectives;
                self.phase = LoadPhase::Loaded;
                RefreshOutcome::Loaded
            }
            Err(error) => {
                tracing::warn!(%error, "perspective list fetch failed");
                self.phase = LoadPhase::Failed;
                RefreshOutcome::Failed
            }
        }
    }

    /// Fetch the perspective list, discarding the result if another fetch
    /// started in the meantime.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        let ticket = self.begin_refresh();
        let store = Arc::clone(&self.store);
        let result = store.list().await;
        self.complete_refresh(ticket, result)
    }

    // ---------------------------------------------------------------------
    // Layout change handling
    // ---------------------------------------------------------------------

    /// React to a structural change in the live layout.
    ///
    /// Self-triggered echoes consume one suppression. Genuine changes are
    /// compared to the selected perspective's last-known state ignoring
    /// selection; on difference the modified state is written through the
    /// store.
    pub async fn handle_layout_change(
        &mut self,
        live: WorkbenchSnapshot,
    ) -> Result<LayoutChangeOutcome, BarError> {
        if self.suppressed_changes > 0 {
            self.suppressed_changes -= 1;
            return Ok(LayoutChangeOutcome::Suppressed);
        }
        let Some(selected) = self.selected.clone() else {
            return Ok(LayoutChangeOutcome::NoSelection);
        };
        let unchanged = self
            .last_known
            .as_ref()
            .is_some_and(|known| known.equals_ignoring_selection(&live));
        if unchanged {
            return Ok(LayoutChangeOutcome::Clean);
        }
        let store = Arc::clone(&self.store);
        if let Err(error) = store.update(&selected, live.clone()).await {
            tracing::warn!(%error, id = %selected, "failed to record modified state");
            return Err(error.into());
        }
        self.last_known = Some(live);
        Ok(LayoutChangeOutcome::MarkedDirty)
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Handle a click on the perspective named `id`.
    ///
    /// Selecting another perspective defers to the delegate (controlled
    /// mode) or loads and restores it directly. Clicking the selected,
    /// dirty perspective triggers confirm-then-revert instead.
    pub async fn select(
        &mut self,
        id: &str,
        surface: &mut dyn WorkbenchSurface,
    ) -> Result<SelectOutcome, BarError> {
        let store = Arc::clone(&self.store);
        if self.selected.as_deref() == Some(id) {
            if !store.is_modified(id).await? {
                return Ok(SelectOutcome::AlreadySelected);
            }
            if !self.delegate.confirm_revert(id) {
                return Ok(SelectOutcome::RevertDeclined);
            }
            store.revert_modifications(id).await?;
            let base = store.load(id).await?;
            self.restore(surface, base.state)?;
            return Ok(SelectOutcome::Reverted);
        }

        match self.delegate.on_select(id) {
            SelectDecision::Veto => return Ok(SelectOutcome::Vetoed),
            SelectDecision::Handled => return Ok(SelectOutcome::Delegated),
            SelectDecision::Proceed => {}
        }

        let perspective = match store.load(id).await {
            Ok(perspective) => perspective,
            Err(error) => {
                tracing::warn!(%error, id, "failed to load perspective");
                return Err(error.into());
            }
        };
        self.restore(surface, perspective.state)?;
        self.selected = Some(id.to_string());
        Ok(SelectOutcome::Restored)
    }

    /// Record a selection performed by a controlling host, together with
    /// the snapshot it restored.
    pub fn set_selected(&mut self, id: impl Into<String>, restored: WorkbenchSnapshot) {
        self.selected = Some(id.into());
        self.last_known = Some(restored);
    }

    /// Capture the live state as a fresh base perspective, after the
    /// delegate approves.
    pub async fn create(
        &mut self,
        id: &str,
        label: &str,
        surface: &dyn WorkbenchSurface,
    ) -> Result<bool, BarError> {
        if !self.delegate.confirm_create(label) {
            return Ok(false);
        }
        let snapshot = surface.capture_state();
        let store = Arc::clone(&self.store);
        if let Err(error) = store
            .save(Perspective::new(id, label, snapshot.clone()))
            .await
        {
            tracing::warn!(%error, id, "failed to save new perspective");
            return Err(error.into());
        }
        self.selected = Some(id.to_string());
        self.last_known = Some(snapshot);
        Ok(true)
    }

    /// Persist the selected perspective's modifications as its new base.
    pub async fn save_selected(&mut self) -> Result<(), BarError> {
        let Some(selected) = self.selected.clone() else {
            return Ok(());
        };
        let store = Arc::clone(&self.store);
        store.persist_modifications(&selected).await?;
        Ok(())
    }

    /// Restore `snapshot` into the live layout, arming one echo
    /// suppression.
    fn restore(
        &mut self,
        surface: &mut dyn WorkbenchSurface,
        snapshot: WorkbenchSnapshot,
    ) -> Result<(), BarError> {
        self.suppressed_changes += 1;
        match surface.restore_state(snapshot.clone()) {
            Ok(()) => {
                self.last_known = Some(snapshot);
                Ok(())
            }
            Err(error) => {
                // The engine never mounted the state, so the echo the
                // suppression was armed for will not arrive.
                self.suppressed_changes -= 1;
                tracing::warn!(%error, "failed to restore perspective state");
                Err(error.into())
            }
        }
    }
}
