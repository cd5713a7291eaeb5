#![forbid(unsafe_code)]

//! tiledock public facade.
//!
//! A panel-docking workbench core: declarative layout construction,
//! placement proposal for new panels, and perspective persistence with
//! bar-side synchronization. Rendering and drag physics live in an
//! external docking engine reached through [`engine::LayoutEngine`].

pub mod bar;
pub mod engine;
pub mod registry;
pub mod workbench;

// --- Layout re-exports -----------------------------------------------------

pub use tiledock_layout::builder::{BuilderError, WorkbenchBuilder};
pub use tiledock_layout::config::{
    ConfigNode, NodeIdSpec, NodeKind, PropBag, are_states_equal_ignoring_selection,
};
pub use tiledock_layout::placement::{
    DropSegment, ItemKind, Placement, PlacementTarget, SMALL_PANEL_MIN_EDGE,
    propose_place_for_new_panel,
};
pub use tiledock_layout::tree::NodePath;

// --- Persistence re-exports ------------------------------------------------

pub use tiledock_persist::{
    MemoryPerspectiveStore, MovePosition, Perspective, PerspectiveStore, StoreError,
    WorkbenchSnapshot,
};

// --- Facade types ----------------------------------------------------------

pub use bar::{
    BarDelegate, BarError, LayoutChangeOutcome, LoadPhase, PerspectiveBar, RefreshOutcome,
    SelectDecision, SelectOutcome, WorkbenchSurface,
};
pub use engine::{
    DragSourceId, EngineError, EngineSettings, LayoutEngine, LiveItemView, StructuralEvent,
};
pub use registry::{ComponentEntry, ComponentRegistry, PanelWidget, ResolutionError};
pub use workbench::{Workbench, WorkbenchError};
