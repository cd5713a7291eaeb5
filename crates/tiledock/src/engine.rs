//! The layout-engine boundary.
//!
//! Rendering, drag physics, and live tree mutation belong to an external
//! engine; [`LayoutEngine`] is everything the workbench core asks of it.
//! The engine reports its mounted tree two ways: [`LayoutEngine::live_view`]
//! yields a metadata snapshot (kinds, sizes, tab selection) the placement
//! proposer can walk, and [`LayoutEngine::to_config`] serializes the full
//! tree back to declarative form for persistence.
//!
//! Engines fire [`StructuralEvent`]s synchronously during their own
//! mutation calls — a destroy delivers child-destroyed events before the
//! destroy returns. Handlers must not query the engine about the entity
//! being mutated mid-event; other entities are safe.

use serde::{Deserialize, Serialize};
use tiledock_core::event::BusEvent;
use tiledock_core::geometry::Bounds;
use tiledock_layout::config::ConfigNode;
use tiledock_layout::placement::{
    DropSegment, ItemKind, LayoutItem, Placement, PlacementSettings,
};
use tiledock_layout::tree::NodePath;

/// Engine-global settings the core consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Whether tab headers are rendered. Without them, header inserts have
    /// nowhere to land.
    pub show_tab_headers: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            show_tab_headers: true,
        }
    }
}

impl EngineSettings {
    /// The subset the placement proposer reads.
    #[must_use]
    pub const fn placement(&self) -> PlacementSettings {
        PlacementSettings {
            show_tab_headers: self.show_tab_headers,
        }
    }
}

/// Structural change notifications emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StructuralEvent {
    ItemCreated { path: NodePath },
    ItemDestroyed { path: NodePath },
    ItemDropped { path: NodePath },
    StateChanged,
}

impl BusEvent for StructuralEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::ItemCreated { .. } => "item_created",
            Self::ItemDestroyed { .. } => "item_destroyed",
            Self::ItemDropped { .. } => "item_dropped",
            Self::StateChanged => "state_changed",
        }
    }
}

/// Handle to a registered drag source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DragSourceId(pub u64);

/// Engine-side failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("no mounted item at {path}")]
    UnknownTarget { path: NodePath },
    #[error("layout engine rejected the operation: {message}")]
    Rejected { message: String },
}

/// Metadata snapshot of one mounted item, walkable by the placement
/// proposer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveItemView {
    pub kind: ItemKind,
    /// Rendered size in device pixels.
    pub bounds: Bounds,
    pub children: Vec<LiveItemView>,
    /// Front-most tab of a stack.
    pub active_child: Option<usize>,
    /// Whether the engine has finished mounting this item.
    pub initialized: bool,
}

impl LiveItemView {
    /// Leaf panel view.
    #[must_use]
    pub fn panel(bounds: Bounds) -> Self {
        Self {
            kind: ItemKind::Panel,
            bounds,
            children: Vec::new(),
            active_child: None,
            initialized: true,
        }
    }

    /// Container view of the given kind.
    #[must_use]
    pub fn container(kind: ItemKind, bounds: Bounds, children: Vec<LiveItemView>) -> Self {
        Self {
            kind,
            bounds,
            children,
            active_child: None,
            initialized: true,
        }
    }

    /// Set the front-most tab.
    #[must_use]
    pub fn with_active_child(mut self, index: usize) -> Self {
        self.active_child = Some(index);
        self
    }
}

impl LayoutItem for LiveItemView {
    fn kind(&self) -> ItemKind {
        self.kind
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<&Self> {
        self.children.get(index)
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn active_child(&self) -> Option<usize> {
        self.active_child
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Everything the workbench asks of a mounted docking engine.
pub trait LayoutEngine {
    /// Engine-global settings.
    fn settings(&self) -> EngineSettings;

    /// Metadata snapshot of the mounted tree.
    fn live_view(&self) -> Vec<LiveItemView>;

    /// Serialize the mounted tree back to declarative form.
    fn to_config(&self) -> Vec<ConfigNode>;

    /// Tear down the mounted tree and mount `content` instead.
    fn restore(&mut self, content: Vec<ConfigNode>) -> Result<(), EngineError>;

    /// Insert a new panel at a proposed placement.
    fn add_panel(&mut self, placement: &Placement, config: ConfigNode) -> Result<(), EngineError>;

    /// Split-insert `config` into a sub-region of the item at `parent`.
    fn drop_at_segment(
        &mut self,
        parent: &NodePath,
        segment: DropSegment,
        config: ConfigNode,
    ) -> Result<(), EngineError>;

    /// Register an external element as a drag source producing `config`.
    fn create_drag_source(&mut self, config: ConfigNode) -> DragSourceId;

    /// Unregister a drag source. Unknown ids are ignored.
    fn remove_drag_source(&mut self, id: DragSourceId);
}
