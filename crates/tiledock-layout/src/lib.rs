#![forbid(unsafe_code)]

//! Declarative layout model and algorithms for the tiledock workbench.
//!
//! This crate is host-agnostic: it knows nothing about rendering or about
//! the engine that owns mounted panels. It owns four things:
//!
//! - the serializable config-node tree ([`config`]),
//! - a uniform traversal layer over config and live trees ([`tree`],
//!   [`cursor`], [`ops`]),
//! - the stack-based workbench builder ([`builder`]),
//! - the placement proposer that decides where a new panel lands
//!   ([`placement`]).

pub mod builder;
pub mod config;
pub mod cursor;
pub mod ops;
pub mod placement;
pub mod tree;

pub use builder::{BuilderError, WorkbenchBuilder};
pub use config::{
    ConfigError, ConfigNode, NodeIdSpec, NodeKind, PropBag, are_states_equal_ignoring_selection,
    state_fingerprint, validate,
};
pub use cursor::{CursorError, ReverseCursor, VisitDirective};
pub use ops::{
    container_paths, filter_containers, filter_panels, filter_tree, panel_paths,
    transform_containers, transform_panels, transform_tree,
};
pub use placement::{
    DropSegment, ItemKind, LayoutItem, Placement, PlacementError, PlacementSettings,
    PlacementTarget, SMALL_PANEL_MIN_EDGE, propose_place_for_new_panel,
};
pub use tiledock_core::geometry::{Axis, Bounds};
pub use tree::{ConfigTree, NodeClass, NodePath, TreeMutError, TreeStore};
