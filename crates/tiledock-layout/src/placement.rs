//! Placement proposal for new panels.
//!
//! Given a view of the mounted layout tree, [`propose_place_for_new_panel`]
//! decides where an incoming panel should land: which container receives
//! it, and whether it arrives as a tab, a split, or an ordinal sibling.
//!
//! The algorithm anchors on the largest currently-visible panel — the user
//! is most likely to want new content near where the most space is — and
//! then reads the anchor's parent:
//!
//! - a cramped tab-stack gains a tab (no further subdivision when space is
//!   already tight),
//! - a roomy tab-stack is split along its shorter axis, which keeps the
//!   resulting regions roughly square instead of producing ever-thinner
//!   slivers,
//! - a row/column parent (a shape well-formed trees do not produce, since
//!   containers always wrap a stack) degrades to an ordinal insert right
//!   after the anchor.
//!
//! The proposer never mutates anything; it only names a drop point for the
//! engine to act on.

use serde::{Deserialize, Serialize};
use tiledock_core::geometry::{Axis, Bounds};

use crate::tree::NodePath;

/// Edge length (device-independent units) below which a stack is
/// considered too small to subdivide further; new panels tab into it
/// instead when tab headers are enabled.
pub const SMALL_PANEL_MIN_EDGE: u32 = 100;

/// Structural kind of a mounted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Row,
    Column,
    Stack,
    Panel,
}

/// Sub-region of a container receiving a split- or tab-insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropSegment {
    Left,
    Right,
    Top,
    Bottom,
    Header,
    Body,
}

/// Read-only view of one mounted layout item.
///
/// Implemented by engine node adapters and by test fixtures; the proposer
/// needs nothing beyond this.
pub trait LayoutItem {
    fn kind(&self) -> ItemKind;
    fn child_count(&self) -> usize;
    fn child(&self, index: usize) -> Option<&Self>;
    /// Rendered size in device pixels.
    fn bounds(&self) -> Bounds;
    /// Front-most tab of a stack. `None` reads as the first child.
    fn active_child(&self) -> Option<usize>;
    /// Whether the engine has finished mounting this item.
    fn is_initialized(&self) -> bool {
        true
    }
}

/// How the new panel enters its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementTarget {
    /// Append to the parent's child list.
    Append,
    /// Insert at an ordinal position among the parent's children.
    At(usize),
    /// Split- or tab-insert into a sub-region of the parent.
    Segment(DropSegment),
}

/// A proposed drop point: the receiving container (`None` is the root
/// content list) and how to enter it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub parent: Option<NodePath>,
    pub target: PlacementTarget,
}

/// Precondition failures for placement requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// No layout is mounted to place into.
    NoLayout,
}

impl std::fmt::Display for PlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoLayout => write!(f, "no layout is mounted"),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Engine settings the proposer consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlacementSettings {
    /// Whether the engine renders tab headers; without them a header
    /// insert has nowhere to land.
    pub show_tab_headers: bool,
}

/// The anchor panel and everything needed to judge its parent.
#[derive(Debug)]
struct Candidate {
    area: u64,
    index_in_parent: usize,
    parent_path: Option<NodePath>,
    parent_kind: Option<ItemKind>,
    parent_bounds: Bounds,
    parent_child_count: usize,
}

/// Compute where a new panel should be inserted into the mounted tree.
#[must_use]
pub fn propose_place_for_new_panel<N: LayoutItem>(
    roots: &[N],
    settings: &PlacementSettings,
) -> Placement {
    let mut best: Option<Candidate> = None;
    for (index, root) in roots.iter().enumerate() {
        scan(root, &NodePath::root_child(index), None, &mut best);
    }

    let Some(anchor) = best else {
        return empty_tree_placement(roots);
    };

    match anchor.parent_kind {
        Some(ItemKind::Stack) => {
            let segment = if anchor.parent_child_count == 0 {
                DropSegment::Body
            } else if anchor.parent_bounds.fits_within(SMALL_PANEL_MIN_EDGE)
                && settings.show_tab_headers
            {
                DropSegment::Header
            } else if anchor.parent_bounds.long_axis() == Axis::Vertical {
                DropSegment::Bottom
            } else {
                DropSegment::Right
            };
            Placement {
                parent: anchor.parent_path,
                target: PlacementTarget::Segment(segment),
            }
        }
        // Rows, columns, bare roots: ordinal insert right after the anchor.
        _ => Placement {
            parent: anchor.parent_path,
            target: PlacementTarget::At(anchor.index_in_parent + 1),
        },
    }
}

/// Depth-first scan for the largest visible, initialized panel.
///
/// Hidden tabs (children of a stack other than its active one) are skipped
/// with their whole subtree. Strictly-greater area wins, so ties resolve
/// to the first panel encountered in traversal order.
fn scan<N: LayoutItem>(
    node: &N,
    path: &NodePath,
    parent: Option<(&N, &NodePath)>,
    best: &mut Option<Candidate>,
) {
    if node.kind() == ItemKind::Panel {
        if !node.is_initialized() {
            return;
        }
        let area = node.bounds().area();
        let better = best.as_ref().is_none_or(|current| area > current.area);
        if better {
            *best = Some(Candidate {
                area,
                index_in_parent: path.index_in_parent(),
                parent_path: parent.map(|(_, parent_path)| parent_path.clone()),
                parent_kind: parent.map(|(node, _)| node.kind()),
                parent_bounds: parent.map(|(node, _)| node.bounds()).unwrap_or_default(),
                parent_child_count: parent.map_or(0, |(node, _)| node.child_count()),
            });
        }
        return;
    }

    let active = node.active_child().unwrap_or(0);
    for index in 0..node.child_count() {
        if node.kind() == ItemKind::Stack && index != active {
            continue;
        }
        let Some(child) = node.child(index) else {
            continue;
        };
        scan(child, &path.child(index), Some((node, path)), best);
    }
}

/// Placement for a tree with no visible panel: the root content list, or
/// the deepest single-container chain under the first root.
fn empty_tree_placement<N: LayoutItem>(roots: &[N]) -> Placement {
    let Some(first) = roots.first() else {
        return Placement {
            parent: None,
            target: PlacementTarget::Append,
        };
    };
    if first.kind() == ItemKind::Panel {
        return Placement {
            parent: None,
            target: PlacementTarget::Append,
        };
    }
    let mut node = first;
    let mut path = NodePath::root_child(0);
    while node.child_count() == 1 {
        match node.child(0) {
            Some(child) if child.kind() != ItemKind::Panel => {
                path = path.child(0);
                node = child;
            }
            _ => break,
        }
    }
    Placement {
        parent: Some(path),
        target: PlacementTarget::Append,
    }
}
