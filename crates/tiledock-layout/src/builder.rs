//! Stack-based workbench construction.
//!
//! [`WorkbenchBuilder`] assembles a config tree imperatively: `make_rows`/
//! `make_columns`/`make_stack` open a subdivision, `add` appends panels to
//! the innermost open one, `finish` closes it and attaches it to its
//! parent. The builder moves through an explicit phase machine:
//!
//! ```text
//! Open --(filter/map/build)--> Finalized --(build)--> Consumed
//! ```
//!
//! Finalization auto-closes any still-open subdivisions and, when the
//! pending root list holds zero or several nodes, wraps them in an implicit
//! stack so the result always has a single root. Every misuse (adding
//! after finalization, finishing an empty stack, configuring before any
//! panel was added, building twice) is a synchronous [`BuilderError`] —
//! programmer errors, surfaced immediately and never retried.

use std::fmt;

use crate::config::{ConfigNode, NodeIdSpec, NodeKind, PropBag};
use crate::cursor::CursorError;
use crate::ops;
use crate::tree::ConfigTree;

/// Lifecycle of a [`WorkbenchBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderPhase {
    /// Accepting panels and subdivisions.
    Open,
    /// Tree frozen; filter/map may still run.
    Finalized,
    /// Content handed to the caller; every call fails.
    Consumed,
}

/// Misuse errors raised by [`WorkbenchBuilder`].
#[derive(Debug)]
pub enum BuilderError {
    /// A construction call arrived after the tree was finalized.
    AddAfterFinalize { op: &'static str },
    /// Any call arrived after `build` consumed the builder.
    BuilderConsumed { op: &'static str },
    /// `finish` with no open subdivision.
    FinishOnEmptyStack,
    /// A `set_*` call before any panel was added to the current
    /// subdivision.
    NoPanelToConfigure { setting: &'static str },
    /// A filter/map pass failed in the traversal layer.
    Traversal(CursorError),
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddAfterFinalize { op } => {
                write!(f, "{op} is not permitted after the tree was finalized")
            }
            Self::BuilderConsumed { op } => {
                write!(f, "{op} called on a builder already consumed by build()")
            }
            Self::FinishOnEmptyStack => write!(f, "finish() with no open subdivision"),
            Self::NoPanelToConfigure { setting } => write!(
                f,
                "{setting} requires a panel added to the current subdivision first"
            ),
            Self::Traversal(source) => write!(f, "builder traversal failed: {source}"),
        }
    }
}

impl std::error::Error for BuilderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Traversal(source) => Some(source),
            _ => None,
        }
    }
}

impl From<CursorError> for BuilderError {
    fn from(source: CursorError) -> Self {
        Self::Traversal(source)
    }
}

/// Kind of an open subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubdivisionKind {
    Rows,
    Columns,
    Stack,
}

/// One open subdivision, held detached until `finish` attaches it.
///
/// Child order is unaffected by the detachment: everything appended while
/// this frame is open goes through it, so it takes its parent slot at the
/// position it would have occupied at creation.
#[derive(Debug)]
struct OpenFrame {
    kind: SubdivisionKind,
    children: Vec<ConfigNode>,
    /// Index of the most recently `add`ed panel among `children`.
    last_added: Option<usize>,
}

impl OpenFrame {
    fn into_node(self) -> ConfigNode {
        match self.kind {
            SubdivisionKind::Rows => ConfigNode::row(self.children),
            SubdivisionKind::Columns => ConfigNode::column(self.children),
            SubdivisionKind::Stack => ConfigNode::stack(self.children),
        }
    }
}

/// Fluent, stack-based builder for workbench content trees.
#[derive(Debug)]
pub struct WorkbenchBuilder {
    phase: BuilderPhase,
    roots: Vec<ConfigNode>,
    open: Vec<OpenFrame>,
    /// Most recently added root-level panel (no subdivision open).
    root_last_added: Option<usize>,
}

impl Default for WorkbenchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbenchBuilder {
    /// Create an empty, open builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: BuilderPhase::Open,
            roots: Vec::new(),
            open: Vec::new(),
            root_last_added: None,
        }
    }

    /// Number of currently open subdivisions.
    #[must_use]
    pub fn open_depth(&self) -> usize {
        self.open.len()
    }

    // ---------------------------------------------------------------------
    // Construction (Open phase)
    // ---------------------------------------------------------------------

    /// Append a panel to the current subdivision (or the pending root list
    /// when none is open).
    pub fn add(
        &mut self,
        component: impl Into<String>,
        props: Option<PropBag>,
    ) -> Result<&mut Self, BuilderError> {
        self.ensure_open("add")?;
        let panel = match props {
            Some(props) => ConfigNode::panel_with_props(component, props),
            None => ConfigNode::panel(component),
        };
        match self.open.last_mut() {
            Some(frame) => {
                frame.children.push(panel);
                frame.last_added = Some(frame.children.len() - 1);
            }
            None => {
                self.roots.push(panel);
                self.root_last_added = Some(self.roots.len() - 1);
            }
        }
        Ok(self)
    }

    /// [`add`](Self::add) plus an immediate correlation id.
    pub fn add_with_id(
        &mut self,
        component: impl Into<String>,
        props: Option<PropBag>,
        id: impl Into<NodeIdSpec>,
    ) -> Result<&mut Self, BuilderError> {
        self.add(component, props)?;
        self.set_id(id)
    }

    /// Open a horizontal subdivision.
    pub fn make_rows(&mut self) -> Result<&mut Self, BuilderError> {
        self.make_container("make_rows", SubdivisionKind::Rows)
    }

    /// Open a vertical subdivision.
    pub fn make_columns(&mut self) -> Result<&mut Self, BuilderError> {
        self.make_container("make_columns", SubdivisionKind::Columns)
    }

    /// Open a tabbed subdivision.
    pub fn make_stack(&mut self) -> Result<&mut Self, BuilderError> {
        self.make_container("make_stack", SubdivisionKind::Stack)
    }

    fn make_container(
        &mut self,
        op: &'static str,
        kind: SubdivisionKind,
    ) -> Result<&mut Self, BuilderError> {
        self.ensure_open(op)?;
        self.open.push(OpenFrame {
            kind,
            children: Vec::new(),
            last_added: None,
        });
        Ok(self)
    }

    /// Close the innermost open subdivision, attaching it to its parent (or
    /// the pending root list).
    pub fn finish(&mut self) -> Result<&mut Self, BuilderError> {
        self.ensure_open("finish")?;
        let frame = self.open.pop().ok_or(BuilderError::FinishOnEmptyStack)?;
        let node = frame.into_node();
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
        Ok(self)
    }

    // ---------------------------------------------------------------------
    // Leaf configuration (Open phase)
    // ---------------------------------------------------------------------

    /// Set the relative size of the most recently added panel along its
    /// parent column's axis.
    pub fn set_relative_height(&mut self, weight: f32) -> Result<&mut Self, BuilderError> {
        self.with_last_panel("set_relative_height", |panel| {
            panel.size_weight = Some(weight);
        })
    }

    /// Set the relative size of the most recently added panel along its
    /// parent row's axis.
    pub fn set_relative_width(&mut self, weight: f32) -> Result<&mut Self, BuilderError> {
        self.with_last_panel("set_relative_width", |panel| {
            panel.size_weight = Some(weight);
        })
    }

    /// Set the tab caption of the most recently added panel.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<&mut Self, BuilderError> {
        let title = title.into();
        self.with_last_panel("set_title", |panel| panel.title = Some(title))
    }

    /// Attach correlation id(s) to the most recently added panel.
    pub fn set_id(&mut self, id: impl Into<NodeIdSpec>) -> Result<&mut Self, BuilderError> {
        let id = id.into();
        self.with_last_panel("set_id", |panel| panel.id = Some(id))
    }

    /// Mark the most recently added panel closable or pinned.
    pub fn set_closable(&mut self, closable: bool) -> Result<&mut Self, BuilderError> {
        self.with_last_panel("set_closable", |panel| panel.closable = Some(closable))
    }

    /// Replace the property bag of the most recently added panel.
    pub fn set_properties(&mut self, props: PropBag) -> Result<&mut Self, BuilderError> {
        self.with_last_panel("set_properties", |panel| {
            if let NodeKind::Panel { props: slot, .. } = &mut panel.kind {
                *slot = props;
            }
        })
    }

    fn with_last_panel(
        &mut self,
        setting: &'static str,
        mutate: impl FnOnce(&mut ConfigNode),
    ) -> Result<&mut Self, BuilderError> {
        self.ensure_open(setting)?;
        let slot = match self.open.last_mut() {
            Some(frame) => frame
                .last_added
                .and_then(|index| frame.children.get_mut(index)),
            None => self
                .root_last_added
                .and_then(|index| self.roots.get_mut(index)),
        };
        match slot {
            Some(panel) => {
                mutate(panel);
                Ok(self)
            }
            None => Err(BuilderError::NoPanelToConfigure { setting }),
        }
    }

    // ---------------------------------------------------------------------
    // Finalization and tree-wide passes
    // ---------------------------------------------------------------------

    /// Freeze the tree: close open subdivisions and wrap zero or several
    /// roots in an implicit stack. Idempotent once finalized.
    pub fn finalize(&mut self) -> Result<&mut Self, BuilderError> {
        match self.phase {
            BuilderPhase::Consumed => {
                return Err(BuilderError::BuilderConsumed { op: "finalize" });
            }
            BuilderPhase::Finalized => return Ok(self),
            BuilderPhase::Open => {}
        }
        while !self.open.is_empty() {
            self.finish()?;
        }
        self.root_last_added = None;
        if self.roots.len() != 1 {
            let roots = std::mem::take(&mut self.roots);
            self.roots.push(ConfigNode::stack(roots));
        }
        self.phase = BuilderPhase::Finalized;
        Ok(self)
    }

    /// Finalize, then remove every node failing `pred`. Returns the number
    /// removed.
    pub fn filter(
        &mut self,
        pred: impl FnMut(&ConfigNode) -> bool,
    ) -> Result<usize, BuilderError> {
        self.run_pass(|tree| ops::filter_tree(tree, pred))
    }

    /// Finalize, then remove containers failing `pred`.
    pub fn filter_containers(
        &mut self,
        pred: impl FnMut(&ConfigNode) -> bool,
    ) -> Result<usize, BuilderError> {
        self.run_pass(|tree| ops::filter_containers(tree, pred))
    }

    /// Finalize, then remove panels failing `pred`.
    pub fn filter_panels(
        &mut self,
        pred: impl FnMut(&ConfigNode) -> bool,
    ) -> Result<usize, BuilderError> {
        self.run_pass(|tree| ops::filter_panels(tree, pred))
    }

    /// Finalize, then replace every node `f` maps to `Some`. Returns the
    /// number replaced.
    pub fn map(
        &mut self,
        f: impl FnMut(&ConfigNode) -> Option<ConfigNode>,
    ) -> Result<usize, BuilderError> {
        self.run_pass(|tree| ops::transform_tree(tree, f))
    }

    /// Finalize, then map containers only.
    pub fn map_containers(
        &mut self,
        f: impl FnMut(&ConfigNode) -> Option<ConfigNode>,
    ) -> Result<usize, BuilderError> {
        self.run_pass(|tree| ops::transform_containers(tree, f))
    }

    /// Finalize, then map panels only.
    pub fn map_panels(
        &mut self,
        f: impl FnMut(&ConfigNode) -> Option<ConfigNode>,
    ) -> Result<usize, BuilderError> {
        self.run_pass(|tree| ops::transform_panels(tree, f))
    }

    fn run_pass(
        &mut self,
        pass: impl FnOnce(&mut ConfigTree) -> Result<usize, CursorError>,
    ) -> Result<usize, BuilderError> {
        self.finalize()?;
        let mut tree = ConfigTree::new(std::mem::take(&mut self.roots));
        let outcome = pass(&mut tree);
        self.roots = tree.into_content();
        Ok(outcome?)
    }

    /// Finalize if needed, hand the root content list to the caller, and
    /// invalidate the builder.
    pub fn build(&mut self) -> Result<Vec<ConfigNode>, BuilderError> {
        if self.phase == BuilderPhase::Consumed {
            return Err(BuilderError::BuilderConsumed { op: "build" });
        }
        self.finalize()?;
        self.phase = BuilderPhase::Consumed;
        Ok(std::mem::take(&mut self.roots))
    }

    fn ensure_open(&self, op: &'static str) -> Result<(), BuilderError> {
        match self.phase {
            BuilderPhase::Open => Ok(()),
            BuilderPhase::Finalized => Err(BuilderError::AddAfterFinalize { op }),
            BuilderPhase::Consumed => Err(BuilderError::BuilderConsumed { op }),
        }
    }
}

impl From<String> for NodeIdSpec {
    fn from(id: String) -> Self {
        Self::One(id)
    }
}

impl From<&str> for NodeIdSpec {
    fn from(id: &str) -> Self {
        Self::One(id.to_string())
    }
}

impl From<Vec<String>> for NodeIdSpec {
    fn from(ids: Vec<String>) -> Self {
        Self::Many(ids)
    }
}
