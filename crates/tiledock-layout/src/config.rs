//! Declarative workbench configuration tree.
//!
//! [`ConfigNode`] is the serializable description of a panel arrangement:
//! rows and columns subdividing space, stacks presenting children as tabs,
//! and panels as leaves. The same shape is produced by the builder, handed
//! to the layout engine for mounting, captured back from the engine, and
//! persisted inside perspectives.
//!
//! # Invariants
//!
//! 1. Only container kinds carry children; panels structurally cannot.
//! 2. A stack's `active_index`, when present, addresses one of its
//!    children. This is the *selection field*: it records which tab is
//!    front-most and is deliberately excluded from
//!    [`are_states_equal_ignoring_selection`] and [`state_fingerprint`],
//!    because flipping tabs must never count as a structural edit.
//! 3. `size_weight` is a positive, finite relative weight among siblings.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::tree::NodePath;

/// Free-form panel properties, forwarded untouched to the component.
pub type PropBag = serde_json::Map<String, serde_json::Value>;

/// One or several correlation ids attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeIdSpec {
    One(String),
    Many(Vec<String>),
}

/// A node in the declarative layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigNode {
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Tab / header caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeIdSpec>,
    /// Relative share of the parent's space along its main axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closable: Option<bool>,
}

/// Structural kind of a [`ConfigNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Row {
        children: Vec<ConfigNode>,
    },
    Column {
        children: Vec<ConfigNode>,
    },
    Stack {
        children: Vec<ConfigNode>,
        /// Index of the front-most tab. Selection only; see module docs.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active_index: Option<usize>,
    },
    Panel {
        /// Registered component name resolved at mount time.
        component: String,
        #[serde(default, skip_serializing_if = "PropBag::is_empty")]
        props: PropBag,
    },
}

impl ConfigNode {
    /// Leaf panel rendering `component`.
    #[must_use]
    pub fn panel(component: impl Into<String>) -> Self {
        Self::from_kind(NodeKind::Panel {
            component: component.into(),
            props: PropBag::new(),
        })
    }

    /// Leaf panel with properties.
    #[must_use]
    pub fn panel_with_props(component: impl Into<String>, props: PropBag) -> Self {
        Self::from_kind(NodeKind::Panel {
            component: component.into(),
            props,
        })
    }

    /// Horizontal subdivision.
    #[must_use]
    pub fn row(children: Vec<ConfigNode>) -> Self {
        Self::from_kind(NodeKind::Row { children })
    }

    /// Vertical subdivision.
    #[must_use]
    pub fn column(children: Vec<ConfigNode>) -> Self {
        Self::from_kind(NodeKind::Column { children })
    }

    /// Tabbed container.
    #[must_use]
    pub fn stack(children: Vec<ConfigNode>) -> Self {
        Self::from_kind(NodeKind::Stack {
            children,
            active_index: None,
        })
    }

    fn from_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            title: None,
            id: None,
            size_weight: None,
            closable: None,
        }
    }

    /// Whether this node subdivides space (row, column, or stack).
    #[must_use]
    pub const fn is_container(&self) -> bool {
        !matches!(self.kind, NodeKind::Panel { .. })
    }

    /// Whether this node is a leaf panel.
    #[must_use]
    pub const fn is_panel(&self) -> bool {
        matches!(self.kind, NodeKind::Panel { .. })
    }

    /// Children of a container node; `None` for panels.
    #[must_use]
    pub fn children(&self) -> Option<&[ConfigNode]> {
        match &self.kind {
            NodeKind::Row { children }
            | NodeKind::Column { children }
            | NodeKind::Stack { children, .. } => Some(children),
            NodeKind::Panel { .. } => None,
        }
    }

    /// Mutable children of a container node; `None` for panels.
    pub fn children_mut(&mut self) -> Option<&mut Vec<ConfigNode>> {
        match &mut self.kind {
            NodeKind::Row { children }
            | NodeKind::Column { children }
            | NodeKind::Stack { children, .. } => Some(children),
            NodeKind::Panel { .. } => None,
        }
    }

    /// Stable name of the kind, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Row { .. } => "row",
            NodeKind::Column { .. } => "column",
            NodeKind::Stack { .. } => "stack",
            NodeKind::Panel { .. } => "panel",
        }
    }
}

// =========================================================================
// Validation
// =========================================================================

/// Structural validation failures, naming the offending node path.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyComponentName { path: NodePath },
    ActiveIndexOutOfRange { path: NodePath, index: usize, len: usize },
    InvalidSizeWeight { path: NodePath, weight: f32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyComponentName { path } => {
                write!(f, "panel at {path} has an empty component name")
            }
            Self::ActiveIndexOutOfRange { path, index, len } => write!(
                f,
                "stack at {path} selects tab {index} but has {len} children"
            ),
            Self::InvalidSizeWeight { path, weight } => {
                write!(f, "node at {path} has non-positive size weight {weight}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate a content slice, rejecting the first malformed node found.
pub fn validate(content: &[ConfigNode]) -> Result<(), ConfigError> {
    for (index, node) in content.iter().enumerate() {
        validate_node(node, &NodePath::root_child(index))?;
    }
    Ok(())
}

fn validate_node(node: &ConfigNode, path: &NodePath) -> Result<(), ConfigError> {
    if let Some(weight) = node.size_weight {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ConfigError::InvalidSizeWeight {
                path: path.clone(),
                weight,
            });
        }
    }
    match &node.kind {
        NodeKind::Panel { component, .. } => {
            if component.is_empty() {
                return Err(ConfigError::EmptyComponentName { path: path.clone() });
            }
        }
        NodeKind::Stack {
            children,
            active_index,
        } => {
            if let Some(index) = *active_index {
                if index >= children.len() {
                    return Err(ConfigError::ActiveIndexOutOfRange {
                        path: path.clone(),
                        index,
                        len: children.len(),
                    });
                }
            }
        }
        NodeKind::Row { .. } | NodeKind::Column { .. } => {}
    }
    if let Some(children) = node.children() {
        for (index, child) in children.iter().enumerate() {
            validate_node(child, &path.child(index))?;
        }
    }
    Ok(())
}

// =========================================================================
// Selection-insensitive comparison
// =========================================================================

/// Structural equality over two content slices that ignores which stack tab
/// is active at every depth.
///
/// Two states differing only in `active_index` values compare equal; any
/// other field difference (title, component, weight, props, shape) compares
/// unequal.
#[must_use]
pub fn are_states_equal_ignoring_selection(a: &[ConfigNode], b: &[ConfigNode]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(left, right)| nodes_equal(left, right))
}

fn nodes_equal(a: &ConfigNode, b: &ConfigNode) -> bool {
    if a.title != b.title
        || a.id != b.id
        || a.size_weight != b.size_weight
        || a.closable != b.closable
    {
        return false;
    }
    match (&a.kind, &b.kind) {
        (NodeKind::Row { children: ca }, NodeKind::Row { children: cb })
        | (NodeKind::Column { children: ca }, NodeKind::Column { children: cb })
        | (
            NodeKind::Stack { children: ca, .. },
            NodeKind::Stack { children: cb, .. },
        ) => are_states_equal_ignoring_selection(ca, cb),
        (
            NodeKind::Panel {
                component: na,
                props: pa,
            },
            NodeKind::Panel {
                component: nb,
                props: pb,
            },
        ) => na == nb && pa == pb,
        _ => false,
    }
}

/// Selection-insensitive fingerprint of a content slice.
///
/// Agrees with [`are_states_equal_ignoring_selection`]: states that compare
/// equal hash identically, so the fingerprint can serve as a cheap dirty
/// pre-check before a full structural comparison.
#[must_use]
pub fn state_fingerprint(content: &[ConfigNode]) -> u64 {
    let mut hasher = FxHasher::default();
    hash_content(content, &mut hasher);
    hasher.finish()
}

fn hash_content(content: &[ConfigNode], hasher: &mut FxHasher) {
    content.len().hash(hasher);
    for node in content {
        hash_node(node, hasher);
    }
}

fn hash_node(node: &ConfigNode, hasher: &mut FxHasher) {
    node.title.hash(hasher);
    match &node.id {
        None => 0u8.hash(hasher),
        Some(NodeIdSpec::One(id)) => {
            1u8.hash(hasher);
            id.hash(hasher);
        }
        Some(NodeIdSpec::Many(ids)) => {
            2u8.hash(hasher);
            ids.hash(hasher);
        }
    }
    node.size_weight.map(f32::to_bits).hash(hasher);
    node.closable.hash(hasher);
    match &node.kind {
        NodeKind::Row { children } => {
            b'r'.hash(hasher);
            hash_content(children, hasher);
        }
        NodeKind::Column { children } => {
            b'c'.hash(hasher);
            hash_content(children, hasher);
        }
        NodeKind::Stack { children, .. } => {
            // active_index deliberately omitted.
            b's'.hash(hasher);
            hash_content(children, hasher);
        }
        NodeKind::Panel { component, props } => {
            b'p'.hash(hasher);
            component.hash(hasher);
            props.len().hash(hasher);
            for (key, value) in props {
                key.hash(hasher);
                hash_json(value, hasher);
            }
        }
    }
}

fn hash_json(value: &serde_json::Value, hasher: &mut FxHasher) {
    match value {
        serde_json::Value::Null => 0u8.hash(hasher),
        serde_json::Value::Bool(b) => {
            1u8.hash(hasher);
            b.hash(hasher);
        }
        serde_json::Value::Number(n) => {
            2u8.hash(hasher);
            n.to_string().hash(hasher);
        }
        serde_json::Value::String(s) => {
            3u8.hash(hasher);
            s.hash(hasher);
        }
        serde_json::Value::Array(items) => {
            4u8.hash(hasher);
            items.len().hash(hasher);
            for item in items {
                hash_json(item, hasher);
            }
        }
        serde_json::Value::Object(map) => {
            5u8.hash(hasher);
            map.len().hash(hasher);
            for (key, item) in map {
                key.hash(hasher);
                hash_json(item, hasher);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tab_stack(active: Option<usize>) -> ConfigNode {
        let mut stack = ConfigNode::stack(vec![
            ConfigNode::panel("editor"),
            ConfigNode::panel("terminal"),
        ]);
        if let NodeKind::Stack { active_index, .. } = &mut stack.kind {
            *active_index = active;
        }
        stack
    }

    #[test]
    fn serde_round_trip_preserves_structure() {
        let mut panel = ConfigNode::panel("editor");
        panel.title = Some("Editor".to_string());
        panel.size_weight = Some(70.0);
        let content = vec![ConfigNode::row(vec![panel, two_tab_stack(Some(1))])];

        let json = serde_json::to_string(&content).expect("serialize");
        let back: Vec<ConfigNode> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, content);
    }

    #[test]
    fn kind_tag_is_snake_case() {
        let json = serde_json::to_value(ConfigNode::panel("editor")).expect("serialize");
        assert_eq!(json["kind"], "panel");
        let json = serde_json::to_value(two_tab_stack(None)).expect("serialize");
        assert_eq!(json["kind"], "stack");
    }

    #[test]
    fn selection_differences_compare_equal() {
        let a = vec![ConfigNode::row(vec![two_tab_stack(Some(0))])];
        let b = vec![ConfigNode::row(vec![two_tab_stack(Some(1))])];
        let c = vec![ConfigNode::row(vec![two_tab_stack(None)])];
        assert!(are_states_equal_ignoring_selection(&a, &b));
        assert!(are_states_equal_ignoring_selection(&a, &c));
    }

    #[test]
    fn non_selection_differences_compare_unequal() {
        let a = vec![two_tab_stack(Some(0))];
        let mut titled = two_tab_stack(Some(0));
        titled.title = Some("Tools".to_string());
        assert!(!are_states_equal_ignoring_selection(&a, &[titled]));

        let reshaped = vec![ConfigNode::stack(vec![ConfigNode::panel("editor")])];
        assert!(!are_states_equal_ignoring_selection(&a, &reshaped));

        let mut reweighted = two_tab_stack(Some(0));
        reweighted.size_weight = Some(30.0);
        assert!(!are_states_equal_ignoring_selection(&a, &[reweighted]));
    }

    #[test]
    fn fingerprint_agrees_with_selection_insensitive_equality() {
        let a = vec![two_tab_stack(Some(0))];
        let b = vec![two_tab_stack(Some(1))];
        assert_eq!(state_fingerprint(&a), state_fingerprint(&b));

        let mut titled = two_tab_stack(Some(0));
        titled.title = Some("Tools".to_string());
        assert_ne!(state_fingerprint(&a), state_fingerprint(&[titled]));
    }

    #[test]
    fn validate_rejects_out_of_range_active_index() {
        let content = vec![two_tab_stack(Some(2))];
        let err = validate(&content).expect_err("index 2 of 2 children");
        assert!(matches!(
            err,
            ConfigError::ActiveIndexOutOfRange { index: 2, len: 2, .. }
        ));
    }

    #[test]
    fn validate_rejects_empty_component_and_bad_weight() {
        let content = vec![ConfigNode::panel("")];
        assert!(matches!(
            validate(&content),
            Err(ConfigError::EmptyComponentName { .. })
        ));

        let mut panel = ConfigNode::panel("editor");
        panel.size_weight = Some(-1.0);
        assert!(matches!(
            validate(&[ConfigNode::row(vec![panel])]),
            Err(ConfigError::InvalidSizeWeight { .. })
        ));
    }
}
