//! Uniform access to differently-owned layout trees.
//!
//! The traversal layer ([`crate::cursor`], [`crate::ops`]) runs over two
//! concrete trees: the plain config tree this crate owns, and the live
//! mounted tree owned by the layout engine. [`TreeStore`] is the seam: a
//! path-addressed read contract with optional mutation. Stores that cannot
//! mutate (the engine owns live mutation) inherit the default
//! implementations, which fail fast with [`TreeMutError::ReadOnly`] rather
//! than silently dropping the request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigNode;

/// Child-index path addressing a node inside a multi-rooted tree.
///
/// `[2, 0]` is the first child of the third root. Paths are never empty;
/// the level above the roots is not addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Path of the `index`-th root.
    #[must_use]
    pub fn root_child(index: usize) -> Self {
        Self(vec![index])
    }

    /// Path of this node's `index`-th child.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the parent, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() > 1 {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        } else {
            None
        }
    }

    /// This node's index within its parent (or among the roots).
    #[must_use]
    pub fn index_in_parent(&self) -> usize {
        self.0.last().copied().unwrap_or_default()
    }

    /// Number of path segments (1 for a root).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The raw child indices, root-first.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

/// Classification used by scope-filtered traversals.
pub trait NodeClass {
    /// Whether the node subdivides space (as opposed to a leaf panel).
    fn is_container(&self) -> bool;
}

impl NodeClass for ConfigNode {
    fn is_container(&self) -> bool {
        ConfigNode::is_container(self)
    }
}

/// Mutation failures raised by [`TreeStore`] implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeMutError {
    /// The store does not support mutation at all.
    ReadOnly { op: &'static str, path: NodePath },
    /// The path does not address a node in this store.
    InvalidPath { path: NodePath },
}

impl fmt::Display for TreeMutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly { op, path } => {
                write!(f, "tree is read-only: cannot {op} node at {path}")
            }
            Self::InvalidPath { path } => write!(f, "no node at {path}"),
        }
    }
}

impl std::error::Error for TreeMutError {}

/// Path-addressed tree access with optional mutation.
///
/// The read half must be total over the store's current shape; the mutation
/// half defaults to failing with [`TreeMutError::ReadOnly`], which is the
/// correct behavior for views over engine-owned live trees.
pub trait TreeStore {
    type Node: NodeClass;

    /// Number of top-level roots.
    fn root_len(&self) -> usize;

    /// Node at `path`, or `None` when the path dangles.
    fn get(&self, path: &NodePath) -> Option<&Self::Node>;

    /// Number of children of the node at `path` (0 for leaves and dangling
    /// paths).
    fn child_len(&self, path: &NodePath) -> usize;

    /// Swap the node at `path` for `node`, keeping its slot.
    fn replace(&mut self, path: &NodePath, node: Self::Node) -> Result<(), TreeMutError> {
        let _ = node;
        Err(TreeMutError::ReadOnly {
            op: "replace",
            path: path.clone(),
        })
    }

    /// Delete the node at `path` from its parent's child list, returning it.
    fn remove(&mut self, path: &NodePath) -> Result<Self::Node, TreeMutError> {
        Err(TreeMutError::ReadOnly {
            op: "remove",
            path: path.clone(),
        })
    }
}

/// Owned, fully mutable config tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    content: Vec<ConfigNode>,
}

impl ConfigTree {
    /// Wrap a content slice for traversal.
    #[must_use]
    pub fn new(content: Vec<ConfigNode>) -> Self {
        Self { content }
    }

    /// The root content list.
    #[must_use]
    pub fn content(&self) -> &[ConfigNode] {
        &self.content
    }

    /// Hand the content back to the caller.
    #[must_use]
    pub fn into_content(self) -> Vec<ConfigNode> {
        self.content
    }

    fn node_at(&self, path: &NodePath) -> Option<&ConfigNode> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.content.get(*first)?;
        for index in rest {
            node = node.children()?.get(*index)?;
        }
        Some(node)
    }

    /// The sibling list containing the node at `path`.
    fn sibling_list_mut(&mut self, path: &NodePath) -> Option<&mut Vec<ConfigNode>> {
        match path.parent() {
            None => Some(&mut self.content),
            Some(parent) => {
                let (first, rest) = parent.indices().split_first()?;
                let mut node = self.content.get_mut(*first)?;
                for index in rest {
                    node = node.children_mut()?.get_mut(*index)?;
                }
                node.children_mut()
            }
        }
    }
}

impl TreeStore for ConfigTree {
    type Node = ConfigNode;

    fn root_len(&self) -> usize {
        self.content.len()
    }

    fn get(&self, path: &NodePath) -> Option<&ConfigNode> {
        self.node_at(path)
    }

    fn child_len(&self, path: &NodePath) -> usize {
        self.node_at(path)
            .and_then(ConfigNode::children)
            .map_or(0, <[ConfigNode]>::len)
    }

    fn replace(&mut self, path: &NodePath, node: ConfigNode) -> Result<(), TreeMutError> {
        let index = path.index_in_parent();
        let siblings = self
            .sibling_list_mut(path)
            .ok_or_else(|| TreeMutError::InvalidPath { path: path.clone() })?;
        let slot = siblings
            .get_mut(index)
            .ok_or_else(|| TreeMutError::InvalidPath { path: path.clone() })?;
        *slot = node;
        Ok(())
    }

    fn remove(&mut self, path: &NodePath) -> Result<ConfigNode, TreeMutError> {
        let index = path.index_in_parent();
        let siblings = self
            .sibling_list_mut(path)
            .ok_or_else(|| TreeMutError::InvalidPath { path: path.clone() })?;
        if index >= siblings.len() {
            return Err(TreeMutError::InvalidPath { path: path.clone() });
        }
        Ok(siblings.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeKind;

    fn sample_tree() -> ConfigTree {
        ConfigTree::new(vec![ConfigNode::row(vec![
            ConfigNode::panel("editor"),
            ConfigNode::stack(vec![
                ConfigNode::panel("terminal"),
                ConfigNode::panel("problems"),
            ]),
        ])])
    }

    /// Read-only wrapper exercising the default mutator implementations.
    struct Frozen(ConfigTree);

    impl TreeStore for Frozen {
        type Node = ConfigNode;

        fn root_len(&self) -> usize {
            self.0.root_len()
        }

        fn get(&self, path: &NodePath) -> Option<&ConfigNode> {
            self.0.get(path)
        }

        fn child_len(&self, path: &NodePath) -> usize {
            self.0.child_len(path)
        }
    }

    #[test]
    fn paths_navigate_nested_children() {
        let tree = sample_tree();
        let path = NodePath::root_child(0).child(1).child(0);
        let node = tree.get(&path).expect("terminal exists");
        assert!(matches!(&node.kind, NodeKind::Panel { component, .. } if component == "terminal"));
        assert_eq!(path.to_string(), "/0/1/0");
    }

    #[test]
    fn dangling_paths_read_as_absent() {
        let tree = sample_tree();
        assert!(tree.get(&NodePath::root_child(3)).is_none());
        assert_eq!(tree.child_len(&NodePath::root_child(0).child(0)), 0);
    }

    #[test]
    fn replace_swaps_the_slot_in_place() {
        let mut tree = sample_tree();
        let path = NodePath::root_child(0).child(0);
        tree.replace(&path, ConfigNode::panel("outline"))
            .expect("slot exists");
        let node = tree.get(&path).expect("replacement present");
        assert!(matches!(&node.kind, NodeKind::Panel { component, .. } if component == "outline"));
    }

    #[test]
    fn remove_deletes_from_the_sibling_list() {
        let mut tree = sample_tree();
        let path = NodePath::root_child(0).child(1).child(0);
        let removed = tree.remove(&path).expect("terminal removable");
        assert!(matches!(&removed.kind, NodeKind::Panel { component, .. } if component == "terminal"));
        assert_eq!(tree.child_len(&NodePath::root_child(0).child(1)), 1);
    }

    #[test]
    fn remove_of_dangling_path_is_an_error() {
        let mut tree = sample_tree();
        let err = tree
            .remove(&NodePath::root_child(0).child(5))
            .expect_err("no such child");
        assert!(matches!(err, TreeMutError::InvalidPath { .. }));
    }

    #[test]
    fn default_mutators_fail_fast_on_read_only_stores() {
        let mut frozen = Frozen(sample_tree());
        let path = NodePath::root_child(0);
        let err = frozen
            .replace(&path, ConfigNode::panel("outline"))
            .expect_err("read-only");
        assert!(matches!(err, TreeMutError::ReadOnly { op: "replace", .. }));
        let err = frozen.remove(&path).expect_err("read-only");
        assert!(matches!(err, TreeMutError::ReadOnly { op: "remove", .. }));
    }
}
