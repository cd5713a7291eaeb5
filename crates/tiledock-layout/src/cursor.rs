//! Reverse depth-first traversal with in-place mutation.
//!
//! [`ReverseCursor`] yields every node of a [`TreeStore`] post-order:
//! children are fully visited, deepest first, before their parent, and
//! siblings are visited last-to-first. After each yield the consumer may
//! commit a [`VisitDirective`] — keep the node, swap it for a replacement,
//! or delete it from its parent's child list.
//!
//! The ordering is what makes mid-traversal deletion safe: a removed node
//! only ever sits at a higher sibling index than the nodes still to come,
//! so no pending index shifts. It also guarantees a child is decided
//! strictly before its parent, which is what lets a filter pass remove a
//! container emptied by that same pass.
//!
//! Traversal state is an explicit frame stack, not the call stack, so
//! arbitrarily deep trees cannot overflow and a mutation directive can be
//! carried across the suspension point between yield and resume. The
//! `&mut` borrow of the store makes the cursor single-consumer: there is no
//! way to drive it from inside its own consumer.
//!
//! # Invariants
//!
//! 1. Every node of the store is yielded exactly once.
//! 2. A replacement's subtree is never traversed (its slot was already
//!    drained when the replacement landed).
//! 3. Once the frame stack empties the cursor is fused.

use std::fmt;

use crate::tree::{NodePath, TreeMutError, TreeStore};

/// Consumer's verdict on the node just yielded.
#[derive(Debug)]
pub enum VisitDirective<N> {
    /// Leave the node in place.
    Keep,
    /// Swap the node for `N` in its parent slot.
    Replace(N),
    /// Delete the node from its parent's child list.
    Remove,
}

/// Misuse and mutation failures raised by [`ReverseCursor`].
#[derive(Debug)]
pub enum CursorError {
    /// `commit` was called with no yielded node outstanding.
    NothingYielded,
    /// The store rejected the requested mutation.
    Mutation(TreeMutError),
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingYielded => write!(f, "commit with no yielded node outstanding"),
            Self::Mutation(source) => write!(f, "cursor mutation rejected: {source}"),
        }
    }
}

impl std::error::Error for CursorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mutation(source) => Some(source),
            Self::NothingYielded => None,
        }
    }
}

impl From<TreeMutError> for CursorError {
    fn from(source: TreeMutError) -> Self {
        Self::Mutation(source)
    }
}

/// One suspended level of the traversal.
///
/// `path: None` is the synthetic frame above the roots; it is never
/// yielded. `remaining` counts down, so the next child to descend into is
/// always `remaining - 1`.
#[derive(Debug)]
struct Frame {
    path: Option<NodePath>,
    remaining: usize,
}

/// Suspendable reverse depth-first cursor over a [`TreeStore`].
pub struct ReverseCursor<'t, S: TreeStore> {
    store: &'t mut S,
    stack: Vec<Frame>,
    yielded: Option<NodePath>,
}

impl<'t, S: TreeStore> ReverseCursor<'t, S> {
    /// Start a traversal over the store's current shape.
    pub fn new(store: &'t mut S) -> Self {
        let remaining = store.root_len();
        Self {
            store,
            stack: vec![Frame {
                path: None,
                remaining,
            }],
            yielded: None,
        }
    }

    /// Move to the next node and yield it.
    ///
    /// An uncommitted previous node is kept implicitly. Returns `None` once
    /// the traversal is exhausted, and forever after.
    pub fn advance(&mut self) -> Option<&S::Node> {
        self.yielded = None;
        let path = loop {
            let frame = self.stack.last_mut()?;
            if frame.remaining == 0 {
                let finished = self.stack.pop()?;
                match finished.path {
                    Some(path) => break path,
                    // Synthetic root frame: traversal is exhausted.
                    None => return None,
                }
            } else {
                frame.remaining -= 1;
                let index = frame.remaining;
                let child = match &frame.path {
                    Some(parent) => parent.child(index),
                    None => NodePath::root_child(index),
                };
                let remaining = self.store.child_len(&child);
                self.stack.push(Frame {
                    path: Some(child),
                    remaining,
                });
            }
        };
        self.yielded = Some(path);
        self.store.get(self.yielded.as_ref()?)
    }

    /// Path of the currently yielded node.
    #[must_use]
    pub fn current_path(&self) -> Option<&NodePath> {
        self.yielded.as_ref()
    }

    /// Commit a verdict on the currently yielded node.
    ///
    /// A failed mutation leaves the node in place (as if kept) and reports
    /// the store's error.
    pub fn commit(&mut self, directive: VisitDirective<S::Node>) -> Result<(), CursorError> {
        let path = self.yielded.take().ok_or(CursorError::NothingYielded)?;
        match directive {
            VisitDirective::Keep => Ok(()),
            VisitDirective::Replace(node) => {
                self.store.replace(&path, node)?;
                Ok(())
            }
            VisitDirective::Remove => {
                self.store.remove(&path)?;
                Ok(())
            }
        }
    }
}

impl<S: TreeStore> fmt::Debug for ReverseCursor<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReverseCursor")
            .field("depth", &self.stack.len())
            .field("yielded", &self.yielded)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigNode, NodeKind};
    use crate::tree::ConfigTree;

    fn label(node: &ConfigNode) -> String {
        match &node.kind {
            NodeKind::Panel { component, .. } => component.clone(),
            _ => node.kind_name().to_string(),
        }
    }

    fn sample_tree() -> ConfigTree {
        // row[ editor, stack[ terminal, problems ] ]
        ConfigTree::new(vec![ConfigNode::row(vec![
            ConfigNode::panel("editor"),
            ConfigNode::stack(vec![
                ConfigNode::panel("terminal"),
                ConfigNode::panel("problems"),
            ]),
        ])])
    }

    fn drain_labels(tree: &mut ConfigTree) -> Vec<String> {
        let mut cursor = ReverseCursor::new(tree);
        let mut labels = Vec::new();
        while let Some(node) = cursor.advance() {
            labels.push(label(node));
        }
        labels
    }

    #[test]
    fn yields_children_before_parents_siblings_reversed() {
        let mut tree = sample_tree();
        assert_eq!(
            drain_labels(&mut tree),
            vec!["problems", "terminal", "stack", "editor", "row"]
        );
    }

    #[test]
    fn cursor_is_fused_after_exhaustion() {
        let mut tree = ConfigTree::new(vec![ConfigNode::panel("editor")]);
        let mut cursor = ReverseCursor::new(&mut tree);
        assert!(cursor.advance().is_some());
        assert!(cursor.advance().is_none());
        assert!(cursor.advance().is_none());
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let mut tree = ConfigTree::new(Vec::new());
        let mut cursor = ReverseCursor::new(&mut tree);
        assert!(cursor.advance().is_none());
    }

    #[test]
    fn commit_without_yield_is_a_usage_error() {
        let mut tree = sample_tree();
        let mut cursor = ReverseCursor::new(&mut tree);
        let err = cursor
            .commit(VisitDirective::Remove)
            .expect_err("nothing yielded yet");
        assert!(matches!(err, CursorError::NothingYielded));
    }

    #[test]
    fn remove_mid_traversal_leaves_pending_siblings_intact() {
        let mut tree = sample_tree();
        {
            let mut cursor = ReverseCursor::new(&mut tree);
            let mut seen = Vec::new();
            while let Some(node) = cursor.advance() {
                let name = label(node);
                if name == "problems" {
                    cursor.commit(VisitDirective::Remove).expect("removable");
                }
                seen.push(name);
            }
            // Every node is still visited exactly once.
            assert_eq!(seen, vec!["problems", "terminal", "stack", "editor", "row"]);
        }
        let stack = &tree.content()[0].children().expect("row")[1];
        assert_eq!(stack.children().expect("stack").len(), 1);
    }

    #[test]
    fn replacement_subtree_is_not_traversed() {
        let mut tree = ConfigTree::new(vec![ConfigNode::panel("editor")]);
        let mut cursor = ReverseCursor::new(&mut tree);
        assert!(cursor.advance().is_some());
        cursor
            .commit(VisitDirective::Replace(ConfigNode::stack(vec![
                ConfigNode::panel("alpha"),
                ConfigNode::panel("beta"),
            ])))
            .expect("replace root");
        assert!(cursor.advance().is_none(), "replacement slot was drained");
        assert_eq!(tree.content()[0].children().expect("stack").len(), 2);
    }

    #[test]
    fn advancing_past_uncommitted_node_keeps_it() {
        let mut tree = sample_tree();
        let labels = drain_labels(&mut tree);
        assert_eq!(labels.len(), 5);
        assert_eq!(tree, sample_tree());
    }

    #[test]
    fn deep_trees_do_not_recurse() {
        let mut node = ConfigNode::panel("leaf");
        for _ in 0..1024 {
            node = ConfigNode::column(vec![node]);
        }
        let mut tree = ConfigTree::new(vec![node]);
        let mut cursor = ReverseCursor::new(&mut tree);
        let mut count = 0usize;
        while cursor.advance().is_some() {
            count += 1;
        }
        assert_eq!(count, 1025);
    }
}
