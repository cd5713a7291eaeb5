//! Filter and transform passes over a [`TreeStore`].
//!
//! Thin drivers on top of [`ReverseCursor`]: the cursor supplies ordering
//! and mutation, these functions supply the policy. Scoped variants
//! (containers-only, panels-only) wrap the caller's predicate or mapping so
//! out-of-scope nodes are kept or left unchanged — every node is still
//! fully drained through the cursor protocol, never skipped.

use crate::cursor::{CursorError, ReverseCursor, VisitDirective};
use crate::tree::{NodeClass, NodePath, TreeStore};

/// Remove every node for which `pred` returns `false`.
///
/// Children are decided strictly before their parent, so a container
/// emptied by this pass is seen (and can itself be removed) in the same
/// pass. Returns the number of nodes removed; a second run with the same
/// pure predicate removes nothing.
pub fn filter_tree<S: TreeStore>(
    store: &mut S,
    mut pred: impl FnMut(&S::Node) -> bool,
) -> Result<usize, CursorError> {
    let mut cursor = ReverseCursor::new(store);
    let mut removed = 0usize;
    while let Some(node) = cursor.advance() {
        if pred(node) {
            cursor.commit(VisitDirective::Keep)?;
        } else {
            cursor.commit(VisitDirective::Remove)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Filter that only tests containers; panels always survive.
pub fn filter_containers<S: TreeStore>(
    store: &mut S,
    mut pred: impl FnMut(&S::Node) -> bool,
) -> Result<usize, CursorError> {
    filter_tree(store, |node| !node.is_container() || pred(node))
}

/// Filter that only tests leaf panels; containers always survive.
pub fn filter_panels<S: TreeStore>(
    store: &mut S,
    mut pred: impl FnMut(&S::Node) -> bool,
) -> Result<usize, CursorError> {
    filter_tree(store, |node| node.is_container() || pred(node))
}

/// Replace every node for which `f` returns `Some`.
///
/// Returning `None` keeps the node without issuing a replacement call,
/// which is what lets an identity pass run over a read-only tree. Returns
/// the number of nodes replaced. A replacement's subtree is not revisited.
pub fn transform_tree<S: TreeStore>(
    store: &mut S,
    mut f: impl FnMut(&S::Node) -> Option<S::Node>,
) -> Result<usize, CursorError> {
    let mut cursor = ReverseCursor::new(store);
    let mut replaced = 0usize;
    while let Some(node) = cursor.advance() {
        match f(node) {
            Some(replacement) => {
                cursor.commit(VisitDirective::Replace(replacement))?;
                replaced += 1;
            }
            None => cursor.commit(VisitDirective::Keep)?,
        }
    }
    Ok(replaced)
}

/// Transform that only maps containers; panels pass through unchanged.
pub fn transform_containers<S: TreeStore>(
    store: &mut S,
    mut f: impl FnMut(&S::Node) -> Option<S::Node>,
) -> Result<usize, CursorError> {
    transform_tree(store, |node| if node.is_container() { f(node) } else { None })
}

/// Transform that only maps leaf panels; containers pass through unchanged.
pub fn transform_panels<S: TreeStore>(
    store: &mut S,
    mut f: impl FnMut(&S::Node) -> Option<S::Node>,
) -> Result<usize, CursorError> {
    transform_tree(store, |node| if node.is_container() { None } else { f(node) })
}

/// Paths of all leaf panels, in traversal order.
pub fn panel_paths<S: TreeStore>(store: &mut S) -> Vec<NodePath> {
    collect_paths(store, false)
}

/// Paths of all containers, in traversal order.
pub fn container_paths<S: TreeStore>(store: &mut S) -> Vec<NodePath> {
    collect_paths(store, true)
}

fn collect_paths<S: TreeStore>(store: &mut S, containers: bool) -> Vec<NodePath> {
    let mut cursor = ReverseCursor::new(store);
    let mut paths = Vec::new();
    while let Some(node) = cursor.advance() {
        if node.is_container() == containers {
            if let Some(path) = cursor.current_path() {
                paths.push(path.clone());
            }
        }
    }
    paths
}
