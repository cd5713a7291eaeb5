//! Model-based properties for the traversal and filter layer.
//!
//! Random config trees are filtered through the cursor-driven pass and
//! compared against a straightforward recursive reference model; agreement
//! pins down ordering, cascade, and idempotence at once.

use proptest::prelude::*;
use tiledock_layout::config::{ConfigNode, NodeKind};
use tiledock_layout::tree::ConfigTree;
use tiledock_layout::{
    are_states_equal_ignoring_selection, filter_tree, panel_paths, state_fingerprint,
    transform_tree,
};

fn node_strategy() -> impl Strategy<Value = ConfigNode> {
    let leaf = "[a-e]{1,6}".prop_map(|name| ConfigNode::panel(name));
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(ConfigNode::row),
            prop::collection::vec(inner.clone(), 0..5).prop_map(ConfigNode::column),
            prop::collection::vec(inner, 0..5).prop_map(ConfigNode::stack),
        ]
    })
}

fn content_strategy() -> impl Strategy<Value = Vec<ConfigNode>> {
    prop::collection::vec(node_strategy(), 0..4)
}

fn keep_panel(node: &ConfigNode) -> bool {
    match &node.kind {
        NodeKind::Panel { component, .. } => component.contains('a'),
        _ => true,
    }
}

/// The predicate under test: panels must contain an 'a', containers must
/// be non-empty at the time they are visited.
fn pred(node: &ConfigNode) -> bool {
    if node.is_panel() {
        keep_panel(node)
    } else {
        node.children().is_some_and(|children| !children.is_empty())
    }
}

/// Reference model: bottom-up filtering with the same policy.
fn model_filter(nodes: Vec<ConfigNode>) -> Vec<ConfigNode> {
    nodes
        .into_iter()
        .filter_map(|mut node| {
            if node.is_panel() {
                return keep_panel(&node).then_some(node);
            }
            if let Some(children) = node.children_mut() {
                let filtered = model_filter(std::mem::take(children));
                *children = filtered;
            }
            node.children()
                .is_some_and(|children| !children.is_empty())
                .then_some(node)
        })
        .collect()
}

fn count_panels(nodes: &[ConfigNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node.children() {
            Some(children) => count_panels(children),
            None => 1,
        })
        .sum()
}

/// Force every stack's selection to a fixed policy.
fn pin_selection(nodes: &mut [ConfigNode], last: bool) {
    for node in nodes {
        if let NodeKind::Stack {
            children,
            active_index,
        } = &mut node.kind
        {
            *active_index = if children.is_empty() {
                None
            } else if last {
                Some(children.len() - 1)
            } else {
                Some(0)
            };
        }
        if let Some(children) = node.children_mut() {
            pin_selection(children, last);
        }
    }
}

proptest! {
    #[test]
    fn filter_agrees_with_the_reference_model(content in content_strategy()) {
        let mut tree = ConfigTree::new(content.clone());
        filter_tree(&mut tree, pred).expect("config trees support removal");
        let expected = model_filter(content);
        prop_assert_eq!(tree.content(), expected.as_slice());
    }

    #[test]
    fn filter_is_idempotent(content in content_strategy()) {
        let mut tree = ConfigTree::new(content);
        filter_tree(&mut tree, pred).expect("first pass");
        let second = filter_tree(&mut tree, pred).expect("second pass");
        prop_assert_eq!(second, 0);
    }

    #[test]
    fn identity_transform_changes_nothing(content in content_strategy()) {
        let mut tree = ConfigTree::new(content.clone());
        let replaced = transform_tree(&mut tree, |_| None).expect("identity pass");
        prop_assert_eq!(replaced, 0);
        prop_assert_eq!(tree.content(), content.as_slice());
    }

    #[test]
    fn panel_path_enumeration_is_complete(content in content_strategy()) {
        let expected = count_panels(&content);
        let mut tree = ConfigTree::new(content);
        prop_assert_eq!(panel_paths(&mut tree).len(), expected);
    }

    #[test]
    fn selection_never_affects_equality_or_fingerprint(content in content_strategy()) {
        let mut first_active = content.clone();
        let mut last_active = content;
        pin_selection(&mut first_active, false);
        pin_selection(&mut last_active, true);
        prop_assert!(are_states_equal_ignoring_selection(
            &first_active,
            &last_active
        ));
        prop_assert_eq!(
            state_fingerprint(&first_active),
            state_fingerprint(&last_active)
        );
    }
}
