//! Toggle engine: downward propagation and bottom-up aggregation.
//!
//! Every operation takes a tree by reference and returns a new tree; the
//! input is never modified. Ancestor states are recomputed over the whole
//! forest after each toggle, which is O(n) and fine for sidebar-sized trees.

use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{CheckState, Node, Tree};

/// Aggregate state of a parent from its children.
///
/// Any indeterminate child, or a strict subset of checked children, makes the
/// parent indeterminate. An empty slice aggregates to unchecked.
pub fn aggregate(children: &[Node]) -> CheckState {
    let n = children.len();
    let checked = children.iter().filter(|c| c.check_state == CheckState::Checked).count();
    let indeterminate = children
        .iter()
        .filter(|c| c.check_state == CheckState::Indeterminate)
        .count();

    if indeterminate > 0 || (checked > 0 && checked < n) {
        CheckState::Indeterminate
    } else if n > 0 && checked == n {
        CheckState::Checked
    } else {
        CheckState::Unchecked
    }
}

fn recompute(node: &mut Node) {
    if node.is_leaf() {
        return;
    }
    for child in node.children.iter_mut() {
        recompute(child);
    }
    node.check_state = aggregate(&node.children);
}

/// Recompute every parent's state, children first.
pub fn recompute_all(tree: &mut Tree) {
    for root in tree.roots_mut() {
        recompute(root);
    }
}

fn clear_indeterminate_leaves(node: &mut Node) {
    if node.is_leaf() {
        if node.check_state == CheckState::Indeterminate {
            trace!(id = %node.id, "leaf was indeterminate, resetting to unchecked");
            node.check_state = CheckState::Unchecked;
        }
        return;
    }
    for child in node.children.iter_mut() {
        clear_indeterminate_leaves(child);
    }
}

/// Re-establish the tri-state invariants on a tree of unknown provenance.
///
/// Indeterminate leaves become unchecked, then aggregation is re-run.
pub fn normalize(mut tree: Tree) -> Tree {
    for root in tree.roots_mut() {
        clear_indeterminate_leaves(root);
    }
    recompute_all(&mut tree);
    tree
}

fn set_subtree(node: &mut Node, state: CheckState) {
    node.check_state = state;
    for child in node.children.iter_mut() {
        set_subtree(child, state);
    }
}

/// Toggle the check state of `id`, reporting unknown ids.
#[instrument(level = "debug", skip(tree))]
pub fn try_toggle_check(tree: &Tree, id: &str) -> DomainResult<Tree> {
    let mut next = tree.clone();
    let target = next
        .find_mut(id)
        .ok_or_else(|| DomainError::UnknownNodeId(id.to_string()))?;

    let new_state = target.check_state.toggled();
    if target.is_leaf() {
        target.check_state = new_state;
    } else {
        // Unconditional overwrite: descendants do not keep individual state
        set_subtree(target, new_state);
    }
    debug!("{} -> {}", id, new_state);

    recompute_all(&mut next);
    Ok(next)
}

/// Toggle the check state of `id`; unknown ids leave the tree unchanged.
pub fn toggle_check(tree: &Tree, id: &str) -> Tree {
    try_toggle_check(tree, id).unwrap_or_else(|e| {
        debug!("toggle_check ignored: {}", e);
        tree.clone()
    })
}

/// Flip the disclosure flag of `id`, reporting unknown ids.
#[instrument(level = "debug", skip(tree))]
pub fn try_toggle_open(tree: &Tree, id: &str) -> DomainResult<Tree> {
    let mut next = tree.clone();
    let target = next
        .find_mut(id)
        .ok_or_else(|| DomainError::UnknownNodeId(id.to_string()))?;
    target.open = !target.open;
    debug!("{} open={}", id, target.open);
    Ok(next)
}

/// Flip the disclosure flag of `id`; unknown ids leave the tree unchanged.
pub fn toggle_open(tree: &Tree, id: &str) -> Tree {
    try_toggle_open(tree, id).unwrap_or_else(|e| {
        debug!("toggle_open ignored: {}", e);
        tree.clone()
    })
}
