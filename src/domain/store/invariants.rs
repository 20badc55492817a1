//! Forest invariant checker
//!
//! Used by tests after every mutation, by `restore` verification and by the
//! `tabtree check` command.

use thiserror::Error;

use super::{NodeStore, Slot};
use crate::domain::value_objects::{NodeId, TabId, WindowId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{parent} lists missing child {child}")]
    DanglingChild { parent: NodeId, child: NodeId },

    #[error("{window} lists missing root {node}")]
    DanglingRoot { window: WindowId, node: NodeId },

    #[error("{node} points at missing parent {parent}")]
    MissingParent { node: NodeId, parent: NodeId },

    #[error("{node} lives in missing window {window}")]
    MissingWindow { node: NodeId, window: WindowId },

    #[error("{node} is not listed exactly once by its parent or window")]
    NotListed { node: NodeId },

    #[error("{node} is listed by {listed_by:?} but points elsewhere")]
    ParentMismatch { node: NodeId, listed_by: Slot },

    #[error("{node} has depth {found}, expected {expected}")]
    DepthMismatch {
        node: NodeId,
        expected: u32,
        found: u32,
    },

    #[error("{node} has sibling index {found}, expected {expected}")]
    IndexMismatch {
        node: NodeId,
        expected: usize,
        found: usize,
    },

    #[error("{node} is in {found}, but its root is in {expected}")]
    WindowMismatch {
        node: NodeId,
        expected: WindowId,
        found: WindowId,
    },

    #[error("{node} is its own ancestor")]
    Cycle { node: NodeId },

    #[error("{tab} index entry disagrees with the node table")]
    TabIndex { tab: TabId },

    #[error("{window} has more than one active tab")]
    MultipleActive { window: WindowId },
}

pub(super) fn check(store: &NodeStore) -> Result<(), InvariantViolation> {
    check_lists(store)?;
    check_nodes(store)?;
    check_tab_index(store)?;
    check_active(store)
}

/// Every listed id exists and points back at the list that holds it.
fn check_lists(store: &NodeStore) -> Result<(), InvariantViolation> {
    for window in store.windows() {
        for root in window.roots() {
            let node = store.get(*root).ok_or(InvariantViolation::DanglingRoot {
                window: window.id(),
                node: *root,
            })?;
            if node.parent().is_some() || node.window_id() != window.id() {
                return Err(InvariantViolation::ParentMismatch {
                    node: *root,
                    listed_by: Slot::Root(window.id()),
                });
            }
        }
    }

    for node in store.nodes() {
        for child in node.children() {
            let child_node = store.get(*child).ok_or(InvariantViolation::DanglingChild {
                parent: node.id(),
                child: *child,
            })?;
            if child_node.parent() != Some(node.id()) {
                return Err(InvariantViolation::ParentMismatch {
                    node: *child,
                    listed_by: Slot::Child(node.id()),
                });
            }
        }
    }
    Ok(())
}

/// Per-node checks: listed once, depth, index, window, acyclic.
fn check_nodes(store: &NodeStore) -> Result<(), InvariantViolation> {
    for node in store.nodes() {
        let id = node.id();

        let (slot, expected_depth, expected_window) = match node.parent() {
            Some(parent_id) => {
                let parent = store.get(parent_id).ok_or(InvariantViolation::MissingParent {
                    node: id,
                    parent: parent_id,
                })?;
                (Slot::Child(parent_id), parent.depth() + 1, parent.window_id())
            }
            None => {
                if !store.has_window(node.window_id()) {
                    return Err(InvariantViolation::MissingWindow {
                        node: id,
                        window: node.window_id(),
                    });
                }
                (Slot::Root(node.window_id()), 0, node.window_id())
            }
        };

        let siblings = store.siblings(slot);
        if !NodeStore::listed_once(siblings) {
            return Err(InvariantViolation::NotListed { node: id });
        }
        let position = siblings
            .iter()
            .position(|member| *member == id)
            .ok_or(InvariantViolation::NotListed { node: id })?;

        if node.index() != position {
            return Err(InvariantViolation::IndexMismatch {
                node: id,
                expected: position,
                found: node.index(),
            });
        }
        if node.depth() != expected_depth {
            return Err(InvariantViolation::DepthMismatch {
                node: id,
                expected: expected_depth,
                found: node.depth(),
            });
        }
        if node.window_id() != expected_window {
            return Err(InvariantViolation::WindowMismatch {
                node: id,
                expected: expected_window,
                found: node.window_id(),
            });
        }

        let mut steps = 0usize;
        let mut cursor = node.parent();
        while let Some(current) = cursor {
            if current == id || steps > store.len() {
                return Err(InvariantViolation::Cycle { node: id });
            }
            steps += 1;
            cursor = store.get(current).and_then(|n| n.parent());
        }
    }
    Ok(())
}

/// The tab index is injective and agrees with the table both ways.
fn check_tab_index(store: &NodeStore) -> Result<(), InvariantViolation> {
    for (tab, node_id) in store.tab_index() {
        let bound = store.get(*node_id).and_then(|node| node.tab_id());
        if bound != Some(*tab) {
            return Err(InvariantViolation::TabIndex { tab: *tab });
        }
    }
    for node in store.nodes() {
        if let Some(tab) = node.tab_id() {
            if store.node_for_tab(tab) != Some(node.id()) {
                return Err(InvariantViolation::TabIndex { tab });
            }
        }
    }
    Ok(())
}

fn check_active(store: &NodeStore) -> Result<(), InvariantViolation> {
    for window in store.windows() {
        let active = store
            .nodes_in_window(window.id())
            .filter(|node| node.flags().active)
            .count();
        if active > 1 {
            return Err(InvariantViolation::MultipleActive { window: window.id() });
        }
    }
    Ok(())
}
