//! DragDropEngine - validated reparent / reorder from a user gesture
//!
//! The target index is a position in the target list *after* the dragged node
//! has been taken out of it, so it ranges over `0..=len` of that list.

use tracing::debug;

use crate::domain::entities::DragSnapshot;
use crate::domain::store::{NodeStore, Slot};
use crate::domain::value_objects::{NodeId, WindowId};
use crate::error::{MoveRejection, Reference, TabTreeError, TabTreeResult};

/// A validated move, ready to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    pub node: NodeId,
    pub target: Slot,
    pub index: usize,
}

/// Windows whose tab strip a move touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub from: WindowId,
    pub to: WindowId,
}

impl MoveOutcome {
    pub fn crossed_windows(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DragDropEngine;

impl DragDropEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run every check without touching the store.
    pub fn validate(
        &self,
        store: &NodeStore,
        node: NodeId,
        target: Slot,
        index: usize,
    ) -> Result<MovePlan, MoveRejection> {
        if !store.contains(node) {
            return Err(MoveRejection::NodeNotFound(node));
        }

        match target {
            Slot::Child(parent) => {
                if !store.contains(parent) {
                    return Err(MoveRejection::TargetNotFound(parent));
                }
                if parent == node {
                    return Err(MoveRejection::SelfParent);
                }
                if store.is_descendant(parent, node) {
                    return Err(MoveRejection::Cycle { target: parent });
                }
            }
            Slot::Root(window) => {
                if !store.has_window(window) {
                    return Err(MoveRejection::WindowNotFound(window));
                }
            }
        }

        let members = store.siblings(target);
        let max = members.iter().filter(|member| **member != node).count();
        if index > max {
            return Err(MoveRejection::OutOfRange { index, max });
        }

        Ok(MovePlan {
            node,
            target,
            index,
        })
    }

    /// Validate, snapshot, and move `node` with its whole subtree.
    ///
    /// On rejection nothing is mutated.
    pub fn propose_move(
        &self,
        store: &mut NodeStore,
        node: NodeId,
        target: Slot,
        index: usize,
    ) -> TabTreeResult<(DragSnapshot, MoveOutcome)> {
        let plan = self
            .validate(store, node, target, index)
            .map_err(|reason| {
                debug!(node = %node, %reason, "move rejected");
                TabTreeError::StructuralViolation { node, reason }
            })?;
        self.execute(store, plan)
    }

    fn execute(
        &self,
        store: &mut NodeStore,
        plan: MovePlan,
    ) -> TabTreeResult<(DragSnapshot, MoveOutcome)> {
        let snapshot = take_snapshot(store, plan.node)
            .ok_or(TabTreeError::UnknownReference(Reference::Node(plan.node)))?;
        store.detach(plan.node);
        store.attach(plan.node, plan.target, plan.index);

        let to = store
            .get(plan.node)
            .map(|n| n.window_id())
            .unwrap_or(snapshot.prior_window);
        debug!(node = %plan.node, target = ?plan.target, index = plan.index, "node moved");
        let outcome = MoveOutcome {
            from: snapshot.prior_window,
            to,
        };
        Ok((snapshot, outcome))
    }

    /// Put a moved node back exactly where its snapshot says, without validation.
    pub fn revert_move(
        &self,
        store: &mut NodeStore,
        snapshot: &DragSnapshot,
    ) -> TabTreeResult<MoveOutcome> {
        let Some(from) = store.get(snapshot.node).map(|n| n.window_id()) else {
            return Err(TabTreeError::UnknownReference(Reference::Node(snapshot.node)));
        };

        let slot = match snapshot.prior_parent {
            Some(parent) => Slot::Child(parent),
            None => Slot::Root(snapshot.prior_window),
        };
        store.detach(snapshot.node);
        store.attach(snapshot.node, slot, snapshot.prior_index);

        debug!(node = %snapshot.node, "move reverted");
        Ok(MoveOutcome {
            from,
            to: snapshot.prior_window,
        })
    }
}

fn take_snapshot(store: &NodeStore, id: NodeId) -> Option<DragSnapshot> {
    let node = store.get(id)?;
    Some(DragSnapshot {
        node: id,
        prior_parent: node.parent(),
        prior_window: node.window_id(),
        prior_depth: node.depth(),
        prior_index: node.index(),
        prior_position: node.host_index(),
    })
}
