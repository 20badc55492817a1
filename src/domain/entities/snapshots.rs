//! Snapshots taken before structural mutations so they can be reverted

use chrono::{DateTime, Utc};

use super::TabTreeNode;
use crate::domain::value_objects::{NodeId, OperationId, WindowId};

/// Where a node sat before a drag.
///
/// Taken immediately before the reparent; `revert_move` replays it without
/// re-validating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSnapshot {
    pub node: NodeId,
    pub prior_parent: Option<NodeId>,
    pub prior_window: WindowId,
    pub prior_depth: u32,
    pub prior_index: usize,
    /// Host tab strip position before the move
    pub prior_position: usize,
}

/// One node captured by a smart close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedNode {
    /// Node data as it was; its `children` list is rebuilt on restore
    pub node: TabTreeNode,
    pub parent: Option<NodeId>,
    pub index: usize,
    pub collapsed: bool,
}

/// Everything removed by one close operation, in pre-order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseSnapshot {
    pub operation_id: OperationId,
    pub window_id: WindowId,
    pub entries: Vec<ClosedNode>,
    pub taken_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CloseSnapshot {
    /// The node the close was requested on
    pub fn root(&self) -> Option<NodeId> {
        self.entries.first().map(|entry| entry.node.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
