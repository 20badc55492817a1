//! CloseUndoManager - smart close with confirmation threshold and undo window

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::application::ui_state::CollapseState;
use crate::domain::entities::{CloseSnapshot, ClosedNode};
use crate::domain::store::{NodeStore, Slot};
use crate::domain::value_objects::{NodeId, OperationId, TabId, WindowId};
use crate::error::{Reference, TabTreeError, TabTreeResult};

/// Default undo window
pub const DEFAULT_UNDO_WINDOW_SECS: u64 = 10;

/// Expired operation ids remembered for "too late" reporting
pub const TOMBSTONE_LIMIT: usize = 128;

/// Result of asking to close a subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseDecision {
    /// The candidate set reached the threshold; nothing was touched
    NeedsConfirmation { node: NodeId, candidate_count: usize },
    Closed(CloseReceipt),
}

impl CloseDecision {
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, CloseDecision::NeedsConfirmation { .. })
    }

    pub fn candidate_count(&self) -> usize {
        match self {
            CloseDecision::NeedsConfirmation {
                candidate_count, ..
            } => *candidate_count,
            CloseDecision::Closed(receipt) => receipt.closed.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReceipt {
    pub operation_id: OperationId,
    pub window_id: WindowId,
    /// Removed nodes in pre-order
    pub closed: Vec<NodeId>,
    /// Host tabs to close, in the same order
    pub closed_tabs: Vec<TabId>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoReceipt {
    pub operation_id: OperationId,
    /// Window the subtree went back into
    pub window_id: WindowId,
    /// Re-inserted nodes in pre-order, all awaiting a host tab
    pub restored: Vec<NodeId>,
}

#[derive(Debug)]
pub struct CloseUndoManager {
    undo_window: TimeDelta,
    next_operation: u64,
    snapshots: BTreeMap<OperationId, CloseSnapshot>,
    tombstones: VecDeque<(OperationId, DateTime<Utc>)>,
}

impl Default for CloseUndoManager {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(DEFAULT_UNDO_WINDOW_SECS as i64))
    }
}

impl CloseUndoManager {
    pub fn new(undo_window: TimeDelta) -> Self {
        Self {
            undo_window,
            next_operation: 0,
            snapshots: BTreeMap::new(),
            tombstones: VecDeque::new(),
        }
    }

    pub fn undo_window(&self) -> TimeDelta {
        self.undo_window
    }

    /// `node` and all its descendants in pre-order.
    pub fn candidates(&self, store: &NodeStore, node: NodeId) -> TabTreeResult<Vec<NodeId>> {
        if !store.contains(node) {
            return Err(TabTreeError::UnknownReference(Reference::Node(node)));
        }
        Ok(store.subtree(node))
    }

    /// Close `node` with its subtree, unless the candidate count reaches `threshold`.
    ///
    /// A threshold of 0 never asks.
    pub fn close_subtree(
        &mut self,
        store: &mut NodeStore,
        collapse: &mut CollapseState,
        node: NodeId,
        threshold: usize,
        now: DateTime<Utc>,
    ) -> TabTreeResult<CloseDecision> {
        let candidate_count = self.candidates(store, node)?.len();
        if threshold > 0 && candidate_count >= threshold {
            debug!(node = %node, candidate_count, threshold, "close needs confirmation");
            return Ok(CloseDecision::NeedsConfirmation {
                node,
                candidate_count,
            });
        }
        self.confirm_close(store, collapse, node, now)
            .map(CloseDecision::Closed)
    }

    /// Close without the threshold test. The candidate set is recomputed.
    pub fn confirm_close(
        &mut self,
        store: &mut NodeStore,
        collapse: &mut CollapseState,
        node: NodeId,
        now: DateTime<Utc>,
    ) -> TabTreeResult<CloseReceipt> {
        self.purge_expired(now);
        let order = self.candidates(store, node)?;

        let mut entries = Vec::with_capacity(order.len());
        for id in &order {
            if let Some(current) = store.get(*id) {
                entries.push(ClosedNode {
                    node: current.clone(),
                    parent: current.parent(),
                    index: current.index(),
                    collapsed: collapse.is_collapsed(*id),
                });
            }
        }
        let window_id = entries
            .first()
            .map(|entry| entry.node.window_id())
            .ok_or(TabTreeError::UnknownReference(Reference::Node(node)))?;

        let removed = store.remove_subtree(node);
        store.compact_host_indices(window_id);
        collapse.forget(order.iter().copied());

        self.next_operation += 1;
        let operation_id = OperationId::new(self.next_operation);
        let expires_at = now
            .checked_add_signed(self.undo_window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.snapshots.insert(
            operation_id,
            CloseSnapshot {
                operation_id,
                window_id,
                entries,
                taken_at: now,
                expires_at,
            },
        );

        debug!(operation = %operation_id, node = %node, closed = removed.len(), "subtree closed");
        Ok(CloseReceipt {
            operation_id,
            window_id,
            closed: order,
            closed_tabs: removed.iter().filter_map(|n| n.tab_id()).collect(),
            expires_at,
        })
    }

    /// Re-insert a closed subtree at its original parent and positions.
    ///
    /// Restored nodes have no host tab until the host reports one.
    pub fn undo_close(
        &mut self,
        store: &mut NodeStore,
        collapse: &mut CollapseState,
        operation: OperationId,
        now: DateTime<Utc>,
    ) -> TabTreeResult<UndoReceipt> {
        self.purge_expired(now);
        let Some(snapshot) = self.snapshots.remove(&operation) else {
            return Err(match self.tombstone(operation) {
                Some(expired_at) => TabTreeError::UndoExpired {
                    operation,
                    expired_at,
                },
                None => TabTreeError::NothingToUndo(operation),
            });
        };

        let window_id = restore_window(store, snapshot.window_id);
        let mut restored = Vec::with_capacity(snapshot.len());
        for (position, entry) in snapshot.entries.into_iter().enumerate() {
            let id = entry.node.id();
            if store.contains(id) {
                continue;
            }

            let slot = match entry.parent {
                Some(parent) if position > 0 || store.contains(parent) => Slot::Child(parent),
                _ => Slot::Root(window_id),
            };
            let mut node = entry.node;
            node.tab_id = None;
            node.flags.active = false;
            node.window_id = window_id;

            store.insert_node(node, slot, entry.index);
            collapse.set(id, entry.collapsed);
            restored.push(id);
        }

        let landed = restored
            .first()
            .and_then(|id| store.get(*id))
            .map(|n| n.window_id())
            .unwrap_or(window_id);
        store.align_host_indices_to_tree(landed);

        debug!(operation = %operation, restored = restored.len(), window = %landed, "close undone");
        Ok(UndoReceipt {
            operation_id: operation,
            window_id: landed,
            restored,
        })
    }

    /// Move expired snapshots to the tombstone list. Returns how many expired.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<OperationId> = self
            .snapshots
            .values()
            .filter(|snapshot| snapshot.is_expired(now))
            .map(|snapshot| snapshot.operation_id)
            .collect();

        for operation in &expired {
            if let Some(snapshot) = self.snapshots.remove(operation) {
                self.tombstones
                    .push_back((snapshot.operation_id, snapshot.expires_at));
            }
        }
        while self.tombstones.len() > TOMBSTONE_LIMIT {
            self.tombstones.pop_front();
        }
        expired.len()
    }

    fn tombstone(&self, operation: OperationId) -> Option<DateTime<Utc>> {
        self.tombstones
            .iter()
            .find(|(id, _)| *id == operation)
            .map(|(_, expired_at)| *expired_at)
    }

    pub fn snapshot(&self, operation: OperationId) -> Option<&CloseSnapshot> {
        self.snapshots.get(&operation)
    }

    /// Most recent operation that can still be undone
    pub fn latest_undoable(&self, now: DateTime<Utc>) -> Option<OperationId> {
        self.snapshots
            .values()
            .rev()
            .find(|snapshot| !snapshot.is_expired(now))
            .map(|snapshot| snapshot.operation_id)
    }

    pub fn pending(&self) -> usize {
        self.snapshots.len()
    }
}

/// The recorded window, else the focused one, else the first, else the recorded id recreated.
fn restore_window(store: &NodeStore, recorded: WindowId) -> WindowId {
    if store.has_window(recorded) {
        return recorded;
    }
    store
        .focused_window()
        .or_else(|| store.windows().next().map(|w| w.id()))
        .unwrap_or(recorded)
}
