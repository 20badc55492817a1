//! TabTreeEngine - the single entry point for hosts and presentation
//!
//! Owns the store and every piece of state around it. Each call runs to
//! completion before returning; host commands are dispatched as a side effect
//! and their results come back through `on_command_result`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::close::{CloseDecision, CloseReceipt, CloseUndoManager, UndoReceipt};
use crate::application::drag_drop::{DragDropEngine, MoveOutcome};
use crate::application::persistence::SnapshotScheduler;
use crate::application::reconcile::{EventReconciler, Reconciled, TabEvent};
use crate::application::ui_state::{CollapseState, SearchState};
use crate::config::EngineConfig;
use crate::domain::entities::{DragSnapshot, TabFact};
use crate::domain::ports::{Clock, CommandResult, TabCommand, TabHost};
use crate::domain::services::{
    decode, encode, BuildStats, SerializedForest, TreeBuilder, ViewProjector, VisibleNode,
};
use crate::domain::store::{NodeStore, Slot};
use crate::domain::value_objects::{CommandId, NodeId, OperationId, TabId, WindowId};
use crate::error::{Reference, TabTreeError, TabTreeResult};

/// Outcome of `restore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    pub nodes: usize,
    pub repaired: usize,
}

pub struct TabTreeEngine {
    store: NodeStore,
    collapse: CollapseState,
    search: SearchState,
    reconciler: EventReconciler,
    drag: DragDropEngine,
    close: CloseUndoManager,
    scheduler: SnapshotScheduler,
    config: EngineConfig,
    host: Arc<dyn TabHost>,
    clock: Arc<dyn Clock>,
    next_command: u64,
    /// `CreateTab` commands issued by undo, by the node they recreate
    recreating: HashMap<CommandId, NodeId>,
}

impl TabTreeEngine {
    pub fn new(config: EngineConfig, host: Arc<dyn TabHost>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: NodeStore::new(),
            collapse: CollapseState::new(),
            search: SearchState::new(config.search.min_query_len),
            reconciler: EventReconciler::new(),
            drag: DragDropEngine::new(),
            close: CloseUndoManager::new(config.undo_window()),
            scheduler: SnapshotScheduler::new(config.debounce()),
            config,
            host,
            clock,
            next_command: 0,
            recreating: HashMap::new(),
        }
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn collapse(&self) -> &CollapseState {
        &self.collapse
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Restored nodes still waiting for the host to report their tab
    pub fn awaiting_host(&self) -> usize {
        self.recreating.len()
    }

    // === Build / resync ===

    /// Rebuild the forest from host facts, keeping node ids of known tabs.
    ///
    /// The explicit recovery path; never called automatically.
    pub fn resync(
        &mut self,
        facts: &[TabFact],
        windows: impl IntoIterator<Item = WindowId>,
        focused: Option<WindowId>,
    ) -> BuildStats {
        let report = TreeBuilder::new()
            .preserving_ids_from(&self.store)
            .with_windows(windows)
            .with_focused_window(focused)
            .build(facts, self.clock.now());

        self.store = report.store;
        self.collapse.retain_existing(&self.store);
        self.mark_dirty();
        debug!(nodes = self.store.len(), attached = report.stats.attached, "forest rebuilt");
        report.stats
    }

    // === Events ===

    pub fn apply_event(&mut self, event: &TabEvent) -> TabTreeResult<Reconciled> {
        let outcome = self
            .reconciler
            .apply(&mut self.store, event, self.clock.now())?;
        self.collapse.forget(outcome.removed.iter().copied());
        if outcome.changed {
            self.mark_dirty();
        }
        Ok(outcome)
    }

    /// Fold in the asynchronous result of a command this engine issued.
    pub fn on_command_result(&mut self, result: &CommandResult) -> TabTreeResult<()> {
        let command = result.command();
        let recreated = self.recreating.remove(&command);

        match result {
            CommandResult::Failed { reason, .. } => {
                warn!(command = %command, %reason, "host command failed");
                Err(TabTreeError::HostCommandFailure {
                    command,
                    reason: reason.clone(),
                })
            }
            CommandResult::Succeeded { tab, .. } => {
                if let (Some(node), Some(tab)) = (recreated, tab) {
                    self.bind_recreated(node, *tab);
                }
                Ok(())
            }
        }
    }

    /// Give a restored node the id of the tab the host created for it.
    fn bind_recreated(&mut self, node: NodeId, tab: TabId) {
        if !self.store.contains(node) {
            self.discard_recreated(node, tab);
            return;
        }

        let mut host_index = None;
        let mut was_active = false;
        if let Some(duplicate) = self.store.node_for_tab(tab) {
            if duplicate == node {
                return;
            }
            // The host's created event won the race and made a leaf of its own.
            if let Some(removed) = self.store.remove_promoting(duplicate) {
                host_index = Some(removed.host_index());
                was_active = removed.flags().active;
                self.collapse.forget([duplicate]);
                debug!(node = %node, merged = %duplicate, tab = %tab, "merged recreated tab");
            }
        }

        self.store.bind_tab(node, tab);
        if let Some(index) = host_index {
            self.store.move_host_index(node, index);
        }
        if was_active {
            self.store.set_active(node, self.clock.now());
        }
        if let Some(window) = self.store.get(node).map(|n| n.window_id()) {
            self.store.compact_host_indices(window);
        }
        self.mark_dirty();
    }

    /// The node was closed again while its tab was being recreated: close that tab too.
    fn discard_recreated(&mut self, node: NodeId, tab: TabId) {
        match self.store.node_for_tab(tab) {
            // The host's created event came first and made a leaf for it.
            Some(stray) => {
                let window = self.store.get(stray).map(|n| n.window_id());
                self.store.remove_promoting(stray);
                self.collapse.forget([stray]);
                if let Some(window) = window {
                    self.store.compact_host_indices(window);
                }
                self.reconciler.expect_removal([tab]);
            }
            None => self.reconciler.discard_created(tab),
        }
        debug!(node = %node, tab = %tab, "recreated node is gone, closing its tab");
        self.issue(TabCommand::CloseTab { tab });
        self.mark_dirty();
    }

    // === Drag and drop ===

    /// Reparent or reorder `node` (with its subtree) and move the host tabs to match.
    pub fn propose_move(
        &mut self,
        node: NodeId,
        target: Slot,
        index: usize,
    ) -> TabTreeResult<DragSnapshot> {
        let (snapshot, outcome) = self.drag.propose_move(&mut self.store, node, target, index)?;
        self.sync_host_strip(node, outcome);
        self.mark_dirty();
        Ok(snapshot)
    }

    pub fn revert_move(&mut self, snapshot: &DragSnapshot) -> TabTreeResult<()> {
        let outcome = self.drag.revert_move(&mut self.store, snapshot)?;
        self.sync_host_strip(snapshot.node, outcome);
        self.mark_dirty();
        Ok(())
    }

    /// Renumber touched windows to tree order and tell the host about every tab that moved.
    fn sync_host_strip(&mut self, moved: NodeId, outcome: MoveOutcome) {
        let moved_subtree: HashSet<NodeId> = self.store.subtree(moved).into_iter().collect();
        let mut windows = vec![outcome.to];
        if outcome.crossed_windows() {
            windows.push(outcome.from);
            self.store.keep_single_active(outcome.to);
        }

        for window in windows {
            let before: HashMap<NodeId, usize> = self
                .store
                .nodes_in_window(window)
                .map(|node| (node.id(), node.host_index()))
                .collect();
            self.store.align_host_indices_to_tree(window);

            let mut changed: BTreeMap<usize, TabId> = BTreeMap::new();
            for node in self.store.nodes_in_window(window) {
                let crossed = outcome.crossed_windows() && moved_subtree.contains(&node.id());
                let shifted = before.get(&node.id()) != Some(&node.host_index());
                if let (true, Some(tab)) = (crossed || shifted, node.tab_id()) {
                    changed.insert(node.host_index(), tab);
                }
            }

            for (index, tab) in changed {
                let target_window = outcome.crossed_windows().then_some(window);
                self.issue(TabCommand::MoveTab {
                    tab,
                    index,
                    window: target_window,
                });
            }
        }
    }

    // === Close / undo ===

    /// The configured confirmation threshold
    pub fn confirm_threshold(&self) -> usize {
        self.config.close.confirm_threshold
    }

    pub fn close_subtree(&mut self, node: NodeId, threshold: usize) -> TabTreeResult<CloseDecision> {
        let decision = self.close.close_subtree(
            &mut self.store,
            &mut self.collapse,
            node,
            threshold,
            self.clock.now(),
        )?;
        if let CloseDecision::Closed(receipt) = &decision {
            self.after_close(receipt);
        }
        Ok(decision)
    }

    pub fn confirm_close(&mut self, node: NodeId) -> TabTreeResult<CloseReceipt> {
        let receipt =
            self.close
                .confirm_close(&mut self.store, &mut self.collapse, node, self.clock.now())?;
        self.after_close(&receipt);
        Ok(receipt)
    }

    fn after_close(&mut self, receipt: &CloseReceipt) {
        self.reconciler
            .expect_removal(receipt.closed_tabs.iter().copied());
        for tab in &receipt.closed_tabs {
            self.issue(TabCommand::CloseTab { tab: *tab });
        }
        self.mark_dirty();
    }

    pub fn undo_close(&mut self, operation: OperationId) -> TabTreeResult<UndoReceipt> {
        let receipt = self.close.undo_close(
            &mut self.store,
            &mut self.collapse,
            operation,
            self.clock.now(),
        )?;

        for node in &receipt.restored {
            let Some(restored) = self.store.get(*node) else {
                continue;
            };
            let opener = restored
                .parent()
                .and_then(|parent| self.store.get(parent))
                .and_then(|parent| parent.tab_id());
            let command = TabCommand::CreateTab {
                url: restored.url().to_string(),
                opener,
                window: Some(receipt.window_id),
            };
            let id = self.issue(command);
            self.recreating.insert(id, *node);
        }
        self.mark_dirty();
        Ok(receipt)
    }

    /// Most recent close that can still be undone
    pub fn latest_undoable(&self) -> Option<OperationId> {
        self.close.latest_undoable(self.clock.now())
    }

    // === Presentation ===

    /// Set the search text used by `get_visible_nodes`
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search.set(text);
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// Visible nodes for the current search text and collapse set.
    pub fn get_visible_nodes(&self) -> Vec<VisibleNode> {
        self.project(self.search.effective_query(), self.collapse.as_set())
    }

    /// Visible nodes for explicit inputs; does not touch engine state.
    pub fn project(&self, search: &str, collapsed: &HashSet<NodeId>) -> Vec<VisibleNode> {
        ViewProjector::new(&self.store)
            .with_search(search)
            .with_collapsed(collapsed)
            .project()
    }

    /// Returns whether the node is collapsed afterwards.
    pub fn toggle_collapse(&mut self, node: NodeId) -> TabTreeResult<bool> {
        if !self.store.contains(node) {
            return Err(TabTreeError::UnknownReference(Reference::Node(node)));
        }
        let collapsed = self.collapse.toggle(node);
        self.mark_dirty();
        Ok(collapsed)
    }

    /// Activate a node locally and ask the host to follow.
    pub fn activate(&mut self, node: NodeId) -> TabTreeResult<()> {
        let window = self
            .store
            .set_active(node, self.clock.now())
            .ok_or(TabTreeError::UnknownReference(Reference::Node(node)))?;

        if let Some(tab) = self.store.get(node).and_then(|n| n.tab_id()) {
            self.issue(TabCommand::ActivateTab { tab });
        }
        if self.store.focused_window() != Some(window) {
            self.store.set_focused_window(Some(window));
            self.issue(TabCommand::FocusWindow { window });
        }
        self.mark_dirty();
        Ok(())
    }

    // === Persistence ===

    pub fn snapshot(&self) -> SerializedForest {
        encode(&self.store, self.collapse.as_set(), self.clock.now())
    }

    /// Replace the forest with a decoded snapshot.
    pub fn restore(&mut self, forest: &SerializedForest) -> TabTreeResult<RestoreReport> {
        let restored = decode(forest)?;
        if restored.repaired > 0 {
            warn!(repaired = restored.repaired, "snapshot needed repair");
        }

        self.store = restored.store;
        self.collapse = CollapseState::from_set(restored.collapsed);
        self.close = CloseUndoManager::new(self.config.undo_window());
        self.reconciler = EventReconciler::new();
        self.recreating.clear();
        self.scheduler.take();
        Ok(RestoreReport {
            nodes: self.store.len(),
            repaired: restored.repaired,
        })
    }

    /// A snapshot once mutations have been quiet for the debounce period.
    pub fn take_snapshot_if_due(&mut self) -> Option<SerializedForest> {
        if !self.scheduler.is_due(self.clock.now()) {
            return None;
        }
        let covered = self.scheduler.take();
        debug!(mutations = covered, "snapshot due");
        Some(self.snapshot())
    }

    /// Snapshot now if anything changed since the last one, ignoring the debounce.
    pub fn flush_snapshot(&mut self) -> Option<SerializedForest> {
        if !self.scheduler.has_pending() {
            return None;
        }
        self.scheduler.take();
        Some(self.snapshot())
    }

    pub fn check_invariants(&self) -> TabTreeResult<()> {
        self.store.check_invariants().map_err(TabTreeError::from)
    }

    // === Internals ===

    fn mark_dirty(&mut self) {
        self.scheduler.mark_dirty(self.clock.now());
    }

    fn issue(&mut self, command: TabCommand) -> CommandId {
        self.next_command += 1;
        let id = CommandId::new(self.next_command);
        debug!(id = %id, ?command, "dispatching host command");
        self.host.dispatch(id, command);
        id
    }
}
