//! One-shot reconciliation of host tab facts into a forest
//!
//! Used at startup and as the explicit recovery path. The incremental path is
//! `EventReconciler`; this builder never runs automatically.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::domain::entities::{TabFact, TabTreeNode};
use crate::domain::store::{NodeStore, Slot};
use crate::domain::value_objects::{NodeId, TabId, WindowId};

/// Outcome of a build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub store: NodeStore,
    pub stats: BuildStats,
}

/// Counts of opener hints that were honoured or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Facts attached under their opener
    pub attached: usize,
    /// Opener hints pointing at a tab that is not in the input
    pub unresolved_openers: usize,
    /// Opener hints pointing into another window
    pub cross_window_openers: usize,
    /// Opener hints that would have closed a loop
    pub rejected_cycles: usize,
    /// Facts dropped because their tab id was already seen
    pub duplicate_tabs: usize,
}

/// Builds a consistent forest from an unordered bag of tab facts.
///
/// Deterministic: the same facts (and the same preserved ids) always give
/// the same structure.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    preserved: HashMap<TabId, NodeId>,
    id_floor: u64,
    windows: BTreeSet<WindowId>,
    focused: Option<WindowId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse node ids of tabs the previous store already knew.
    ///
    /// New nodes get ids above anything the previous store handed out.
    pub fn preserving_ids_from(mut self, store: &NodeStore) -> Self {
        self.preserved = store
            .nodes()
            .filter_map(|node| node.tab_id().map(|tab| (tab, node.id())))
            .collect();
        self.id_floor = store.last_allocated_id();
        self
    }

    /// Windows that exist even if they hold no tabs.
    pub fn with_windows(mut self, windows: impl IntoIterator<Item = WindowId>) -> Self {
        self.windows.extend(windows);
        self
    }

    pub fn with_focused_window(mut self, focused: Option<WindowId>) -> Self {
        self.focused = focused;
        self
    }

    pub fn build(&self, facts: &[TabFact], now: DateTime<Utc>) -> BuildReport {
        let mut store = NodeStore::new();
        store.reserve_ids_through(self.id_floor);
        if let Some(max_preserved) = self.preserved.values().map(|id| id.get()).max() {
            store.reserve_ids_through(max_preserved);
        }

        let mut ordered: Vec<&TabFact> = facts.iter().collect();
        ordered.sort_by_key(|fact| (fact.window_id, fact.index, fact.tab_id));

        for window in &self.windows {
            store.ensure_window(*window);
        }

        let mut duplicates = 0;
        let mut seen = HashSet::new();
        let mut placed: Vec<(&TabFact, NodeId)> = Vec::with_capacity(ordered.len());
        for fact in ordered {
            if !seen.insert(fact.tab_id) {
                duplicates += 1;
                continue;
            }
            let id = match self.preserved.get(&fact.tab_id) {
                Some(id) => *id,
                None => store.allocate_id(),
            };
            let node = TabTreeNode::from_fact(id, fact, now);
            store.insert_node(node, Slot::Root(fact.window_id), usize::MAX);
            placed.push((fact, id));
        }

        let mut stats = BuildStats {
            duplicate_tabs: duplicates,
            ..BuildStats::default()
        };

        for (fact, id) in &placed {
            let Some(opener_tab) = fact.opener else {
                continue;
            };
            let Some(opener) = store.node_for_tab(opener_tab) else {
                stats.unresolved_openers += 1;
                continue;
            };
            let opener_window = store.get(opener).map(|n| n.window_id());
            if opener_window != Some(fact.window_id) {
                stats.cross_window_openers += 1;
                continue;
            }
            if opener == *id || store.is_descendant(opener, *id) {
                stats.rejected_cycles += 1;
                continue;
            }

            store.detach(*id);
            let position = store.insertion_position(Slot::Child(opener), fact.index, None);
            store.attach(*id, Slot::Child(opener), position);
            stats.attached += 1;
        }

        let windows: Vec<WindowId> = store.windows().map(|w| w.id()).collect();
        for window in windows {
            store.compact_host_indices(window);
            store.keep_single_active(window);
        }
        store.set_focused_window(self.focused);

        BuildReport { store, stats }
    }
}
