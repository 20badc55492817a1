//! EventReconciler - applies host events to the store one at a time

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::event::TabEvent;
use crate::domain::store::{NodeStore, Slot};
use crate::domain::value_objects::{NodeId, TabId, WindowId};
use crate::error::{Reference, TabTreeError, TabTreeResult};

/// What one event did to the forest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Whether anything observable changed
    pub changed: bool,
    /// Node created for a `tab_created` event
    pub created: Option<NodeId>,
    /// Nodes that left the store
    pub removed: Vec<NodeId>,
}

impl Reconciled {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }
}

/// Incremental path from host events to the forest.
///
/// Unknown tab or window ids are logged and reported as
/// `TabTreeError::UnknownReference`; the store is left untouched. A full
/// rebuild is never triggered from here.
#[derive(Debug, Default)]
pub struct EventReconciler {
    /// Tabs the engine closed itself; their `tab_removed` is an acknowledgement
    closed_by_engine: HashSet<TabId>,
    /// Recreated tabs closed again before the host reported them
    discarded: HashSet<TabId>,
}

impl EventReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember tabs a smart close removed so their `tab_removed` events are no-ops.
    pub fn expect_removal(&mut self, tabs: impl IntoIterator<Item = TabId>) {
        self.closed_by_engine.extend(tabs);
    }

    /// A tab the engine is closing before its `tab_created` arrived.
    ///
    /// That `tab_created` is dropped and the later `tab_removed` acknowledged.
    pub fn discard_created(&mut self, tab: TabId) {
        self.discarded.insert(tab);
        self.closed_by_engine.insert(tab);
    }

    pub fn awaiting_removal(&self) -> usize {
        self.closed_by_engine.len()
    }

    pub fn apply(
        &mut self,
        store: &mut NodeStore,
        event: &TabEvent,
        now: DateTime<Utc>,
    ) -> TabTreeResult<Reconciled> {
        match event {
            TabEvent::TabCreated { .. } => self.created(store, event, now),
            TabEvent::TabRemoved { tab } => self.removed(store, *tab),
            TabEvent::TabMoved { tab, index } => moved(store, *tab, *index),
            TabEvent::TabUpdated { tab, .. } => updated(store, event, *tab, now),
            TabEvent::TabActivated { tab, window } => activated(store, *tab, *window, now),
            TabEvent::TabAttached { tab, window, index } => {
                attached(store, *tab, *window, *index, now)
            }
            TabEvent::WindowCreated { window } => {
                let known = store.has_window(*window);
                store.ensure_window(*window);
                Ok(if known {
                    Reconciled::unchanged()
                } else {
                    Reconciled::changed()
                })
            }
            TabEvent::WindowRemoved { window } => {
                if !store.has_window(*window) {
                    return Err(unknown(Reference::Window(*window), event));
                }
                let removed: Vec<NodeId> =
                    store.remove_window(*window).iter().map(|n| n.id()).collect();
                debug!(window = %window, nodes = removed.len(), "window removed");
                Ok(Reconciled {
                    changed: true,
                    created: None,
                    removed,
                })
            }
            TabEvent::WindowFocusChanged { window } => {
                if let Some(id) = window {
                    if !store.has_window(*id) {
                        return Err(unknown(Reference::Window(*id), event));
                    }
                }
                let changed = store.focused_window() != *window;
                store.set_focused_window(*window);
                Ok(Reconciled {
                    changed,
                    ..Reconciled::default()
                })
            }
        }
    }

    fn created(
        &mut self,
        store: &mut NodeStore,
        event: &TabEvent,
        now: DateTime<Utc>,
    ) -> TabTreeResult<Reconciled> {
        let Some(fact) = event.as_fact() else {
            return Ok(Reconciled::unchanged());
        };
        if self.discarded.remove(&fact.tab_id) {
            debug!(tab = %fact.tab_id, "created event for a tab already being closed");
            return Ok(Reconciled::unchanged());
        }
        // A reused id: the host has reopened a tab id we still think is closing.
        self.closed_by_engine.remove(&fact.tab_id);

        if let Some(existing) = store.node_for_tab(fact.tab_id) {
            // Already bound, e.g. a recreated tab whose command result came first.
            debug!(tab = %fact.tab_id, node = %existing, "created event for a known tab");
            store.move_host_index(existing, fact.index);
            if let Some(slot) = store.slot_of(existing) {
                let position = store.insertion_position(slot, fact.index, Some(existing));
                store.reposition(existing, position);
            }
            return Ok(Reconciled::changed());
        }

        let slot = match fact.opener.and_then(|opener| store.node_for_tab(opener)) {
            Some(opener) if store.get(opener).map(|n| n.window_id()) == Some(fact.window_id) => {
                Slot::Child(opener)
            }
            Some(opener) => {
                debug!(tab = %fact.tab_id, opener = %opener, "opener in another window, placing as root");
                Slot::Root(fact.window_id)
            }
            None => Slot::Root(fact.window_id),
        };

        store.ensure_window(fact.window_id);
        store.shift_host_indices_up(fact.window_id, fact.index);
        let position = store.insertion_position(slot, fact.index, None);
        let id = store.insert_tab(&fact, slot, position, now);
        if fact.flags.active {
            store.set_active(id, now);
        }

        debug!(tab = %fact.tab_id, node = %id, ?slot, position, "tab created");
        Ok(Reconciled {
            changed: true,
            created: Some(id),
            removed: Vec::new(),
        })
    }

    fn removed(&mut self, store: &mut NodeStore, tab: TabId) -> TabTreeResult<Reconciled> {
        let Some(id) = store.node_for_tab(tab) else {
            if self.closed_by_engine.remove(&tab) {
                self.discarded.remove(&tab);
                debug!(tab = %tab, "removal of a tab closed by smart close");
                return Ok(Reconciled::unchanged());
            }
            warn!(tab = %tab, event = "tab_removed", "dropping event for unknown tab");
            return Err(TabTreeError::UnknownReference(Reference::Tab(tab)));
        };

        let window = store.get(id).map(|n| n.window_id());
        store.remove_promoting(id);
        if let Some(window) = window {
            store.compact_host_indices(window);
        }
        debug!(tab = %tab, node = %id, "tab removed, children promoted");
        Ok(Reconciled {
            changed: true,
            created: None,
            removed: vec![id],
        })
    }
}

fn unknown(reference: Reference, event: &TabEvent) -> TabTreeError {
    warn!(reference = %reference, event = event.kind(), "dropping event for unknown reference");
    TabTreeError::UnknownReference(reference)
}

fn lookup(store: &NodeStore, tab: TabId, event: &TabEvent) -> TabTreeResult<NodeId> {
    store
        .node_for_tab(tab)
        .ok_or_else(|| unknown(Reference::Tab(tab), event))
}

/// Host-side reorder: host index and sibling position change, parent and depth do not.
fn moved(store: &mut NodeStore, tab: TabId, index: usize) -> TabTreeResult<Reconciled> {
    let id = lookup(store, tab, &TabEvent::TabMoved { tab, index })?;

    store.move_host_index(id, index);
    if let Some(slot) = store.slot_of(id) {
        let position = store.insertion_position(slot, index, Some(id));
        store.reposition(id, position);
    }
    Ok(Reconciled::changed())
}

fn updated(
    store: &mut NodeStore,
    event: &TabEvent,
    tab: TabId,
    now: DateTime<Utc>,
) -> TabTreeResult<Reconciled> {
    let id = lookup(store, tab, event)?;
    let Some(delta) = event.as_delta() else {
        return Ok(Reconciled::unchanged());
    };

    let changed = store
        .get_mut(id)
        .map(|node| node.apply_delta(&delta, now))
        .unwrap_or(false);
    Ok(Reconciled {
        changed,
        ..Reconciled::default()
    })
}

fn activated(
    store: &mut NodeStore,
    tab: TabId,
    window: WindowId,
    now: DateTime<Utc>,
) -> TabTreeResult<Reconciled> {
    let id = lookup(store, tab, &TabEvent::TabActivated { tab, window })?;
    if let Some(actual) = store.set_active(id, now) {
        if actual != window {
            debug!(tab = %tab, reported = %window, actual = %actual, "activation reported for another window");
        }
    }
    Ok(Reconciled::changed())
}

/// Host moved one tab into another window: its children stay behind, promoted.
fn attached(
    store: &mut NodeStore,
    tab: TabId,
    window: WindowId,
    index: usize,
    now: DateTime<Utc>,
) -> TabTreeResult<Reconciled> {
    let id = lookup(store, tab, &TabEvent::TabAttached { tab, window, index })?;
    let Some(old_window) = store.get(id).map(|n| n.window_id()) else {
        return Ok(Reconciled::unchanged());
    };
    let Some((slot, position)) = store.detach(id) else {
        return Ok(Reconciled::unchanged());
    };

    let children = store
        .get(id)
        .map(|node| node.children().to_vec())
        .unwrap_or_default();
    for (offset, child) in children.into_iter().enumerate() {
        store.detach(child);
        store.attach(child, slot, position + offset);
    }

    store.ensure_window(window);
    store.shift_host_indices_up(window, index);
    if let Some(node) = store.get_mut(id) {
        node.host_index = index;
        node.window_id = window;
    }
    let target = Slot::Root(window);
    let position = store.insertion_position(target, index, Some(id));
    store.attach(id, target, position);
    // An active tab stays active and takes over from the target window's active tab.
    if store.get(id).is_some_and(|node| node.flags().active) {
        store.set_active(id, now);
    }

    store.compact_host_indices(old_window);
    store.compact_host_indices(window);
    debug!(tab = %tab, from = %old_window, to = %window, "tab attached to another window");
    Ok(Reconciled::changed())
}
