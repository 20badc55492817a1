//! NodeStore - the canonical arena of tab tree nodes
//!
//! Nodes live in a flat table addressed by `NodeId`; parent and child links are
//! ids, never embedded structures. Two indices sit beside the table: host tab
//! id to node, and window id to the window's ordered roots.
//!
//! Every `pub(crate)` mutator leaves the forest consistent when it returns:
//! sibling indices are contiguous, depths and window ids are recomputed for
//! the touched subtree, and the tab index stays injective.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::domain::entities::{TabFact, TabTreeNode, WindowGroup};
use crate::domain::value_objects::{NodeId, TabId, WindowId};

/// A child list: either the roots of a window or the children of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Root(WindowId),
    Child(NodeId),
}

impl Slot {
    pub fn parent(self) -> Option<NodeId> {
        match self {
            Slot::Root(_) => None,
            Slot::Child(parent) => Some(parent),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStore {
    nodes: HashMap<NodeId, TabTreeNode>,
    by_tab: HashMap<TabId, NodeId>,
    windows: BTreeMap<WindowId, WindowGroup>,
    next_id: u64,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&TabTreeNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut TabTreeNode> {
        self.nodes.get_mut(&id)
    }

    /// All nodes, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &TabTreeNode> {
        self.nodes.values()
    }

    pub fn node_for_tab(&self, tab: TabId) -> Option<NodeId> {
        self.by_tab.get(&tab).copied()
    }

    // === Windows ===

    pub fn window(&self, id: WindowId) -> Option<&WindowGroup> {
        self.windows.get(&id)
    }

    /// Windows ordered by id
    pub fn windows(&self) -> impl Iterator<Item = &WindowGroup> {
        self.windows.values()
    }

    pub fn has_window(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub(crate) fn ensure_window(&mut self, id: WindowId) -> &mut WindowGroup {
        self.windows
            .entry(id)
            .or_insert_with(|| WindowGroup::new(id))
    }

    pub fn focused_window(&self) -> Option<WindowId> {
        self.windows
            .values()
            .find(|window| window.focused)
            .map(|window| window.id)
    }

    /// Focus one window (or none) and unfocus every other.
    pub(crate) fn set_focused_window(&mut self, id: Option<WindowId>) {
        for window in self.windows.values_mut() {
            window.focused = Some(window.id) == id;
        }
    }

    /// Drop a window and every node still in it.
    pub(crate) fn remove_window(&mut self, id: WindowId) -> Vec<TabTreeNode> {
        let Some(window) = self.windows.remove(&id) else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        for root in window.roots {
            for node_id in self.subtree(root) {
                if let Some(node) = self.nodes.remove(&node_id) {
                    self.unregister_tab(&node);
                    removed.push(node);
                }
            }
        }
        removed
    }

    // === Id allocation ===

    pub(crate) fn allocate_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId::new(self.next_id)
    }

    /// The highest id handed out so far
    pub fn last_allocated_id(&self) -> u64 {
        self.next_id
    }

    pub(crate) fn reserve_ids_through(&mut self, last: u64) {
        self.next_id = self.next_id.max(last);
    }

    // === Structure queries ===

    /// The child list `id` currently sits in
    pub fn slot_of(&self, id: NodeId) -> Option<Slot> {
        let node = self.nodes.get(&id)?;
        Some(match node.parent {
            Some(parent) => Slot::Child(parent),
            None => Slot::Root(node.window_id),
        })
    }

    /// Ordered members of a child list; empty if the slot does not exist
    pub fn siblings(&self, slot: Slot) -> &[NodeId] {
        match slot {
            Slot::Root(window) => self
                .windows
                .get(&window)
                .map(|w| w.roots.as_slice())
                .unwrap_or(&[]),
            Slot::Child(parent) => self
                .nodes
                .get(&parent)
                .map(|n| n.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    fn siblings_mut(&mut self, slot: Slot) -> Option<&mut Vec<NodeId>> {
        match slot {
            Slot::Root(window) => self.windows.get_mut(&window).map(|w| &mut w.roots),
            Slot::Child(parent) => self.nodes.get_mut(&parent).map(|n| &mut n.children),
        }
    }

    /// Strict ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            store: self,
            next: self.nodes.get(&id).and_then(|n| n.parent),
            remaining: self.nodes.len(),
        }
    }

    /// Whether `candidate` lies strictly below `of`
    pub fn is_descendant(&self, candidate: NodeId, of: NodeId) -> bool {
        self.ancestors(candidate).any(|ancestor| ancestor == of)
    }

    /// `id` and all its descendants in pre-order
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        if !self.nodes.contains_key(&id) {
            return order;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// Every node of a window in tree order (roots in order, children in order)
    pub fn window_preorder(&self, window: WindowId) -> Vec<NodeId> {
        let Some(group) = self.windows.get(&window) else {
            return Vec::new();
        };
        group
            .roots
            .iter()
            .flat_map(|root| self.subtree(*root))
            .collect()
    }

    pub fn nodes_in_window(&self, window: WindowId) -> impl Iterator<Item = &TabTreeNode> {
        self.nodes
            .values()
            .filter(move |node| node.window_id == window)
    }

    pub fn active_node(&self, window: WindowId) -> Option<NodeId> {
        self.nodes_in_window(window)
            .find(|node| node.flags.active)
            .map(|node| node.id)
    }

    // === Structural mutation ===

    /// Create a node for a host fact and attach it at `position` within `slot`.
    pub(crate) fn insert_tab(
        &mut self,
        fact: &TabFact,
        slot: Slot,
        position: usize,
        now: DateTime<Utc>,
    ) -> NodeId {
        let id = self.allocate_id();
        let node = TabTreeNode::from_fact(id, fact, now);
        self.insert_node(node, slot, position);
        id
    }

    /// Register an already-built node (fresh, restored or undone) and attach it.
    ///
    /// Its child list is reset; children attach themselves afterwards.
    pub(crate) fn insert_node(&mut self, mut node: TabTreeNode, slot: Slot, position: usize) {
        let id = node.id;
        debug_assert!(!self.nodes.contains_key(&id), "node {id} inserted twice");

        node.children.clear();
        node.parent = None;
        self.reserve_ids_through(id.get());
        if let Some(tab) = node.tab_id {
            debug_assert!(!self.by_tab.contains_key(&tab), "{tab} bound twice");
            self.by_tab.insert(tab, id);
        }
        self.nodes.insert(id, node);
        self.attach(id, slot, position);
    }

    /// Put a detached node into `slot`, clamping `position` to the list length.
    ///
    /// A `Child` slot whose parent vanished falls back to the roots of the
    /// node's own window so nothing is ever left orphaned.
    pub(crate) fn attach(&mut self, id: NodeId, slot: Slot, position: usize) {
        let Some(own_window) = self.nodes.get(&id).map(|n| n.window_id) else {
            return;
        };

        let (slot, window) = match slot {
            Slot::Child(parent) => match self.nodes.get(&parent) {
                Some(p) => (slot, p.window_id),
                None => (Slot::Root(own_window), own_window),
            },
            Slot::Root(window) => {
                self.ensure_window(window);
                (slot, window)
            }
        };

        if let Some(list) = self.siblings_mut(slot) {
            let position = position.min(list.len());
            list.insert(position, id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = slot.parent();
            node.window_id = window;
        }
        self.reindex(slot);
        self.refresh_subtree(id);
    }

    /// Take `id` out of its child list, closing the gap.
    ///
    /// Returns the slot and position it occupied. The node stays in the table
    /// with no parent until it is attached again or removed.
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<(Slot, usize)> {
        let slot = self.slot_of(id)?;
        let list = self.siblings_mut(slot)?;
        let position = list.iter().position(|member| *member == id)?;
        list.remove(position);

        self.reindex(slot);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
        Some((slot, position))
    }

    /// Move `id` to `position` within the list it already belongs to.
    pub(crate) fn reposition(&mut self, id: NodeId, position: usize) {
        if let Some((slot, _)) = self.detach(id) {
            self.attach(id, slot, position);
        }
    }

    /// Remove one node, promoting its children into its place in order.
    pub(crate) fn remove_promoting(&mut self, id: NodeId) -> Option<TabTreeNode> {
        let (slot, position) = self.detach(id)?;

        let children = self
            .nodes
            .get_mut(&id)
            .map(|node| std::mem::take(&mut node.children))
            .unwrap_or_default();
        for (offset, child) in children.into_iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = None;
            }
            self.attach(child, slot, position + offset);
        }

        let node = self.nodes.remove(&id)?;
        self.unregister_tab(&node);
        Some(node)
    }

    /// Remove `id` and all of its descendants; returned in pre-order.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) -> Vec<TabTreeNode> {
        let order = self.subtree(id);
        if order.is_empty() {
            return Vec::new();
        }

        self.detach(id);
        let mut removed = Vec::with_capacity(order.len());
        for node_id in order {
            if let Some(node) = self.nodes.remove(&node_id) {
                self.unregister_tab(&node);
                removed.push(node);
            }
        }
        removed
    }

    pub(crate) fn bind_tab(&mut self, id: NodeId, tab: TabId) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        if let Some(previous) = node.tab_id.replace(tab) {
            if self.by_tab.get(&previous) == Some(&id) {
                self.by_tab.remove(&previous);
            }
        }
        self.by_tab.insert(tab, id);
    }

    fn unregister_tab(&mut self, node: &TabTreeNode) {
        if let Some(tab) = node.tab_id {
            if self.by_tab.get(&tab) == Some(&node.id) {
                self.by_tab.remove(&tab);
            }
        }
    }

    /// Mark `id` active and clear every other active flag in its window.
    pub(crate) fn set_active(&mut self, id: NodeId, now: DateTime<Utc>) -> Option<WindowId> {
        let window = self.nodes.get(&id)?.window_id;
        for node in self.nodes.values_mut() {
            if node.window_id != window {
                continue;
            }
            let active = node.id == id;
            node.flags.active = active;
            if active {
                node.timestamps.touch_accessed(now);
            }
        }
        Some(window)
    }

    /// Leave at most one active node in `window`, the first in strip order.
    ///
    /// Returns how many flags were cleared.
    pub(crate) fn keep_single_active(&mut self, window: WindowId) -> usize {
        let mut active: Vec<(usize, NodeId)> = self
            .nodes_in_window(window)
            .filter(|node| node.flags.active)
            .map(|node| (node.host_index, node.id))
            .collect();
        active.sort();

        let extra: Vec<NodeId> = active.into_iter().skip(1).map(|(_, id)| id).collect();
        for id in &extra {
            if let Some(node) = self.nodes.get_mut(id) {
                node.flags.active = false;
            }
        }
        extra.len()
    }

    fn reindex(&mut self, slot: Slot) {
        let members = self.siblings(slot).to_vec();
        for (index, member) in members.into_iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(&member) {
                node.index = index;
            }
        }
    }

    /// Recompute depth and window for `id` and everything below it, top-down.
    fn refresh_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let (depth, window) = match node.parent.and_then(|p| self.nodes.get(&p)) {
            Some(parent) => (parent.depth + 1, parent.window_id),
            None => (0, node.window_id),
        };

        let mut stack = vec![(id, depth)];
        while let Some((current, depth)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(&current) else {
                continue;
            };
            node.depth = depth;
            node.window_id = window;
            stack.extend(node.children.iter().map(|child| (*child, depth + 1)));
        }
    }

    // === Host tab strip shadow ===

    /// Where a node with `host_index` belongs among the members of `slot`.
    pub fn insertion_position(&self, slot: Slot, host_index: usize, exclude: Option<NodeId>) -> usize {
        self.siblings(slot)
            .iter()
            .filter(|member| Some(**member) != exclude)
            .filter_map(|member| self.nodes.get(member))
            .filter(|node| node.host_index < host_index)
            .count()
    }

    /// Open a gap at `from` in a window's tab strip.
    pub(crate) fn shift_host_indices_up(&mut self, window: WindowId, from: usize) {
        for node in self.nodes.values_mut() {
            if node.window_id == window && node.host_index >= from {
                node.host_index += 1;
            }
        }
    }

    /// Move one tab within its window's strip, shifting the tabs in between.
    pub(crate) fn move_host_index(&mut self, id: NodeId, new_index: usize) {
        let Some((window, old_index)) = self.nodes.get(&id).map(|n| (n.window_id, n.host_index))
        else {
            return;
        };

        for node in self.nodes.values_mut() {
            if node.window_id != window || node.id == id {
                continue;
            }
            if new_index > old_index && node.host_index > old_index && node.host_index <= new_index
            {
                node.host_index -= 1;
            } else if new_index < old_index
                && node.host_index >= new_index
                && node.host_index < old_index
            {
                node.host_index += 1;
            }
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.host_index = new_index;
        }
    }

    /// Renumber a window's strip to `0..n-1`, keeping relative order.
    pub(crate) fn compact_host_indices(&mut self, window: WindowId) {
        let mut members: Vec<(usize, NodeId)> = self
            .nodes_in_window(window)
            .map(|node| (node.host_index, node.id))
            .collect();
        members.sort();
        for (position, (_, id)) in members.into_iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.host_index = position;
            }
        }
    }

    /// Renumber a window's strip to follow tree order.
    pub(crate) fn align_host_indices_to_tree(&mut self, window: WindowId) {
        for (position, id) in self.window_preorder(window).into_iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.host_index = position;
            }
        }
    }

    // === Invariants ===

    /// Verify every structural invariant of the forest.
    pub fn check_invariants(&self) -> Result<(), super::InvariantViolation> {
        super::invariants::check(self)
    }

    pub(crate) fn tab_index(&self) -> &HashMap<TabId, NodeId> {
        &self.by_tab
    }

    pub(crate) fn listed_once(list: &[NodeId]) -> bool {
        let mut seen = HashSet::with_capacity(list.len());
        list.iter().all(|id| seen.insert(*id))
    }
}

/// Iterator over strict ancestors; bounded by the store size.
pub struct Ancestors<'a> {
    store: &'a NodeStore,
    next: Option<NodeId>,
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = self.store.get(current).and_then(|node| node.parent);
        Some(current)
    }
}
