//! Visible-node projection: search filter + collapse, order preserving
//!
//! A pure function of the store, the search text and the collapse set. It
//! never mutates anything and keeps no incremental state, so callers can run
//! it on every keystroke.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::domain::entities::TabTreeNode;
use crate::domain::store::NodeStore;
use crate::domain::value_objects::{NodeId, TabId, WindowId};

/// One row of the projected view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleNode {
    pub id: NodeId,
    pub tab_id: Option<TabId>,
    pub window_id: WindowId,
    pub depth: u32,
    pub title: String,
    pub url: String,
    pub active: bool,
    pub pinned: bool,
    pub has_children: bool,
    pub collapsed: bool,
    /// The node itself matches the search (always true for an empty search)
    pub matches: bool,
    /// Some descendant matches; still reported when the node is collapsed
    pub has_matching_descendant: bool,
}

/// Case-insensitive substring match over title and address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, node: &TabTreeNode) -> bool {
        self.is_empty()
            || node.title().to_lowercase().contains(&self.needle)
            || node.url().to_lowercase().contains(&self.needle)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MatchState {
    own: bool,
    below: bool,
}

impl MatchState {
    fn included(self) -> bool {
        self.own || self.below
    }
}

/// Derives the visible sequence for one (search, collapse) input pair.
pub struct ViewProjector<'a> {
    store: &'a NodeStore,
    query: SearchQuery,
    collapsed: Option<&'a HashSet<NodeId>>,
}

impl<'a> ViewProjector<'a> {
    pub fn new(store: &'a NodeStore) -> Self {
        Self {
            store,
            query: SearchQuery::default(),
            collapsed: None,
        }
    }

    pub fn with_search(mut self, text: &str) -> Self {
        self.query = SearchQuery::new(text);
        self
    }

    pub fn with_collapsed(mut self, collapsed: &'a HashSet<NodeId>) -> Self {
        self.collapsed = Some(collapsed);
        self
    }

    fn is_collapsed(&self, id: NodeId) -> bool {
        self.collapsed.is_some_and(|set| set.contains(&id))
    }

    /// Own and descendant match for every node, children before parents.
    fn match_states(&self) -> HashMap<NodeId, MatchState> {
        let mut states = HashMap::with_capacity(self.store.len());
        for window in self.store.windows() {
            let order = self.store.window_preorder(window.id());
            for id in order.into_iter().rev() {
                let Some(node) = self.store.get(id) else {
                    continue;
                };
                let below = node.children().iter().any(|child| {
                    states
                        .get(child)
                        .copied()
                        .is_some_and(MatchState::included)
                });
                states.insert(
                    id,
                    MatchState {
                        own: self.query.matches(node),
                        below,
                    },
                );
            }
        }
        states
    }

    /// Visible nodes in pre-order: windows by id, roots in order, children in order.
    pub fn project(&self) -> Vec<VisibleNode> {
        let states = self.match_states();
        let mut visible = Vec::new();

        for window in self.store.windows() {
            let mut stack: Vec<NodeId> = window.roots().iter().rev().copied().collect();
            while let Some(id) = stack.pop() {
                let state = states.get(&id).copied().unwrap_or_default();
                if !state.included() {
                    continue;
                }
                let Some(node) = self.store.get(id) else {
                    continue;
                };

                let collapsed = self.is_collapsed(id);
                visible.push(VisibleNode {
                    id,
                    tab_id: node.tab_id(),
                    window_id: node.window_id(),
                    depth: node.depth(),
                    title: node.title().to_string(),
                    url: node.url().to_string(),
                    active: node.flags().active,
                    pinned: node.flags().pinned,
                    has_children: !node.is_leaf(),
                    collapsed,
                    matches: state.own,
                    has_matching_descendant: state.below,
                });

                if !collapsed {
                    stack.extend(node.children().iter().rev().copied());
                }
            }
        }
        visible
    }

    /// How many nodes match the search on their own
    pub fn match_count(&self) -> usize {
        self.store
            .nodes()
            .filter(|node| self.query.matches(node))
            .count()
    }
}
