//! Collapse and search intent, the two non-store inputs of the projection

use std::collections::HashSet;

use crate::domain::store::NodeStore;
use crate::domain::value_objects::NodeId;

/// Node ids whose descendants are hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseState {
    collapsed: HashSet<NodeId>,
}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_set(collapsed: HashSet<NodeId>) -> Self {
        Self { collapsed }
    }

    /// Flip `id`; returns whether it is collapsed afterwards.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.collapsed.remove(&id) {
            false
        } else {
            self.collapsed.insert(id);
            true
        }
    }

    pub fn set(&mut self, id: NodeId, collapsed: bool) {
        if collapsed {
            self.collapsed.insert(id);
        } else {
            self.collapsed.remove(&id);
        }
    }

    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.collapsed.contains(&id)
    }

    pub fn as_set(&self) -> &HashSet<NodeId> {
        &self.collapsed
    }

    pub fn len(&self) -> usize {
        self.collapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty()
    }

    pub fn forget(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        for id in ids {
            self.collapsed.remove(&id);
        }
    }

    /// Drop ids the store no longer holds
    pub fn retain_existing(&mut self, store: &NodeStore) {
        self.collapsed.retain(|id| store.contains(*id));
    }
}

/// Current search text, with a minimum length below which it is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    text: String,
    min_query_len: usize,
}

impl SearchState {
    pub fn new(min_query_len: usize) -> Self {
        Self {
            text: String::new(),
            min_query_len,
        }
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text the projector should filter by; empty if too short.
    pub fn effective_query(&self) -> &str {
        let trimmed = self.text.trim();
        if trimmed.chars().count() < self.min_query_len {
            ""
        } else {
            trimmed
        }
    }

    pub fn is_active(&self) -> bool {
        !self.effective_query().is_empty()
    }
}
