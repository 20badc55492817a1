//! Snapshot / restore of the forest
//!
//! The serialized form is a node table keyed by node id with compact field
//! names. Where and when it is stored belongs to the host; this module only
//! guarantees that `decode(encode(store))` reproduces the same forest.
//!
//! Decoding is repair-tolerant: whatever the input, the result is a valid forest.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::TabTreeNode;
use crate::domain::store::{NodeStore, Slot};
use crate::domain::value_objects::{NodeId, TabFlags, TabId, Timestamps, WindowId};
use crate::error::SnapshotError;

pub const SNAPSHOT_VERSION: u32 = 1;

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedForest {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub next_node_id: u64,
    #[serde(default)]
    pub windows: Vec<SerializedWindow>,
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, SerializedNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedWindow {
    pub id: WindowId,
    #[serde(default, skip_serializing_if = "is_false")]
    pub focused: bool,
    #[serde(default)]
    pub roots: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedNode {
    #[serde(rename = "i")]
    pub id: NodeId,
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
    #[serde(rename = "w")]
    pub window_id: WindowId,
    #[serde(rename = "n", default)]
    pub title: String,
    #[serde(rename = "u", default)]
    pub url: String,
    #[serde(rename = "f", default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(rename = "p", default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(rename = "c", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
    #[serde(rename = "h", default)]
    pub host_index: usize,
    #[serde(rename = "a", default, skip_serializing_if = "is_false")]
    pub active: bool,
    #[serde(rename = "l", default, skip_serializing_if = "is_false")]
    pub loading: bool,
    #[serde(rename = "s", default, skip_serializing_if = "is_false")]
    pub audible: bool,
    #[serde(rename = "x", default, skip_serializing_if = "is_false")]
    pub pinned: bool,
    #[serde(rename = "z", default, skip_serializing_if = "is_false")]
    pub collapsed: bool,
    #[serde(rename = "tc")]
    pub created: DateTime<Utc>,
    #[serde(rename = "ta")]
    pub last_accessed: DateTime<Utc>,
    #[serde(rename = "tm")]
    pub last_modified: DateTime<Utc>,
}

impl SerializedNode {
    fn from_node(node: &TabTreeNode, collapsed: bool) -> Self {
        let flags = node.flags();
        let stamps = node.timestamps();
        Self {
            id: node.id(),
            tab_id: node.tab_id(),
            window_id: node.window_id(),
            title: node.title().to_string(),
            url: node.url().to_string(),
            favicon: node.favicon().map(str::to_string),
            parent: node.parent(),
            children: node.children().to_vec(),
            host_index: node.host_index(),
            active: flags.active,
            loading: flags.loading,
            audible: flags.audible,
            pinned: flags.pinned,
            collapsed,
            created: stamps.created,
            last_accessed: stamps.last_accessed,
            last_modified: stamps.last_modified,
        }
    }

    fn to_node(&self, id: NodeId, tab_id: Option<TabId>) -> TabTreeNode {
        TabTreeNode {
            id,
            tab_id,
            window_id: self.window_id,
            parent: None,
            children: Vec::new(),
            depth: 0,
            index: 0,
            host_index: self.host_index,
            title: self.title.clone(),
            url: self.url.clone(),
            favicon: self.favicon.clone(),
            flags: TabFlags {
                active: self.active,
                loading: self.loading,
                audible: self.audible,
                pinned: self.pinned,
            },
            timestamps: Timestamps {
                created: self.created,
                last_accessed: self.last_accessed,
                last_modified: self.last_modified,
            },
        }
    }
}

/// Result of decoding a snapshot.
#[derive(Debug, Clone)]
pub struct RestoredForest {
    pub store: NodeStore,
    pub collapsed: HashSet<NodeId>,
    /// Links or bindings that had to be dropped or rewritten
    pub repaired: usize,
}

/// Take an immutable copy of the forest.
pub fn encode(store: &NodeStore, collapsed: &HashSet<NodeId>, now: DateTime<Utc>) -> SerializedForest {
    let windows = store
        .windows()
        .map(|window| SerializedWindow {
            id: window.id(),
            focused: window.is_focused(),
            roots: window.roots().to_vec(),
        })
        .collect();

    let nodes = store
        .nodes()
        .map(|node| {
            (
                node.id(),
                SerializedNode::from_node(node, collapsed.contains(&node.id())),
            )
        })
        .collect();

    SerializedForest {
        version: SNAPSHOT_VERSION,
        saved_at: now,
        next_node_id: store.last_allocated_id(),
        windows,
        nodes,
    }
}

/// Rebuild a forest from a snapshot, repairing anything inconsistent.
pub fn decode(forest: &SerializedForest) -> Result<RestoredForest, SnapshotError> {
    if forest.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: forest.version,
            expected: SNAPSHOT_VERSION,
        });
    }

    let mut decoder = Decoder {
        forest,
        store: NodeStore::new(),
        visited: HashSet::new(),
        collapsed: HashSet::new(),
        repaired: 0,
    };

    for (key, node) in &forest.nodes {
        if *key != node.id {
            decoder.repaired += 1;
        }
    }

    for window in &forest.windows {
        decoder.store.ensure_window(window.id);
        let mut listed = HashSet::new();
        for root in &window.roots {
            let valid = forest.nodes.contains_key(root)
                && decoder.accepted_parent(*root).is_none()
                && listed.insert(*root)
                && !decoder.visited.contains(root);
            if valid {
                decoder.place_subtree(*root, Slot::Root(window.id));
            } else {
                decoder.repaired += 1;
            }
        }
    }

    // Roots no window listed, and members of parent cycles.
    let leftovers: Vec<NodeId> = forest.nodes.keys().copied().collect();
    for id in leftovers {
        if decoder.visited.contains(&id) {
            continue;
        }
        let top = decoder.topmost_unplaced(id);
        decoder.repaired += 1;
        let window = forest.nodes[&top].window_id;
        decoder.place_subtree(top, Slot::Root(window));
    }

    let focused = forest.windows.iter().find(|w| w.focused).map(|w| w.id);
    decoder.store.set_focused_window(focused);

    let windows: Vec<WindowId> = decoder.store.windows().map(|w| w.id()).collect();
    for window in windows {
        decoder.store.compact_host_indices(window);
        decoder.repaired += decoder.store.keep_single_active(window);
    }
    decoder.store.reserve_ids_through(forest.next_node_id);

    Ok(RestoredForest {
        store: decoder.store,
        collapsed: decoder.collapsed,
        repaired: decoder.repaired,
    })
}

struct Decoder<'a> {
    forest: &'a SerializedForest,
    store: NodeStore,
    visited: HashSet<NodeId>,
    collapsed: HashSet<NodeId>,
    repaired: usize,
}

impl Decoder<'_> {
    /// The parent link, if both sides of it agree.
    fn accepted_parent(&self, id: NodeId) -> Option<NodeId> {
        let node = self.forest.nodes.get(&id)?;
        let parent = node.parent?;
        if parent == id {
            return None;
        }
        let parent_node = self.forest.nodes.get(&parent)?;
        parent_node.children.contains(&id).then_some(parent)
    }

    /// Highest unplaced ancestor of `id`; stops where a parent cycle closes.
    fn topmost_unplaced(&self, id: NodeId) -> NodeId {
        let mut seen = BTreeSet::from([id]);
        let mut cursor = id;
        while let Some(parent) = self.accepted_parent(cursor) {
            if self.visited.contains(&parent) || !seen.insert(parent) {
                break;
            }
            cursor = parent;
        }
        cursor
    }

    /// Insert `root` at the end of `slot`, then its accepted children in order.
    fn place_subtree(&mut self, root: NodeId, slot: Slot) {
        let mut stack = vec![(root, slot)];
        while let Some((id, slot)) = stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            let Some(serialized) = self.forest.nodes.get(&id) else {
                continue;
            };

            let tab = match serialized.tab_id {
                Some(tab) if self.store.node_for_tab(tab).is_some() => {
                    self.repaired += 1;
                    None
                }
                other => other,
            };
            self.store
                .insert_node(serialized.to_node(id, tab), slot, usize::MAX);
            if serialized.collapsed {
                self.collapsed.insert(id);
            }

            let mut seen = HashSet::new();
            let mut children = Vec::with_capacity(serialized.children.len());
            for child in &serialized.children {
                let valid = self.accepted_parent(*child) == Some(id)
                    && seen.insert(*child)
                    && !self.visited.contains(child);
                if valid {
                    children.push(*child);
                } else {
                    self.repaired += 1;
                }
            }
            stack.extend(children.into_iter().rev().map(|child| (child, Slot::Child(id))));
        }
    }
}
