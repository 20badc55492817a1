//! Tab tree node entity and the host facts it is built from

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{AttributeDelta, NodeId, TabFlags, TabId, Timestamps, WindowId};

/// What the host knows about one open tab.
///
/// Used both for the initial build and for `tab-created` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabFact {
    pub tab_id: TabId,
    pub window_id: WindowId,
    /// Position in the host's tab strip for this window
    pub index: usize,
    /// Tab that spawned this one, if the host knows
    pub opener: Option<TabId>,
    pub title: String,
    pub url: String,
    pub favicon: Option<String>,
    pub flags: TabFlags,
}

impl TabFact {
    pub fn new(tab_id: TabId, window_id: WindowId, index: usize) -> Self {
        Self {
            tab_id,
            window_id,
            index,
            opener: None,
            title: String::new(),
            url: String::new(),
            favicon: None,
            flags: TabFlags::default(),
        }
    }

    pub fn with_opener(mut self, opener: TabId) -> Self {
        self.opener = Some(opener);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_flags(mut self, flags: TabFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// One node of the tab forest.
///
/// Structural fields (`parent`, `children`, `depth`, `index`, `window_id`) are
/// only written by `NodeStore`; everything else is plain attribute data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabTreeNode {
    pub(crate) id: NodeId,
    /// `None` while a recreated tab waits for the host to report its id
    pub(crate) tab_id: Option<TabId>,
    pub(crate) window_id: WindowId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) depth: u32,
    pub(crate) index: usize,
    pub(crate) host_index: usize,
    pub(crate) title: String,
    pub(crate) url: String,
    pub(crate) favicon: Option<String>,
    pub(crate) flags: TabFlags,
    pub(crate) timestamps: Timestamps,
}

impl TabTreeNode {
    /// A detached node for `fact`. The store attaches it.
    pub(crate) fn from_fact(id: NodeId, fact: &TabFact, now: DateTime<Utc>) -> Self {
        Self {
            id,
            tab_id: Some(fact.tab_id),
            window_id: fact.window_id,
            parent: None,
            children: Vec::new(),
            depth: 0,
            index: 0,
            host_index: fact.index,
            title: fact.title.clone(),
            url: fact.url.clone(),
            favicon: fact.favicon.clone(),
            flags: fact.flags,
            timestamps: Timestamps::at(now),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tab_id(&self) -> Option<TabId> {
        self.tab_id
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Position among siblings, 0-based
    pub fn index(&self) -> usize {
        self.index
    }

    /// Position in the host's tab strip
    pub fn host_index(&self) -> usize {
        self.host_index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn favicon(&self) -> Option<&str> {
        self.favicon.as_deref()
    }

    pub fn flags(&self) -> TabFlags {
        self.flags
    }

    pub fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Waiting for the host to report the id of a recreated tab
    pub fn awaiting_host(&self) -> bool {
        self.tab_id.is_none()
    }

    /// Merge a host attribute update. Returns whether anything changed.
    pub(crate) fn apply_delta(&mut self, delta: &AttributeDelta, now: DateTime<Utc>) -> bool {
        let mut changed = false;

        if let Some(title) = &delta.title {
            changed |= replace(&mut self.title, title.clone());
        }
        if let Some(url) = &delta.url {
            changed |= replace(&mut self.url, url.clone());
        }
        if let Some(favicon) = &delta.favicon {
            changed |= replace(&mut self.favicon, Some(favicon.clone()));
        }
        if let Some(loading) = delta.loading {
            changed |= replace(&mut self.flags.loading, loading);
        }
        if let Some(audible) = delta.audible {
            changed |= replace(&mut self.flags.audible, audible);
        }
        if let Some(pinned) = delta.pinned {
            changed |= replace(&mut self.flags.pinned, pinned);
        }

        if changed {
            self.timestamps.touch_modified(now);
        }
        changed
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
