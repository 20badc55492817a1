//! Inbound host lifecycle events

use serde::{Deserialize, Serialize};

use crate::domain::entities::TabFact;
use crate::domain::value_objects::{AttributeDelta, TabFlags, TabId, WindowId};

/// One event from the host, applied in delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TabEvent {
    TabCreated {
        tab: TabId,
        window: WindowId,
        index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opener: Option<TabId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pinned: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active: Option<bool>,
    },
    TabRemoved {
        tab: TabId,
    },
    TabMoved {
        tab: TabId,
        index: usize,
    },
    TabUpdated {
        tab: TabId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        favicon: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        loading: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        audible: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pinned: Option<bool>,
    },
    TabActivated {
        tab: TabId,
        window: WindowId,
    },
    /// A single tab dragged into another window on the host side
    TabAttached {
        tab: TabId,
        window: WindowId,
        index: usize,
    },
    WindowCreated {
        window: WindowId,
    },
    WindowRemoved {
        window: WindowId,
    },
    WindowFocusChanged {
        #[serde(default)]
        window: Option<WindowId>,
    },
}

impl TabEvent {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            TabEvent::TabCreated { .. } => "tab_created",
            TabEvent::TabRemoved { .. } => "tab_removed",
            TabEvent::TabMoved { .. } => "tab_moved",
            TabEvent::TabUpdated { .. } => "tab_updated",
            TabEvent::TabActivated { .. } => "tab_activated",
            TabEvent::TabAttached { .. } => "tab_attached",
            TabEvent::WindowCreated { .. } => "window_created",
            TabEvent::WindowRemoved { .. } => "window_removed",
            TabEvent::WindowFocusChanged { .. } => "window_focus_changed",
        }
    }

    /// Shorthand for a bare `tab_created` event
    pub fn created(tab: TabId, window: WindowId, index: usize) -> Self {
        TabEvent::TabCreated {
            tab,
            window,
            index,
            opener: None,
            title: None,
            url: None,
            pinned: None,
            active: None,
        }
    }

    /// The fact a `tab_created` event describes
    pub(crate) fn as_fact(&self) -> Option<TabFact> {
        let TabEvent::TabCreated {
            tab,
            window,
            index,
            opener,
            title,
            url,
            pinned,
            active,
        } = self
        else {
            return None;
        };

        let mut fact = TabFact::new(*tab, *window, *index);
        fact.opener = *opener;
        fact.title = title.clone().unwrap_or_default();
        fact.url = url.clone().unwrap_or_default();
        fact.flags = TabFlags {
            active: active.unwrap_or(false),
            pinned: pinned.unwrap_or(false),
            ..TabFlags::default()
        };
        Some(fact)
    }

    /// The attribute delta a `tab_updated` event carries
    pub(crate) fn as_delta(&self) -> Option<AttributeDelta> {
        let TabEvent::TabUpdated {
            title,
            url,
            favicon,
            loading,
            audible,
            pinned,
            ..
        } = self
        else {
            return None;
        };
        Some(AttributeDelta {
            title: title.clone(),
            url: url.clone(),
            favicon: favicon.clone(),
            loading: *loading,
            audible: *audible,
            pinned: *pinned,
        })
    }
}
