//! Tab attribute value objects: runtime flags and timestamps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Host-reported tab flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TabFlags {
    pub active: bool,
    pub loading: bool,
    pub audible: bool,
    pub pinned: bool,
}

/// Creation / access / modification times of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Timestamps {
    /// All three stamps set to `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            created: now,
            last_accessed: now,
            last_modified: now,
        }
    }

    pub fn touch_accessed(&mut self, now: DateTime<Utc>) {
        self.last_accessed = now;
    }

    pub fn touch_modified(&mut self, now: DateTime<Utc>) {
        self.last_modified = now;
    }
}

/// A partial attribute update as reported by the host.
///
/// `None` means "unchanged". Structural fields are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

impl AttributeDelta {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
