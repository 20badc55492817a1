//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::application::close::DEFAULT_UNDO_WINDOW_SECS;
use crate::application::persistence::DEFAULT_DEBOUNCE_MS;
use crate::error::TabTreeResult;

use super::loader::{self, ConfigWarning};

/// Smart close configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseConfig {
    /// Subtrees of at least this many nodes ask for confirmation; 0 never asks
    #[serde(default = "default_confirm_threshold")]
    pub confirm_threshold: usize,

    /// How long a closed subtree can be restored, in seconds
    #[serde(default = "default_undo_window_secs")]
    pub undo_window_secs: u64,
}

impl Default for CloseConfig {
    fn default() -> Self {
        Self {
            confirm_threshold: default_confirm_threshold(),
            undo_window_secs: default_undo_window_secs(),
        }
    }
}

fn default_confirm_threshold() -> usize {
    5
}

fn default_undo_window_secs() -> u64 {
    DEFAULT_UNDO_WINDOW_SECS
}

/// Snapshot persistence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Quiet period before a dirty forest is written, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Where the CLI reads and writes snapshots when no path is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            path: None,
        }
    }
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

/// Search configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Shorter queries are treated as "no search"
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
        }
    }
}

fn default_min_query_len() -> usize {
    1
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub close: CloseConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl EngineConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> TabTreeResult<Self> {
        Self::load_with_warnings(path).map(|(config, _)| config)
    }

    /// Load configuration and return non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> TabTreeResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load from an explicit path or the user config dir, with env overrides
    pub fn load_or_default(explicit: Option<&Path>) -> (Self, Vec<ConfigWarning>) {
        loader::load_or_default(explicit)
    }

    pub fn undo_window(&self) -> chrono::TimeDelta {
        i64::try_from(self.close.undo_window_secs)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .unwrap_or(chrono::TimeDelta::MAX)
    }

    pub fn debounce(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::milliseconds(self.persistence.debounce_ms.min(i64::MAX as u64) as i64)
    }
}
