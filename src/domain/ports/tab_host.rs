//! TabHost port - the outbound command sink
//!
//! Commands are fire-and-forget from the engine's side. The host reports the
//! outcome later through `TabTreeEngine::on_command_result`, correlated by
//! `CommandId`.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CommandId, TabId, WindowId};

/// A request for the host to change its tabs or windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TabCommand {
    CreateTab {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opener: Option<TabId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        window: Option<WindowId>,
    },
    CloseTab {
        tab: TabId,
    },
    MoveTab {
        tab: TabId,
        index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        window: Option<WindowId>,
    },
    ActivateTab {
        tab: TabId,
    },
    FocusWindow {
        window: WindowId,
    },
}

/// A command and the id its result will come back under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCommand {
    pub id: CommandId,
    #[serde(flatten)]
    pub command: TabCommand,
}

/// Asynchronous outcome of an issued command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandResult {
    Succeeded {
        command: CommandId,
        /// Set for `CreateTab`: the id the host gave the new tab
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tab: Option<TabId>,
    },
    Failed {
        command: CommandId,
        reason: String,
    },
}

impl CommandResult {
    pub fn command(&self) -> CommandId {
        match self {
            CommandResult::Succeeded { command, .. } | CommandResult::Failed { command, .. } => {
                *command
            }
        }
    }
}

/// Receives commands from the engine
///
/// Implementations can be:
/// - `NdjsonCommandSink`: one JSON line per command
/// - `RecordingHost`: keeps every command, for tests and dry runs
/// - `NoopHost`: drops everything
pub trait TabHost: Send + Sync {
    fn dispatch(&self, id: CommandId, command: TabCommand);
}

/// Host that ignores every command
pub struct NoopHost;

impl TabHost for NoopHost {
    fn dispatch(&self, _id: CommandId, _command: TabCommand) {}
}

/// Host that records every command it is given.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    issued: Arc<Mutex<Vec<IssuedCommand>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issued(&self) -> Vec<IssuedCommand> {
        self.issued
            .lock()
            .map(|log| log.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Return and forget everything recorded so far
    pub fn drain(&self) -> Vec<IssuedCommand> {
        match self.issued.lock() {
            Ok(mut log) => std::mem::take(&mut *log),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl TabHost for RecordingHost {
    fn dispatch(&self, id: CommandId, command: TabCommand) {
        let entry = IssuedCommand { id, command };
        match self.issued.lock() {
            Ok(mut log) => log.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
