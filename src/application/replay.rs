//! Replay of a recorded host session
//!
//! A session log mixes three kinds of lines: host events, results for
//! commands the engine issued, and scripted user actions. Actions address
//! nodes by the tab they are bound to, since node ids are not known up front.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::application::close::CloseDecision;
use crate::application::engine::TabTreeEngine;
use crate::application::reconcile::TabEvent;
use crate::domain::entities::DragSnapshot;
use crate::domain::ports::{CommandResult, ManualClock};
use crate::domain::store::Slot;
use crate::domain::value_objects::{NodeId, OperationId, TabId, WindowId};
use crate::error::{Reference, TabTreeError, TabTreeResult};

/// A user-side request, as a replay script spells it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReplayAction {
    /// Smart close; `confirm` answers a confirmation request with yes
    Close {
        tab: TabId,
        #[serde(default)]
        confirm: bool,
    },
    /// Undo the given close, or the latest one still in its window
    Undo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operation: Option<OperationId>,
    },
    /// Drop `tab` under `parent`, or as a root of `window` (default: its own)
    Move {
        tab: TabId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<TabId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        window: Option<WindowId>,
        index: usize,
    },
    /// Put back the most recent move
    Revert,
    Activate {
        tab: TabId,
    },
    Collapse {
        tab: TabId,
    },
    Search {
        text: String,
    },
    /// Let time pass on the replay clock
    Advance {
        ms: u64,
    },
}

/// One parsed line of a session log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedItem {
    Event(TabEvent),
    Result(CommandResult),
    Action(ReplayAction),
}

/// A line the engine refused. Replay carries on after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedLine {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub events: usize,
    pub results: usize,
    pub actions: usize,
    /// Closes that asked for confirmation and did not get it
    pub unconfirmed: usize,
    pub rejected: Vec<RejectedLine>,
}

/// Drives an engine through a session log.
pub struct Replayer {
    clock: ManualClock,
    last_move: Option<DragSnapshot>,
    summary: ReplaySummary,
}

impl Replayer {
    /// `clock` must be the clock the engine reads.
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            last_move: None,
            summary: ReplaySummary::default(),
        }
    }

    pub fn apply(&mut self, engine: &mut TabTreeEngine, line: usize, item: &FeedItem) {
        let outcome = match item {
            FeedItem::Event(event) => {
                self.summary.events += 1;
                engine.apply_event(event).map(|_| ())
            }
            FeedItem::Result(result) => {
                self.summary.results += 1;
                engine.on_command_result(result)
            }
            FeedItem::Action(action) => {
                self.summary.actions += 1;
                self.perform(engine, action)
            }
        };

        if let Err(err) = outcome {
            warn!(line, error = %err, "replay line rejected");
            self.summary.rejected.push(RejectedLine {
                line,
                message: err.to_string(),
            });
        }
    }

    pub fn summary(&self) -> &ReplaySummary {
        &self.summary
    }

    pub fn finish(self) -> ReplaySummary {
        self.summary
    }

    fn perform(&mut self, engine: &mut TabTreeEngine, action: &ReplayAction) -> TabTreeResult<()> {
        match action {
            ReplayAction::Close { tab, confirm } => {
                let node = node_for(engine, *tab)?;
                let decision = engine.close_subtree(node, engine.confirm_threshold())?;
                if let CloseDecision::NeedsConfirmation {
                    candidate_count, ..
                } = decision
                {
                    if *confirm {
                        engine.confirm_close(node)?;
                    } else {
                        info!(tab = %tab, candidate_count, "close left unconfirmed");
                        self.summary.unconfirmed += 1;
                    }
                }
            }
            ReplayAction::Undo { operation } => match operation.or_else(|| engine.latest_undoable()) {
                Some(operation) => {
                    engine.undo_close(operation)?;
                }
                None => debug!("no close left to undo"),
            },
            ReplayAction::Move {
                tab,
                parent,
                window,
                index,
            } => {
                let node = node_for(engine, *tab)?;
                let target = match (parent, window) {
                    (Some(parent), _) => Slot::Child(node_for(engine, *parent)?),
                    (None, Some(window)) => Slot::Root(*window),
                    (None, None) => {
                        let window = engine
                            .store()
                            .get(node)
                            .map(|n| n.window_id())
                            .ok_or(TabTreeError::UnknownReference(Reference::Node(node)))?;
                        Slot::Root(window)
                    }
                };
                self.last_move = Some(engine.propose_move(node, target, *index)?);
            }
            ReplayAction::Revert => match self.last_move.take() {
                Some(snapshot) => engine.revert_move(&snapshot)?,
                None => debug!("no move to revert"),
            },
            ReplayAction::Activate { tab } => {
                let node = node_for(engine, *tab)?;
                engine.activate(node)?;
            }
            ReplayAction::Collapse { tab } => {
                let node = node_for(engine, *tab)?;
                engine.toggle_collapse(node)?;
            }
            ReplayAction::Search { text } => engine.set_search(text.clone()),
            ReplayAction::Advance { ms } => {
                let by = i64::try_from(*ms)
                    .ok()
                    .and_then(TimeDelta::try_milliseconds)
                    .unwrap_or(TimeDelta::MAX);
                self.clock.advance(by);
            }
        }
        Ok(())
    }
}

fn node_for(engine: &TabTreeEngine, tab: TabId) -> TabTreeResult<NodeId> {
    engine
        .store()
        .node_for_tab(tab)
        .ok_or(TabTreeError::UnknownReference(Reference::Tab(tab)))
}
