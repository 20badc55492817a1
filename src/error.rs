//! Error types for tabtree
//!
//! Uses `thiserror` for library errors. The binary wraps these in `anyhow`.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::store::InvariantViolation;
use crate::domain::value_objects::{CommandId, NodeId, OperationId, TabId, WindowId};

/// Result type alias for tabtree operations
pub type TabTreeResult<T> = Result<T, TabTreeError>;

/// Something an event or request pointed at that the engine does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Tab(TabId),
    Window(WindowId),
    Node(NodeId),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Tab(id) => write!(f, "{}", id),
            Reference::Window(id) => write!(f, "{}", id),
            Reference::Node(id) => write!(f, "node {}", id),
        }
    }
}

/// Why a drag proposal was refused. Checked in declaration order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveRejection {
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("target parent {0} does not exist")]
    TargetNotFound(NodeId),

    #[error("target window {0} does not exist")]
    WindowNotFound(WindowId),

    #[error("a node cannot become its own parent")]
    SelfParent,

    #[error("target {target} is a descendant of the dragged node")]
    Cycle { target: NodeId },

    #[error("index {index} is out of range (max {max})")]
    OutOfRange { index: usize, max: usize },
}

/// Snapshot problems that repair cannot fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Main error type for tabtree operations
#[derive(Error, Debug)]
pub enum TabTreeError {
    /// A structural request was refused before any mutation
    #[error("cannot move {node}: {reason}")]
    StructuralViolation { node: NodeId, reason: MoveRejection },

    /// An event or request referenced something not in the index
    #[error("unknown reference: {0}")]
    UnknownReference(Reference),

    /// Undo was requested after the snapshot's window closed
    #[error("undo window for {operation} elapsed at {expired_at}")]
    UndoExpired {
        operation: OperationId,
        expired_at: DateTime<Utc>,
    },

    /// No close operation with this id was ever recorded
    #[error("nothing to undo for {0}")]
    NothingToUndo(OperationId),

    /// The host reported that an outbound command failed
    #[error("host command {command} failed: {reason}")]
    HostCommandFailure { command: CommandId, reason: String },

    /// The forest failed an invariant check
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    /// Snapshot could not be restored
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Config file could not be parsed
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// A session log line that is not an event, result or action
    #[error("line {line}: {message}")]
    InvalidFeedLine { line: usize, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TabTreeError {
    /// Non-fatal conditions that the engine reports but that leave the forest untouched.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            TabTreeError::Io(_)
                | TabTreeError::InvalidConfig { .. }
                | TabTreeError::InvalidFeedLine { .. }
        )
    }
}
