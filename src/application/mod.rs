//! Application Layer
//!
//! Use cases that orchestrate the domain.
//! This layer:
//! - Depends on Domain layer (store, services, ports)
//! - Serializes every mutation: one call runs to completion before the next
//! - Talks to the host only through the `TabHost` and `Clock` ports
//!
//! ## Use Cases
//!
//! - `EventReconciler` - Applies host lifecycle events to the store
//! - `DragDropEngine` - Validated reparent / reorder with revert
//! - `CloseUndoManager` - Smart close with confirmation threshold and undo window
//! - `SnapshotScheduler` - Debounces persistence snapshots
//! - `TabTreeEngine` - Facade over all of the above
//! - `Replayer` - Drives the engine through a recorded session

pub mod close;
pub mod drag_drop;
pub mod engine;
pub mod persistence;
pub mod reconcile;
pub mod replay;
pub mod ui_state;

pub use close::{CloseDecision, CloseReceipt, CloseUndoManager, UndoReceipt};
pub use drag_drop::{DragDropEngine, MoveOutcome, MovePlan};
pub use engine::{RestoreReport, TabTreeEngine};
pub use persistence::SnapshotScheduler;
pub use reconcile::{EventReconciler, Reconciled, TabEvent};
pub use replay::{FeedItem, RejectedLine, ReplayAction, ReplaySummary, Replayer};
pub use ui_state::{CollapseState, SearchState};
