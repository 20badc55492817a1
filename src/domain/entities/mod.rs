//! Domain Entities
//!
//! Core domain entities that have identity and lifecycle.
//! - `TabTreeNode` - One tab in the forest
//! - `WindowGroup` - A host window and its ordered roots
//! - `DragSnapshot` / `CloseSnapshot` - Pre-mutation captures used for revert and undo

mod node;
mod snapshots;
mod window;

pub use node::{TabFact, TabTreeNode};
pub use snapshots::{CloseSnapshot, ClosedNode, DragSnapshot};
pub use window::WindowGroup;
