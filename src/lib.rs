//! tabtree - tree-structured browser tab synchronization engine
//!
//! tabtree keeps a forest of tab nodes in step with a browser's flat tab
//! strip. Host lifecycle events are folded into the forest, user
//! reparenting and smart close are pushed back to the host as commands, and
//! a filtered, collapsible view is projected for rendering.
//!
//! The entry point is [`TabTreeEngine`].

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{CloseDecision, FeedItem, ReplayAction, TabEvent, TabTreeEngine};
pub use config::EngineConfig;
pub use domain::ports::{CommandResult, TabCommand, TabHost};
pub use domain::services::{SerializedForest, VisibleNode};
pub use domain::store::{NodeStore, Slot};
pub use domain::value_objects::{CommandId, NodeId, OperationId, TabId, WindowId};
pub use error::{TabTreeError, TabTreeResult};
