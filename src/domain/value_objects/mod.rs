//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts: identifiers,
//! host-reported tab flags, timestamps and attribute deltas.

mod ids;
mod tab_state;

pub use ids::{CommandId, NodeId, OperationId, TabId, WindowId};
pub use tab_state::{AttributeDelta, TabFlags, Timestamps};
