//! Node storage
//!
//! `NodeStore` is the single source of truth for the forest. No other
//! component keeps a private copy of structure.

mod invariants;
mod node_store;


pub use invariants::InvariantViolation;
pub use node_store::{Ancestors, NodeStore, Slot};
