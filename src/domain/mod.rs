//! Domain Layer
//!
//! The tab forest and everything that can be computed from it without I/O.
//!
//! ## Structure
//!
//! - `value_objects/` - Ids, tab flags, timestamps, attribute deltas
//! - `entities/` - `TabTreeNode`, `WindowGroup`, drag and close snapshots
//! - `store/` - `NodeStore` arena and the invariant checker
//! - `services/` - `TreeBuilder`, `ViewProjector`, snapshot codec
//! - `ports/` - Interfaces for the host, the clock and snapshot storage
//!
//! ## Design Principles
//!
//! 1. **No I/O** - Host commands and storage go through ports
//! 2. **Ids, not references** - Parent and child links are `NodeId`s into the store
//! 3. **Consistent after every call** - Store mutators never leave a half-moved subtree

pub mod entities;
pub mod ports;
pub mod services;
pub mod store;
pub mod value_objects;
