//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `repositories/` - Snapshot persistence (JSON file)
//! - `events/` - NDJSON session feed and command sink

pub mod events;
pub mod repositories;

pub use events::{NdjsonCommandSink, NdjsonFeed};
pub use repositories::JsonSnapshotRepository;
