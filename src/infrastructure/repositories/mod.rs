//! Repository Implementations
//!
//! Concrete implementations of domain repository ports.

mod snapshot;

pub use snapshot::JsonSnapshotRepository;
