//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod clock;
pub mod snapshot_repository;
pub mod tab_host;

pub use clock::{Clock, ManualClock, SystemClock};
pub use snapshot_repository::SnapshotRepository;
pub use tab_host::{CommandResult, IssuedCommand, NoopHost, RecordingHost, TabCommand, TabHost};
