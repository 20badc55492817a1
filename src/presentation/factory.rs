//! Engine Factory
//!
//! Wires the engine to concrete ports. This is the dependency injection point
//! for the CLI.

use std::sync::Arc;

use chrono::Utc;

use crate::application::{Replayer, TabTreeEngine};
use crate::config::EngineConfig;
use crate::domain::ports::{ManualClock, NoopHost, SystemClock, TabHost};
use crate::infrastructure::JsonSnapshotRepository;

/// Engine on the wall clock, for a live host bridge
pub fn create_engine(config: EngineConfig, host: Arc<dyn TabHost>) -> TabTreeEngine {
    TabTreeEngine::new(config, host, Arc::new(SystemClock))
}

/// Engine plus replay driver sharing one manual clock, started at the current time.
///
/// Time only moves when the session log says so.
pub fn create_replay(config: EngineConfig, host: Arc<dyn TabHost>) -> (TabTreeEngine, Replayer) {
    let clock = ManualClock::starting_at(Utc::now());
    let engine = TabTreeEngine::new(config, host, Arc::new(clock.clone()));
    (engine, Replayer::new(clock))
}

/// Replay with host commands dropped
pub fn create_silent_replay(config: EngineConfig) -> (TabTreeEngine, Replayer) {
    create_replay(config, Arc::new(NoopHost))
}

pub fn create_snapshot_repository() -> JsonSnapshotRepository {
    JsonSnapshotRepository::pretty()
}
