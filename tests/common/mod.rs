//! Common test utilities for tabtree scenario, property and CLI tests.
//!
//! - `Session`: an engine wired to a recording host and a manual clock
//! - `TestEnv`: isolated temp directory plus helpers to run the `tabtree` binary

#![allow(dead_code)]

pub mod env;
pub mod session;

pub use env::*;
pub use session::*;
