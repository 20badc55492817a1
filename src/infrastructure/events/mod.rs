//! Event Feed and Command Sink Implementations
//!
//! - `NdjsonFeed`: reads host events, command results and replay actions
//! - `NdjsonCommandSink`: `TabHost` that writes commands as NDJSON

mod feed;
mod json;

pub use feed::{parse_line, NdjsonFeed};
pub use json::NdjsonCommandSink;
