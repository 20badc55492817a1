//! Engine facade
//!
//! `TabTreeEngine` wires the store, the use cases and the host ports together
//! and exposes the query/command surface used by presentation.

mod facade;

#[cfg(test)]
mod tests;

pub use facade::{RestoreReport, TabTreeEngine};
