//! Event reconciliation
//!
//! Host lifecycle events and the reconciler that folds them into the store.

mod event;
mod reconciler;


pub use event::TabEvent;
pub use reconciler::{EventReconciler, Reconciled};
