//! Smart close and undo

mod use_case;


pub use use_case::{
    CloseDecision, CloseReceipt, CloseUndoManager, UndoReceipt, DEFAULT_UNDO_WINDOW_SECS,
    TOMBSTONE_LIMIT,
};
