//! SnapshotRepository port - abstraction for forest persistence
//!
//! The engine produces and consumes `SerializedForest`; where it is kept is
//! up to the implementation.

use std::path::Path;

use crate::domain::services::SerializedForest;
use crate::error::TabTreeResult;

pub trait SnapshotRepository {
    /// Load a snapshot, or `None` if nothing has been saved at `path` yet
    fn load(&self, path: &Path) -> TabTreeResult<Option<SerializedForest>>;

    /// Replace whatever is stored at `path`
    fn save(&self, forest: &SerializedForest, path: &Path) -> TabTreeResult<()>;
}
