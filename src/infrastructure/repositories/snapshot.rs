//! JSON Snapshot Repository
//!
//! Keeps the serialized forest as a single JSON document. Writes go through a
//! temp file in the same directory and are renamed into place while holding
//! an exclusive lock on `<path>.lock`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::ports::SnapshotRepository;
use crate::domain::services::SerializedForest;
use crate::error::TabTreeResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSnapshotRepository {
    pretty: bool,
}

impl JsonSnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output, for snapshots meant to be read by people
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn lock_path(path: &Path) -> PathBuf {
        path.with_extension("lock")
    }

    fn write_atomic(&self, forest: &SerializedForest, path: &Path) -> TabTreeResult<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        if self.pretty {
            serde_json::to_writer_pretty(tmp.as_file_mut(), forest)?;
        } else {
            serde_json::to_writer(tmp.as_file_mut(), forest)?;
        }
        tmp.as_file_mut().write_all(b"\n")?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl SnapshotRepository for JsonSnapshotRepository {
    fn load(&self, path: &Path) -> TabTreeResult<Option<SerializedForest>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::warn!(path = %path.display(), "snapshot file is empty, ignoring");
            return Ok(None);
        }
        let forest: SerializedForest = serde_json::from_str(&content)?;
        Ok(Some(forest))
    }

    fn save(&self, forest: &SerializedForest, path: &Path) -> TabTreeResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock_file = fs::File::create(Self::lock_path(path))?;
        lock_file.lock_exclusive()?;

        let result = self.write_atomic(forest, path);

        let _ = lock_file.unlock();
        if result.is_ok() {
            tracing::debug!(
                path = %path.display(),
                nodes = forest.nodes.len(),
                "snapshot saved"
            );
        }
        result
    }
}
