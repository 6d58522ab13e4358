//! File-based project store: one JSON document per project.
//!
//! Storage location: `~/.uigen/projects/<project_id>.json` by default.
//! Writes go to a temporary sibling first and are renamed into place, so a
//! crash mid-write never leaves a truncated record behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use uigen_core::error::StoreError;
use uigen_core::store::{ProjectRecord, ProjectStore};
use uuid::Uuid;

const MAX_ID_LEN: usize = 128;

/// A directory of `<project_id>.json` files.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a project's record. Only ids made of ASCII letters, digits,
    /// `-` and `_` map to a file; anything else is rejected.
    fn record_path(&self, project_id: &str) -> Result<PathBuf, StoreError> {
        let safe = !project_id.is_empty()
            && project_id.len() <= MAX_ID_LEN
            && project_id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !safe {
            return Err(StoreError::InvalidProjectId(project_id.to_string()));
        }
        Ok(self.dir.join(format!("{project_id}.json")))
    }
}

#[async_trait]
impl ProjectStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn save(&self, record: ProjectRecord) -> Result<(), StoreError> {
        let path = self.record_path(&record.project_id)?;
        let json =
            serde_json::to_vec_pretty(&record).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = self.dir.join(format!(".{}.{}.tmp", record.project_id, Uuid::new_v4()));
        tokio::fs::write(&tmp, &json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(path = %path.display(), bytes = json.len(), "Project saved");
        Ok(())
    }

    async fn load(&self, project_id: &str) -> Result<Option<ProjectRecord>, StoreError> {
        let path = self.record_path(project_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;
        Ok(Some(record))
    }
}
