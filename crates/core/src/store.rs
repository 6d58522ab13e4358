//! ProjectStore trait: where finished turns are persisted.
//!
//! A project is the conversation a client has had plus the file tree it
//! produced. The session saves at most once per request, after the stream
//! has been delivered; failures are logged by the caller and never reach
//! the client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uigen_vfs::Snapshot;
use crate::error::StoreError;
use crate::message::Turn;

/// A persisted project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Client-assigned project id
    pub project_id: String,

    /// Display conversation: the client's turns plus the assistant's text
    pub messages: Vec<Turn>,

    /// File tree at the end of the turn
    pub files: Snapshot,

    /// When the record was written
    pub updated_at: DateTime<Utc>,
}

impl ProjectRecord {
    pub fn new(project_id: impl Into<String>, messages: Vec<Turn>, files: Snapshot) -> Self {
        Self {
            project_id: project_id.into(),
            messages,
            files,
            updated_at: Utc::now(),
        }
    }
}

/// Project persistence backend.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Backend name (e.g., "file", "memory", "none").
    fn name(&self) -> &str;

    /// Insert or replace the record for `record.project_id`.
    async fn save(&self, record: ProjectRecord) -> std::result::Result<(), StoreError>;

    /// Load a project, or `None` if it was never saved.
    async fn load(
        &self,
        project_id: &str,
    ) -> std::result::Result<Option<ProjectRecord>, StoreError>;
}
