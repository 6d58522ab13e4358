//! In-memory store: useful for testing and ephemeral servers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uigen_core::error::StoreError;
use uigen_core::store::{ProjectRecord, ProjectStore};

/// Keeps the latest record per project in a map.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<HashMap<String, ProjectRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored projects.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    fn name(&self) -> &str { "memory" }

    async fn save(&self, record: ProjectRecord) -> Result<(), StoreError> {
        if record.project_id.is_empty() {
            return Err(StoreError::InvalidProjectId(record.project_id));
        }
        self.records
            .write()
            .await
            .insert(record.project_id.clone(), record);
        Ok(())
    }

    async fn load(&self, project_id: &str) -> Result<Option<ProjectRecord>, StoreError> {
        Ok(self.records.read().await.get(project_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uigen_core::message::Turn;
    use uigen_vfs::Snapshot;

    #[tokio::test]
    async fn save_replaces_previous_record() {
        let store = InMemoryStore::new();
        store
            .save(ProjectRecord::new("p1", vec![Turn::user("first")], Snapshot::new()))
            .await
            .unwrap();
        store
            .save(ProjectRecord::new("p1", vec![Turn::user("second")], Snapshot::new()))
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
        let loaded = store.load("p1").await.unwrap().unwrap();
        assert_eq!(loaded.messages, vec![Turn::user("second")]);
        assert!(store.load("p2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_id_rejected() {
        let store = InMemoryStore::new();
        let err = store
            .save(ProjectRecord::new("", vec![], Snapshot::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidProjectId(_)));
        assert!(store.is_empty().await);
    }
}
