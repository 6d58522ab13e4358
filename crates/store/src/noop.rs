//! No-op store: disables project persistence entirely.

use async_trait::async_trait;
use uigen_core::error::StoreError;
use uigen_core::store::{ProjectRecord, ProjectStore};

/// A store that keeps nothing.
pub struct NoopStore;

#[async_trait]
impl ProjectStore for NoopStore {
    fn name(&self) -> &str { "none" }

    async fn save(&self, _record: ProjectRecord) -> Result<(), StoreError> {
        Ok(())
    }

    async fn load(&self, _project_id: &str) -> Result<Option<ProjectRecord>, StoreError> {
        Ok(None)
    }
}
