//! Project persistence backends for UIGen.
//!
//! Every backend implements `uigen_core::ProjectStore`; [`from_config`]
//! picks one according to the `[store]` section of the config file.

pub mod file_backend;
pub mod in_memory;
pub mod noop;

use std::sync::Arc;
use uigen_config::StoreConfig;
use uigen_core::ProjectStore;

pub use file_backend::FileStore;
pub use in_memory::InMemoryStore;
pub use noop::NoopStore;

/// Build the configured store. Unknown backend names fall back to `none`;
/// config validation rejects them before this is reached.
pub fn from_config(config: &StoreConfig) -> Arc<dyn ProjectStore> {
    match config.backend.as_str() {
        "file" => Arc::new(FileStore::new(config.resolved_dir())),
        "memory" => Arc::new(InMemoryStore::new()),
        other => {
            if other != "none" {
                tracing::warn!(backend = other, "Unknown store backend, persistence disabled");
            }
            Arc::new(NoopStore)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_backend_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = StoreConfig {
            backend: "file".into(),
            dir: Some(dir.path().to_path_buf()),
        };
        assert_eq!(from_config(&file).name(), "file");

        let memory = StoreConfig {
            backend: "memory".into(),
            dir: None,
        };
        assert_eq!(from_config(&memory).name(), "memory");

        let none = StoreConfig {
            backend: "none".into(),
            dir: None,
        };
        assert_eq!(from_config(&none).name(), "none");
    }
}
