//! Storage factory for creating storage instances from configuration.

use std::sync::Arc;

use super::config::StorageConfig;
use super::in_memory::InMemoryStorage;
use super::{Storage, StorageResult};

/// Creates a storage instance based on the provided configuration.
///
/// # Errors
///
/// Returns `StorageError::Storage` if the backend cannot be initialized, or
/// if SlateDB is requested but the `slatedb` feature is disabled.
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    match config {
        StorageConfig::InMemory => Ok(Arc::new(InMemoryStorage::new())),
        #[cfg(feature = "slatedb")]
        StorageConfig::SlateDb(slate_config) => {
            let storage = super::slate::SlateDbStorage::open(slate_config).await?;
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "slatedb"))]
        StorageConfig::SlateDb(slate_config) => Err(super::StorageError::Storage(format!(
            "cannot open SlateDB at '{}': built without the `slatedb` feature",
            slate_config.path
        ))),
    }
}
