//! SlateDB-backed storage.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use slatedb::config::{Settings, WriteOptions as SlateWriteOptions};
use slatedb::object_store::{self, ObjectStore};
use slatedb::{Db, DbBuilder, DbIterator, DbSnapshot, WriteBatch};

use super::config::{ObjectStoreConfig, SlateDbStorageConfig};
use super::{
    PutRecordOp, RecordOp, Storage, StorageError, StorageIterator, StorageRead, StorageResult,
    StorageSnapshot, WriteOptions,
};
use crate::{BytesRange, Record};

/// Creates an object store from configuration.
pub fn create_object_store(config: &ObjectStoreConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    match config {
        ObjectStoreConfig::InMemory => Ok(Arc::new(object_store::memory::InMemory::new())),
        ObjectStoreConfig::Local(local_config) => {
            std::fs::create_dir_all(&local_config.path).map_err(|e| {
                StorageError::Storage(format!(
                    "Failed to create storage directory '{}': {}",
                    local_config.path, e
                ))
            })?;
            let store = object_store::local::LocalFileSystem::new_with_prefix(&local_config.path)
                .map_err(|e| {
                    StorageError::Storage(format!("Failed to create local filesystem store: {}", e))
                })?;
            Ok(Arc::new(store))
        }
    }
}

/// [`Storage`] over a SlateDB database.
pub struct SlateDbStorage {
    db: Arc<Db>,
}

impl SlateDbStorage {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// Opens (or creates) the database described by `config`.
    pub async fn open(config: &SlateDbStorageConfig) -> StorageResult<Self> {
        let object_store = create_object_store(&config.object_store)?;

        let settings = match &config.settings_path {
            Some(path) => Settings::from_file(path).map_err(|e| {
                StorageError::Storage(format!(
                    "Failed to load SlateDB settings from {}: {}",
                    path, e
                ))
            })?,
            None => Settings::load().unwrap_or_default(),
        };

        let db = DbBuilder::new(config.path.clone(), object_store)
            .with_settings(settings)
            .build()
            .await
            .map_err(|e| StorageError::Storage(format!("Failed to create SlateDB: {}", e)))?;

        tracing::debug!(path = %config.path, "opened SlateDB storage");
        Ok(Self::new(Arc::new(db)))
    }
}

struct SlateDbIterator {
    inner: DbIterator,
}

#[async_trait]
impl StorageIterator for SlateDbIterator {
    async fn next(&mut self) -> StorageResult<Option<Record>> {
        let kv = self.inner.next().await.map_err(StorageError::from_storage)?;
        Ok(kv.map(|kv| Record::new(kv.key, kv.value)))
    }
}

#[async_trait]
impl StorageRead for SlateDbStorage {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let value = self
            .db
            .get(&key)
            .await
            .map_err(StorageError::from_storage)?;
        Ok(value.map(|value| Record::new(key, value)))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        let inner = self
            .db
            .scan::<Bytes, _>(range)
            .await
            .map_err(StorageError::from_storage)?;
        Ok(Box::new(SlateDbIterator { inner }))
    }
}

#[async_trait]
impl Storage for SlateDbStorage {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn apply(&self, ops: Vec<RecordOp>) -> StorageResult<()> {
        let mut batch = WriteBatch::new();
        for op in ops {
            match op {
                RecordOp::Put(op) => batch.put(op.record.key, op.record.value),
                RecordOp::Delete(key) => batch.delete(key),
            }
        }
        self.db.write(batch).await.map_err(StorageError::from_storage)
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn put_with_options(
        &self,
        records: Vec<PutRecordOp>,
        options: WriteOptions,
    ) -> StorageResult<()> {
        let mut batch = WriteBatch::new();
        for op in records {
            batch.put(op.record.key, op.record.value);
        }
        let write_options = SlateWriteOptions {
            await_durable: options.await_durable,
        };
        self.db
            .write_with_options(batch, &write_options)
            .await
            .map_err(StorageError::from_storage)
    }

    async fn snapshot(&self) -> StorageResult<Arc<dyn StorageSnapshot>> {
        let snapshot = self
            .db
            .snapshot()
            .await
            .map_err(StorageError::from_storage)?;
        Ok(Arc::new(SlateDbStorageSnapshot { snapshot }))
    }

    async fn flush(&self) -> StorageResult<()> {
        self.db.flush().await.map_err(StorageError::from_storage)
    }

    async fn close(&self) -> StorageResult<()> {
        self.db.close().await.map_err(StorageError::from_storage)
    }
}

/// Point-in-time view over a SlateDB database.
pub struct SlateDbStorageSnapshot {
    snapshot: Arc<DbSnapshot>,
}

#[async_trait]
impl StorageRead for SlateDbStorageSnapshot {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let value = self
            .snapshot
            .get(&key)
            .await
            .map_err(StorageError::from_storage)?;
        Ok(value.map(|value| Record::new(key, value)))
    }

    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        let inner = self
            .snapshot
            .scan::<Bytes, _>(range)
            .await
            .map_err(StorageError::from_storage)?;
        Ok(Box::new(SlateDbIterator { inner }))
    }
}

#[async_trait]
impl StorageSnapshot for SlateDbStorageSnapshot {}
