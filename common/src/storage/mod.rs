pub mod config;
pub mod factory;
pub mod in_memory;
#[cfg(feature = "slatedb")]
pub mod slate;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::BytesRange;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub key: Bytes,
    pub value: Bytes,
}

impl Record {
    pub fn new(key: Bytes, value: Bytes) -> Self {
        Self { key, value }
    }

    pub fn empty(key: Bytes) -> Self {
        Self::new(key, Bytes::new())
    }
}

/// A record being put.
#[derive(Clone, Debug)]
pub struct PutRecordOp {
    pub record: Record,
}

impl PutRecordOp {
    pub fn new(record: Record) -> Self {
        Self { record }
    }
}

impl From<Record> for PutRecordOp {
    fn from(record: Record) -> Self {
        Self::new(record)
    }
}

#[derive(Clone, Debug)]
pub enum RecordOp {
    Put(PutRecordOp),
    Delete(Bytes),
}

/// Options for write operations.
///
/// Controls the durability behavior of [`Storage::put_with_options`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Whether to wait for the write to be durable before returning.
    ///
    /// When `false` (the default), the operation returns as soon as the data
    /// is visible to readers, which risks losing it on crash.
    pub await_durable: bool,
}

/// Error type for storage operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Errors reported by the engine
    Storage(String),
    /// Internal errors such as poisoned locks
    Internal(String),
}

impl std::error::Error for StorageError {}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            StorageError::Storage(msg) => write!(f, "Storage error: {}", msg),
            StorageError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StorageError {
    /// Converts an engine error to StorageError::Storage.
    pub fn from_storage(e: impl std::fmt::Display) -> Self {
        StorageError::Storage(e.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Ascending cursor over storage records.
///
/// A cursor may pin engine resources (a read snapshot, open files). They are
/// released when the cursor is dropped.
#[async_trait]
pub trait StorageIterator {
    async fn next(&mut self) -> StorageResult<Option<Record>>;
}

/// Read operations supported by both [`Storage`] and [`StorageSnapshot`].
#[async_trait]
pub trait StorageRead: Send + Sync {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>>;

    /// Returns whether a record exists for `key`.
    #[tracing::instrument(level = "trace", skip_all)]
    async fn has(&self, key: Bytes) -> StorageResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Returns a cursor over records in `range`, in ascending key order.
    ///
    /// The returned iterator is owned and does not borrow from the storage,
    /// allowing it to be stored in structs or passed across await points.
    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>>;

    /// Collects all records in the range into a Vec.
    #[tracing::instrument(level = "trace", skip_all)]
    async fn scan(&self, range: BytesRange) -> StorageResult<Vec<Record>> {
        let mut iter = self.scan_iter(range).await?;
        let mut records = Vec::new();
        while let Some(record) = iter.next().await? {
            records.push(record);
        }
        Ok(records)
    }
}

/// A point-in-time snapshot of the storage layer.
///
/// Reads from a snapshot will not see any subsequent writes to the underlying
/// storage.
#[async_trait]
pub trait StorageSnapshot: StorageRead {}

/// Read-write access to the underlying engine (in-memory or SlateDB).
#[async_trait]
pub trait Storage: StorageRead {
    /// Applies a batch of puts and deletes atomically.
    async fn apply(&self, ops: Vec<RecordOp>) -> StorageResult<()>;

    async fn put(&self, records: Vec<PutRecordOp>) -> StorageResult<()> {
        self.put_with_options(records, WriteOptions::default())
            .await
    }

    /// Writes records to storage with custom durability options.
    async fn put_with_options(
        &self,
        records: Vec<PutRecordOp>,
        options: WriteOptions,
    ) -> StorageResult<()>;

    /// Creates a point-in-time snapshot of the storage.
    async fn snapshot(&self) -> StorageResult<Arc<dyn StorageSnapshot>>;

    /// Flushes all pending writes to durable storage.
    async fn flush(&self) -> StorageResult<()>;

    /// Closes the storage, releasing any resources.
    async fn close(&self) -> StorageResult<()>;
}
