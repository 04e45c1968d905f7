//! LinkedDb-specific storage wrappers.
//!
//! [`LinkedStorage`] and [`LinkedStorageRead`] wrap the engine traits with
//! key namespacing and node record encoding. [`NodeScanIterator`] projects an
//! engine cursor back onto user entries.

use std::sync::Arc;

use bytes::Bytes;
use common::{BytesRange, Record, RecordOp, Storage, StorageIterator, StorageRead};

use crate::config::WriteOptions;
use crate::error::{Error, Result};
use crate::model::LinkedEntry;
use crate::serde::node::{decode_value, encode_value};
use crate::serde::{decode_node_key, node_key, node_key_range, node_key_range_from};

/// Read-only node storage operations.
///
/// Wraps `Arc<dyn StorageRead>` with key namespacing and value decoding.
#[derive(Clone)]
pub(crate) struct LinkedStorageRead {
    storage: Arc<dyn StorageRead>,
}

impl LinkedStorageRead {
    pub(crate) fn new(storage: Arc<dyn StorageRead>) -> Self {
        Self { storage }
    }

    pub(crate) async fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.storage.has(node_key(key)).await?)
    }

    /// Gets the decoded value for a user key.
    pub(crate) async fn get(&self, key: &[u8]) -> Result<Bytes> {
        let storage_key = node_key(key);
        let record = self.storage.get(storage_key).await?.ok_or(Error::NotFound)?;
        decode_value(&record.value).inspect_err(|err| {
            tracing::error!(key = ?record.key, error = %err, "failed to decode node record");
        })
    }

    /// Returns the entry with the smallest user key.
    pub(crate) async fn head(&self) -> Result<LinkedEntry> {
        let mut iter = self.scan().await?;
        iter.next().await?.ok_or(Error::NotFound)
    }

    /// Scans every node in ascending user key order.
    pub(crate) async fn scan(&self) -> Result<NodeScanIterator> {
        self.scan_range(node_key_range()).await
    }

    /// Scans nodes whose user key is `>= start`.
    pub(crate) async fn scan_from(&self, start: &[u8]) -> Result<NodeScanIterator> {
        self.scan_range(node_key_range_from(start)).await
    }

    async fn scan_range(&self, range: BytesRange) -> Result<NodeScanIterator> {
        let inner = self.storage.scan_iter(range).await?;
        Ok(NodeScanIterator::new(inner))
    }
}

/// Projects an engine cursor onto LinkedDb entries.
///
/// The first record whose key is outside the node namespace ends the
/// iteration for good, even if the cursor has more records behind it. The
/// cursor is dropped as soon as the iterator is exhausted or fails, and
/// otherwise when the iterator itself is dropped.
pub(crate) struct NodeScanIterator {
    inner: Option<Box<dyn StorageIterator + Send>>,
}

impl NodeScanIterator {
    fn new(inner: Box<dyn StorageIterator + Send>) -> Self {
        Self { inner: Some(inner) }
    }

    /// Returns the next entry, or None if iteration is complete.
    pub(crate) async fn next(&mut self) -> Result<Option<LinkedEntry>> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(None);
        };

        let record = match inner.next().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.release();
                return Ok(None);
            }
            Err(err) => {
                self.release();
                return Err(err.into());
            }
        };

        match project(record) {
            Ok(Some(entry)) => Ok(Some(entry)),
            Ok(None) => {
                self.release();
                Ok(None)
            }
            Err(err) => {
                self.release();
                Err(err)
            }
        }
    }

    fn release(&mut self) {
        self.inner = None;
    }
}

fn project(record: Record) -> Result<Option<LinkedEntry>> {
    let Some(key) = decode_node_key(&record.key) else {
        tracing::debug!(key = ?record.key, "reached end of node namespace");
        return Ok(None);
    };
    let value = decode_value(&record.value).inspect_err(|err| {
        tracing::error!(key = ?record.key, error = %err, "failed to decode node record");
    })?;
    Ok(Some(LinkedEntry { key, value }))
}

/// Read-write node storage operations.
///
/// Wraps `Arc<dyn Storage>` with key namespacing and value encoding.
#[derive(Clone)]
pub(crate) struct LinkedStorage {
    storage: Arc<dyn Storage>,
}

impl LinkedStorage {
    pub(crate) fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Creates a new storage with an in-memory backend.
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        use common::storage::in_memory::InMemoryStorage;
        Self::new(Arc::new(InMemoryStorage::new()))
    }

    /// Returns a read-only view of this storage.
    pub(crate) fn as_read(&self) -> LinkedStorageRead {
        LinkedStorageRead::new(Arc::clone(&self.storage) as Arc<dyn StorageRead>)
    }

    /// Returns a read-only view of a point-in-time snapshot of this storage.
    pub(crate) async fn snapshot(&self) -> Result<LinkedStorageRead> {
        let snapshot = self.storage.snapshot().await?;
        Ok(LinkedStorageRead::new(snapshot as Arc<dyn StorageRead>))
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub(crate) async fn put(&self, key: &[u8], value: Bytes, options: WriteOptions) -> Result<()> {
        let record = Record::new(node_key(key), encode_value(value)?);
        let storage_options = common::WriteOptions {
            await_durable: options.await_durable,
        };
        Ok(self
            .storage
            .put_with_options(vec![record.into()], storage_options)
            .await?)
    }

    /// Deletes a key. No-op if key does not exist.
    pub(crate) async fn delete(&self, key: &[u8], options: WriteOptions) -> Result<()> {
        self.storage
            .apply(vec![RecordOp::Delete(node_key(key))])
            .await?;

        // apply has no options variant, so durability is a separate flush
        if options.await_durable {
            self.flush().await?;
        }
        Ok(())
    }

    pub(crate) async fn flush(&self) -> Result<()> {
        Ok(self.storage.flush().await?)
    }

    pub(crate) async fn close(&self) -> Result<()> {
        Ok(self.storage.close().await?)
    }
}
