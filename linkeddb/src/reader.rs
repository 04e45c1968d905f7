//! Read-only LinkedDb access and the [`LinkedRead`] trait.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use common::StorageRead;

use crate::error::{Error, Result};
use crate::model::LinkedEntry;
use crate::storage::{LinkedStorageRead, NodeScanIterator};

/// Trait for read operations on a LinkedDb.
///
/// This trait defines the common read interface shared by both
/// [`LinkedDb`](crate::LinkedDb) and [`LinkedDbReader`].
///
/// There is no stored notion of list order: the head is whatever entry has
/// the smallest key right now, and iteration follows the engine's key order.
#[async_trait]
pub trait LinkedRead: Send + Sync {
    /// Returns whether a value is stored under `key`.
    async fn has(&self, key: Bytes) -> Result<bool>;

    /// Gets the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent.
    async fn get(&self, key: Bytes) -> Result<Bytes>;

    /// Returns the entry with the smallest key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there are no entries.
    async fn head(&self) -> Result<LinkedEntry>;

    /// Returns the smallest key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there are no entries.
    async fn head_key(&self) -> Result<Bytes> {
        Ok(self.head().await?.key)
    }

    /// Returns true if there are no entries.
    ///
    /// Any error other than [`Error::NotFound`] from the head lookup is
    /// returned unchanged.
    async fn is_empty(&self) -> Result<bool> {
        match self.head_key().await {
            Ok(_) => Ok(false),
            Err(Error::NotFound) => Ok(true),
            Err(err) => Err(err),
        }
    }

    /// Iterates every entry in ascending key order.
    async fn iter(&self) -> Result<LinkedIterator>;

    /// Iterates entries whose key is `>= start`, in ascending key order.
    async fn iter_from(&self, start: Bytes) -> Result<LinkedIterator>;
}

/// A read-only view of a LinkedDb.
///
/// `LinkedDbReader` provides access to all read operations via the
/// [`LinkedRead`] trait, but not write operations. It can sit on top of any
/// [`StorageRead`], including an engine snapshot (see
/// [`LinkedDb::snapshot`](crate::LinkedDb::snapshot)).
#[derive(Clone)]
pub struct LinkedDbReader {
    storage: LinkedStorageRead,
}

impl LinkedDbReader {
    /// Creates a reader over an existing storage implementation.
    pub fn new(storage: Arc<dyn StorageRead>) -> Self {
        Self::from_storage(LinkedStorageRead::new(storage))
    }

    pub(crate) fn from_storage(storage: LinkedStorageRead) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl LinkedRead for LinkedDbReader {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn has(&self, key: Bytes) -> Result<bool> {
        self.storage.has(&key).await
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn get(&self, key: Bytes) -> Result<Bytes> {
        self.storage.get(&key).await
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn head(&self) -> Result<LinkedEntry> {
        self.storage.head().await
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn iter(&self) -> Result<LinkedIterator> {
        let inner = self.storage.scan().await?;
        Ok(LinkedIterator::new(inner))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn iter_from(&self, start: Bytes) -> Result<LinkedIterator> {
        let inner = self.storage.scan_from(&start).await?;
        Ok(LinkedIterator::new(inner))
    }
}

/// Iterator over LinkedDb entries in ascending key order.
///
/// Once [`next`](LinkedIterator::next) returns `Ok(None)` or an error, every
/// later call returns `Ok(None)`. Engine resources held by the iterator are
/// released at that point, or when the iterator is dropped.
pub struct LinkedIterator {
    pub(crate) inner: NodeScanIterator,
}

impl LinkedIterator {
    pub(crate) fn new(inner: NodeScanIterator) -> Self {
        Self { inner }
    }

    /// Returns the next entry, or None if iteration is complete.
    pub async fn next(&mut self) -> Result<Option<LinkedEntry>> {
        self.inner.next().await
    }
}
