//! Core LinkedDb implementation with read and write APIs.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use common::Storage;
use common::storage::factory::create_storage;

use crate::config::{Config, WriteOptions};
use crate::error::Result;
use crate::model::LinkedEntry;
use crate::reader::{LinkedDbReader, LinkedIterator, LinkedRead};
use crate::storage::LinkedStorage;

/// The main LinkedDb interface providing read and write operations.
///
/// `LinkedDb` stores values under namespaced keys in a sorted engine and
/// exposes them as an ordered list: [`head`](LinkedRead::head) is the
/// smallest key and iteration walks keys in ascending byte order.
///
/// # Read Operations
///
/// Read operations are provided via the [`LinkedRead`] trait, which `LinkedDb`
/// implements. This allows generic code to work with either `LinkedDb` or
/// [`LinkedDbReader`].
///
/// # Thread Safety
///
/// All methods take `&self`. `LinkedDb` adds no locking of its own; the
/// isolation of concurrent reads and writes is that of the engine.
///
/// # Example
///
/// ```ignore
/// use linkeddb::{Config, LinkedDb, LinkedRead};
/// use bytes::Bytes;
///
/// let db = LinkedDb::open(Config::default()).await?;
///
/// db.put(Bytes::from("b"), Bytes::from("2")).await?;
/// db.put(Bytes::from("a"), Bytes::from("1")).await?;
///
/// assert_eq!(db.head_key().await?, Bytes::from("a"));
///
/// let mut iter = db.iter().await?;
/// while let Some(entry) = iter.next().await? {
///     println!("{:?}: {:?}", entry.key, entry.value);
/// }
/// ```
pub struct LinkedDb {
    storage: LinkedStorage,
}

impl LinkedDb {
    /// Opens or creates a LinkedDb with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be initialized.
    pub async fn open(config: Config) -> Result<Self> {
        let storage = create_storage(&config.storage).await?;
        tracing::debug!(storage = ?config.storage, "opened linkeddb");
        Ok(Self::new(storage))
    }

    /// Creates a LinkedDb on top of an existing storage implementation.
    ///
    /// Other data may share the engine as long as its keys sort after
    /// [`HEAD_KEY`](crate::HEAD_KEY).
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage: LinkedStorage::new(storage),
        }
    }

    /// Puts a key-value pair, overwriting any existing value.
    ///
    /// No other entry is touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails due to storage issues.
    pub async fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
        self.put_with_options(key, value, WriteOptions::default())
            .await
    }

    /// Puts a key-value pair with custom options.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn put_with_options(
        &self,
        key: Bytes,
        value: Bytes,
        options: WriteOptions,
    ) -> Result<()> {
        self.storage.put(&key, value, options).await
    }

    /// Deletes a key. No-op if key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails due to storage issues.
    pub async fn delete(&self, key: Bytes) -> Result<()> {
        self.delete_with_options(key, WriteOptions::default())
            .await
    }

    /// Deletes a key with custom options.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn delete_with_options(&self, key: Bytes, options: WriteOptions) -> Result<()> {
        self.storage.delete(&key, options).await
    }

    /// Flushes pending writes to durable storage.
    pub async fn flush(&self) -> Result<()> {
        self.storage.flush().await
    }

    /// Closes the store, releasing resources.
    pub async fn close(self) -> Result<()> {
        self.storage.close().await
    }

    /// Returns a read-only view sharing this store's engine.
    ///
    /// The reader observes writes made through this `LinkedDb`.
    pub fn reader(&self) -> LinkedDbReader {
        LinkedDbReader::from_storage(self.storage.as_read())
    }

    /// Returns a read-only view of the store as it is right now.
    ///
    /// Writes made after this call are not visible through the snapshot.
    pub async fn snapshot(&self) -> Result<LinkedDbReader> {
        let storage = self.storage.snapshot().await?;
        Ok(LinkedDbReader::from_storage(storage))
    }
}

#[async_trait]
impl LinkedRead for LinkedDb {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn has(&self, key: Bytes) -> Result<bool> {
        self.storage.as_read().has(&key).await
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn get(&self, key: Bytes) -> Result<Bytes> {
        self.storage.as_read().get(&key).await
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn head(&self) -> Result<LinkedEntry> {
        self.storage.as_read().head().await
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn iter(&self) -> Result<LinkedIterator> {
        let inner = self.storage.as_read().scan().await?;
        Ok(LinkedIterator::new(inner))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn iter_from(&self, start: Bytes) -> Result<LinkedIterator> {
        let inner = self.storage.as_read().scan_from(&start).await?;
        Ok(LinkedIterator::new(inner))
    }
}
