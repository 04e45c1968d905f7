use std::collections::BTreeMap;
use std::ops::RangeBounds;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use super::{PutRecordOp, Storage, StorageSnapshot, WriteOptions};
use crate::storage::RecordOp;
use crate::{BytesRange, Record, StorageError, StorageIterator, StorageRead, StorageResult};

/// In-memory implementation of the Storage trait using a BTreeMap.
///
/// Keys are ordered by unsigned byte comparison, the same order SlateDB uses.
/// Cursors copy the scanned range when they are created, so an open cursor
/// never observes writes made after it was opened.
pub struct InMemoryStorage {
    data: Arc<RwLock<BTreeMap<Bytes, Bytes>>>,
}

impl InMemoryStorage {
    /// Creates a new InMemoryStorage instance with an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn scan_map(data: &BTreeMap<Bytes, Bytes>, range: &BytesRange) -> Vec<Record> {
    data.range((range.start_bound().cloned(), range.end_bound().cloned()))
        .map(|(k, v)| Record::new(k.clone(), v.clone()))
        .collect()
}

#[async_trait]
impl StorageRead for InMemoryStorage {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&key).map(|value| Record::new(key, value.clone())))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn has(&self, key: Bytes) -> StorageResult<bool> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.contains_key(&key))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(format!("Failed to acquire read lock: {}", e)))?;

        let records = scan_map(&data, &range);
        Ok(Box::new(InMemoryIterator { records, index: 0 }))
    }
}

struct InMemoryIterator {
    records: Vec<Record>,
    index: usize,
}

#[async_trait]
impl StorageIterator for InMemoryIterator {
    async fn next(&mut self) -> StorageResult<Option<Record>> {
        match self.records.get(self.index) {
            Some(record) => {
                self.index += 1;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }
}

/// In-memory snapshot that holds a copy of the data at the time of snapshot creation.
pub struct InMemoryStorageSnapshot {
    data: Arc<BTreeMap<Bytes, Bytes>>,
}

#[async_trait]
impl StorageRead for InMemoryStorageSnapshot {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        Ok(self
            .data
            .get(&key)
            .map(|value| Record::new(key, value.clone())))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        let records = scan_map(&self.data, &range);
        Ok(Box::new(InMemoryIterator { records, index: 0 }))
    }
}

#[async_trait]
impl StorageSnapshot for InMemoryStorageSnapshot {}

#[async_trait]
impl Storage for InMemoryStorage {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn apply(&self, ops: Vec<RecordOp>) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(format!("Failed to acquire write lock: {}", e)))?;

        for op in ops {
            match op {
                RecordOp::Put(op) => {
                    data.insert(op.record.key, op.record.value);
                }
                RecordOp::Delete(key) => {
                    data.remove(&key);
                }
            }
        }

        Ok(())
    }

    /// Writes a batch of records within a single write lock acquisition.
    ///
    /// Write options are ignored since there is no durable storage to await.
    #[tracing::instrument(level = "trace", skip_all)]
    async fn put_with_options(
        &self,
        records: Vec<PutRecordOp>,
        _options: WriteOptions,
    ) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(format!("Failed to acquire write lock: {}", e)))?;

        for op in records {
            data.insert(op.record.key, op.record.value);
        }

        Ok(())
    }

    async fn snapshot(&self) -> StorageResult<Arc<dyn StorageSnapshot>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(format!("Failed to acquire read lock: {}", e)))?;

        Ok(Arc::new(InMemoryStorageSnapshot {
            data: Arc::new(data.clone()),
        }))
    }

    async fn flush(&self) -> StorageResult<()> {
        // all writes are immediately visible
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Injected failure that fires either once or on every call.
#[cfg(feature = "test-utils")]
#[derive(Clone)]
enum Failure {
    /// Error is returned once, then automatically cleared.
    Once(StorageError),
    /// Error is returned on every subsequent call until explicitly cleared.
    Persistent(StorageError),
}

#[cfg(feature = "test-utils")]
type FailSlot = arc_swap::ArcSwap<Option<Failure>>;

/// Returns the error armed in `slot`, if any.
///
/// A [`Failure::Once`] is swapped out so that it fires exactly once.
#[cfg(feature = "test-utils")]
fn check_failure(slot: &FailSlot) -> StorageResult<()> {
    let guard = slot.load();
    match guard.as_ref() {
        None => Ok(()),
        Some(Failure::Persistent(err)) => Err(err.clone()),
        Some(Failure::Once(_)) => {
            // if another caller raced us only one of them sees the error
            let prev = slot.swap(Arc::new(None));
            match prev.as_ref() {
                Some(Failure::Once(err)) => Err(err.clone()),
                _ => Ok(()),
            }
        }
    }
}

#[cfg(feature = "test-utils")]
fn arm(slot: &FailSlot, failure: Failure) {
    slot.store(Arc::new(Some(failure)));
}

/// A storage wrapper that delegates to an inner [`Storage`] but can inject
/// failures on demand.
///
/// Reads (`get`/`has`), cursor creation (`scan_iter`), writes
/// (`apply`/`put_with_options`), `flush` and `snapshot` each have their own
/// failure slot. Failures are either persistent (until [`clear`] is called)
/// or fire once and clear themselves.
///
/// Gated behind the `test-utils` feature.
///
/// ```ignore
/// let storage = FailingStorage::wrap(Arc::new(InMemoryStorage::new()));
/// storage.fail_scan(StorageError::Storage("disk gone".into()));
/// // every scan_iter call now returns Err(...)
/// ```
///
/// [`clear`]: FailingStorage::clear
#[cfg(feature = "test-utils")]
pub struct FailingStorage {
    inner: Arc<dyn Storage>,
    fail_get: FailSlot,
    fail_scan: FailSlot,
    fail_write: FailSlot,
    fail_flush: FailSlot,
    fail_snapshot: FailSlot,
}

#[cfg(feature = "test-utils")]
impl FailingStorage {
    /// Wraps an existing storage, with all failure injections initially `None`.
    pub fn wrap(inner: Arc<dyn Storage>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_get: arc_swap::ArcSwap::from_pointee(None),
            fail_scan: arc_swap::ArcSwap::from_pointee(None),
            fail_write: arc_swap::ArcSwap::from_pointee(None),
            fail_flush: arc_swap::ArcSwap::from_pointee(None),
            fail_snapshot: arc_swap::ArcSwap::from_pointee(None),
        })
    }

    /// Makes `get` and `has` fail on every subsequent call.
    pub fn fail_get(&self, err: StorageError) {
        arm(&self.fail_get, Failure::Persistent(err));
    }

    /// Makes `scan_iter` fail on every subsequent call.
    pub fn fail_scan(&self, err: StorageError) {
        arm(&self.fail_scan, Failure::Persistent(err));
    }

    /// Makes the next `scan_iter` call fail.
    pub fn fail_scan_once(&self, err: StorageError) {
        arm(&self.fail_scan, Failure::Once(err));
    }

    /// Makes `apply`, `put` and `put_with_options` fail on every subsequent call.
    pub fn fail_write(&self, err: StorageError) {
        arm(&self.fail_write, Failure::Persistent(err));
    }

    /// Makes the next write fail.
    pub fn fail_write_once(&self, err: StorageError) {
        arm(&self.fail_write, Failure::Once(err));
    }

    /// Makes `flush` fail on every subsequent call.
    pub fn fail_flush(&self, err: StorageError) {
        arm(&self.fail_flush, Failure::Persistent(err));
    }

    /// Makes `snapshot` fail on every subsequent call.
    pub fn fail_snapshot(&self, err: StorageError) {
        arm(&self.fail_snapshot, Failure::Persistent(err));
    }

    /// Disarms every failure slot.
    pub fn clear(&self) {
        for slot in [
            &self.fail_get,
            &self.fail_scan,
            &self.fail_write,
            &self.fail_flush,
            &self.fail_snapshot,
        ] {
            slot.store(Arc::new(None));
        }
    }
}

#[cfg(feature = "test-utils")]
#[async_trait]
impl StorageRead for FailingStorage {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        check_failure(&self.fail_get)?;
        self.inner.get(key).await
    }

    async fn has(&self, key: Bytes) -> StorageResult<bool> {
        check_failure(&self.fail_get)?;
        self.inner.has(key).await
    }

    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        check_failure(&self.fail_scan)?;
        self.inner.scan_iter(range).await
    }
}

#[cfg(feature = "test-utils")]
#[async_trait]
impl Storage for FailingStorage {
    async fn apply(&self, ops: Vec<RecordOp>) -> StorageResult<()> {
        check_failure(&self.fail_write)?;
        self.inner.apply(ops).await
    }

    async fn put_with_options(
        &self,
        records: Vec<PutRecordOp>,
        options: WriteOptions,
    ) -> StorageResult<()> {
        check_failure(&self.fail_write)?;
        self.inner.put_with_options(records, options).await
    }

    async fn snapshot(&self) -> StorageResult<Arc<dyn StorageSnapshot>> {
        check_failure(&self.fail_snapshot)?;
        self.inner.snapshot().await
    }

    async fn flush(&self) -> StorageResult<()> {
        check_failure(&self.fail_flush)?;
        self.inner.flush().await
    }

    async fn close(&self) -> StorageResult<()> {
        self.inner.close().await
    }
}
