//! Storage engine boundary for LinkedDb.
//!
//! Everything above this crate talks to a sorted key-value engine through the
//! [`StorageRead`] and [`Storage`] traits. Engines order keys by unsigned
//! byte-lexicographic comparison and hand out owned ascending cursors via
//! [`StorageRead::scan_iter`].

pub mod bytes;
pub mod storage;

pub use crate::bytes::BytesRange;
pub use storage::config::{ObjectStoreConfig, SlateDbStorageConfig, StorageConfig};
pub use storage::{
    PutRecordOp, Record, RecordOp, Storage, StorageError, StorageIterator, StorageRead,
    StorageResult, StorageSnapshot, WriteOptions,
};
