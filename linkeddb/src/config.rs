//! Configuration options for LinkedDb operations.

use common::StorageConfig;

/// Configuration for opening a [`LinkedDb`](crate::LinkedDb).
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Storage backend configuration.
    pub storage: StorageConfig,
}

/// Options for write operations.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// If true, waits for the write to be durable before returning.
    /// Default: false (returns once the write is visible to readers).
    pub await_durable: bool,
}
