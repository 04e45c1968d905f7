//! Data types for LinkedDb operations.

use bytes::Bytes;

/// A key-value entry returned by iteration and head lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedEntry {
    /// The user key, without the namespace prefix.
    pub key: Bytes,
    /// The decoded value.
    pub value: Bytes,
}
