//! Error types for LinkedDb operations.

use common::StorageError;

/// Error type for LinkedDb operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested key is absent, or the namespace has no head entry.
    ///
    /// This is an expected outcome rather than a failure; see
    /// [`Error::is_not_found`].
    NotFound,

    /// A stored record does not parse against the node record layout.
    CorruptRecord(String),

    /// A stored record carries a codec version this build cannot read.
    UnsupportedVersion(u16),

    /// Invalid input, such as a value too large for the record layout.
    InvalidInput(String),

    /// Storage-related errors from the underlying engine.
    Storage(String),

    /// Internal errors indicating bugs or invariant violations.
    Internal(String),
}

impl Error {
    /// Returns true if this error only signals an absent key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound => write!(f, "Not found"),
            Error::CorruptRecord(msg) => write!(f, "Corrupt record: {}", msg),
            Error::UnsupportedVersion(version) => {
                write!(f, "Unsupported record version: {}", version)
            }
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Storage(msg) => Error::Storage(msg),
            StorageError::Internal(msg) => Error::Internal(msg),
        }
    }
}

/// Result type alias for LinkedDb operations.
pub type Result<T> = std::result::Result<T, Error>;
