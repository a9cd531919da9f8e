//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use std::io;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// The byte stream being saved ended before it was complete, typically
    /// because the client connection behind it dropped.
    #[error("Source stream interrupted: {0}")]
    SourceInterrupted(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[source] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Whether this failure was caused by the incoming data stream being cut
    /// short rather than by the backend itself.
    pub fn is_source_interrupted(&self) -> bool {
        matches!(self, StorageError::SourceInterrupted(_))
    }

    /// Classify an error raised while copying from the source stream.
    pub(crate) fn from_copy(err: io::Error, context: &str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            StorageError::SourceInterrupted(format!("{}: {}", context, err))
        } else {
            StorageError::UploadFailed(format!("{}: {}", context, err))
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            StorageError::SourceInterrupted(err.to_string())
        } else {
            StorageError::IoError(err)
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Incrementally consumed input for [`Storage::save`].
pub type ByteStream = Pin<Box<dyn AsyncRead + Send>>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this single operation.
/// Implementations must be safe to call concurrently for distinct keys, must
/// accept hierarchical keys, and must not require the stream length upfront.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist `reader` under `key`, consuming it until EOF.
    ///
    /// The future may be dropped before completion when the caller's deadline
    /// expires; a backend must leave no completed object behind in that case
    /// unless the full stream was already written.
    async fn save(&self, key: &str, reader: ByteStream) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_eof_is_classified_as_interruption() {
        let err: StorageError = io::Error::new(io::ErrorKind::UnexpectedEof, "early eof").into();
        assert!(err.is_source_interrupted());

        let err: StorageError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(!err.is_source_interrupted());
        assert!(matches!(err, StorageError::IoError(_)));
    }

    #[test]
    fn copy_errors_keep_context() {
        let err = StorageError::from_copy(
            io::Error::new(io::ErrorKind::UnexpectedEof, "early eof"),
            "Failed to write a/b.txt",
        );
        assert!(err.is_source_interrupted());
        assert!(err.to_string().contains("a/b.txt"));

        let err = StorageError::from_copy(
            io::Error::new(io::ErrorKind::Other, "no space"),
            "Failed to write a/b.txt",
        );
        assert!(matches!(err, StorageError::UploadFailed(_)));
    }
}
