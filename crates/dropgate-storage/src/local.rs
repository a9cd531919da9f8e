use crate::keys::validate_key;
use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

/// In-progress file beside its final path. Removed on drop unless committed,
/// so a save dropped at its deadline leaves nothing under the final name.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn beside(target: &Path) -> Self {
        let mut name = OsString::from(".");
        name.push(target.file_name().unwrap_or_default());
        name.push(".partial");
        PartialFile {
            path: target.with_file_name(name),
            committed: false,
        }
    }

    async fn commit(mut self, target: &Path) -> std::io::Result<()> {
        fs::rename(&self.path, target).await?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(
                    error = %e,
                    path = %self.path.display(),
                    "Failed to remove partially written file"
                );
            }
        }
    }
}

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for uploaded files (e.g., "./uploads"); created if missing
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);
        if !path.starts_with(&self.base_path) {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn save(&self, key: &str, mut reader: ByteStream) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        let partial = PartialFile::beside(&path);
        let mut file = fs::File::create(&partial.path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let copied = match tokio::io::copy(&mut reader, &mut file).await {
            Ok(copied) => copied,
            Err(e) => {
                let err = StorageError::from_copy(
                    e,
                    &format!("Failed to write stream to file {}", path.display()),
                );
                tracing::warn!(
                    error = %err,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage save failed"
                );
                return Err(err);
            }
        };

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;
        drop(file);

        partial.commit(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to finalize file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage save successful"
        );

        Ok(())
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::{stream, StreamExt};
    use std::io;
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio_util::io::StreamReader;

    fn reader_of(data: &[u8]) -> ByteStream {
        Box::pin(std::io::Cursor::new(data.to_vec()))
    }

    #[tokio::test]
    async fn test_local_storage_save_creates_session_directory() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("uploads")).await.unwrap();

        storage
            .save("2024-05-01_10-00-00.000-deadbeef/test.txt", reader_of(b"test data"))
            .await
            .unwrap();

        let written = std::fs::read(
            dir.path()
                .join("uploads")
                .join("2024-05-01_10-00-00.000-deadbeef")
                .join("test.txt"),
        )
        .unwrap();
        assert_eq!(written, b"test data");
    }

    #[tokio::test]
    async fn test_dotted_names_stay_inside_root() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        storage
            .save("session/......etcpasswd", reader_of(b"x"))
            .await
            .unwrap();

        assert!(dir.path().join("session").join("......etcpasswd").exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage.save("../../../etc/passwd", reader_of(b"x")).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.save("/etc/passwd", reader_of(b"x")).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.save("session/..", reader_of(b"x")).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_truncated_stream_is_interruption_and_leaves_no_file() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let chunks: Vec<Result<Bytes, io::Error>> = vec![
            Ok(Bytes::from_static(b"first half")),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection dropped")),
        ];
        let reader: ByteStream = Box::pin(StreamReader::new(stream::iter(chunks)));

        let err = storage.save("session/partial.bin", reader).await.unwrap_err();
        assert!(err.is_source_interrupted());
        let session_dir = dir.path().join("session");
        assert!(!session_dir.join("partial.bin").exists());
        assert_eq!(std::fs::read_dir(&session_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_save_dropped_at_deadline_leaves_no_file() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let chunks = stream::iter(vec![Ok::<_, io::Error>(Bytes::from_static(b"half of the file"))])
            .chain(stream::pending());
        let reader: ByteStream = Box::pin(StreamReader::new(chunks));

        let result =
            tokio::time::timeout(Duration::from_millis(200), storage.save("s/x.bin", reader)).await;
        assert!(result.is_err());

        let session_dir = dir.path().join("s");
        assert!(!session_dir.join("x.bin").exists());
        assert_eq!(std::fs::read_dir(&session_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_large_stream_is_copied_intact() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let data: Vec<u8> = (0..256 * 1024).map(|i| (i % 251) as u8).collect();
        let chunks: Vec<Result<Bytes, io::Error>> = data
            .chunks(7919)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        let reader: ByteStream = Box::pin(StreamReader::new(stream::iter(chunks)));

        storage.save("session/big.bin", reader).await.unwrap();

        let written = std::fs::read(dir.path().join("session").join("big.bin")).unwrap();
        assert_eq!(written, data);
    }
}
