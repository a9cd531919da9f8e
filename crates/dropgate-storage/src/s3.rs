use crate::keys::{prefixed_key, validate_key};
use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::ObjectStore;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Size of each multipart chunk sent to the bucket.
const PART_SIZE: usize = 8 * 1024 * 1024;
/// Parts uploaded in parallel for a single object.
const UPLOAD_CONCURRENCY: usize = 3;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `prefix` - Key prefix under which every upload session is written
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(
        bucket: String,
        prefix: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Credentials come from the standard AWS environment variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::with_store(Arc::new(store), bucket, prefix))
    }

    /// Wrap an already-built object store; used for S3-compatible stores and tests.
    pub fn with_store(store: Arc<dyn ObjectStore>, bucket: String, prefix: String) -> Self {
        S3Storage {
            store,
            bucket,
            prefix,
        }
    }

    fn object_path(&self, key: &str) -> StorageResult<Path> {
        validate_key(key)?;
        let full_key = prefixed_key(&self.prefix, key);
        Path::parse(&full_key).map_err(|e| StorageError::InvalidKey(e.to_string()))
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn save(&self, key: &str, mut reader: ByteStream) -> StorageResult<()> {
        let path = self.object_path(key)?;
        let start = std::time::Instant::now();

        let mut writer = BufWriter::with_capacity(self.store.clone(), path.clone(), PART_SIZE)
            .with_max_concurrency(UPLOAD_CONCURRENCY);

        let copied = match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(copied) => copied,
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(
                        error = %abort_err,
                        key = %path,
                        "Failed to abort multipart upload"
                    );
                }
                let err = StorageError::from_copy(e, &format!("Failed to stream {}", path));
                tracing::error!(
                    error = %err,
                    bucket = %self.bucket,
                    key = %path,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 save failed"
                );
                return Err(err);
            }
        };

        if let Err(e) = writer.shutdown().await {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %path,
                "S3 upload completion failed"
            );
            return Err(StorageError::BackendError(format!(
                "Failed to complete upload of {}: {}",
                path, e
            )));
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %path,
            size_bytes = copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 save successful"
        );

        Ok(())
    }
}
