//! Shared key validation and composition for storage backends.
//!
//! Key format: relative `/`-separated segments, e.g. `{session_id}/{filename}`.

use crate::traits::{StorageError, StorageResult};

/// Check that `key` cannot address anything outside the backend's root.
///
/// Segments such as `......etcpasswd` are ordinary names; only empty keys,
/// absolute keys, backslashes, and `.`/`..` segments are rejected.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }

    if key.starts_with('/') || key.contains('\\') || key.contains(':') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key must be a relative path: {}",
            key
        )));
    }

    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains an empty or relative segment: {}",
            key
        )));
    }

    Ok(())
}

/// Prepend a configured prefix to a key, dropping any leading `/`.
#[cfg_attr(not(feature = "storage-s3"), allow(dead_code))]
pub fn prefixed_key(prefix: &str, key: &str) -> String {
    let joined = format!("{}/{}", prefix.trim_end_matches('/'), key);
    joined.trim_start_matches('/').to_string()
}
