//! Dropgate Storage Library
//!
//! This crate provides the storage abstraction the upload handler writes through,
//! with implementations for the local filesystem and S3-compatible object stores.
//!
//! # Storage key format
//!
//! Keys are relative, `/`-separated paths. The upload handler always produces
//! `{session_id}/{filename}`; backends create whatever intermediate grouping the
//! key implies (directories locally, a key prefix in a bucket).
//!
//! Keys must not be absolute and must not contain `.` or `..` components.
//! Validation is centralized in the `keys` module so all backends agree.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use dropgate_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
