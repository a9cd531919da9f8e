//! Dropgate Core Library
//!
//! This crate provides the configuration, error types, and backend selector
//! shared by the storage and API crates.

pub mod config;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
