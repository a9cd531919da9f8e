//! Dropgate API Library
//!
//! This crate provides the HTTP surface: the CAPTCHA-gated multipart upload
//! handler, the embedded upload page, and application setup.

pub mod captcha;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
mod telemetry;
pub mod utils;

// Re-exports
pub use error::HttpAppError;
pub use setup::routes::build_router;
pub use state::{AppState, UploadSettings};
