//! Upload session handling
//!
//! `parts` turns the request body into a sequence of parts, `session` keeps the
//! per-request counters, and `service` drives the loop between them.

pub mod parts;
pub mod service;
pub mod session;

pub use parts::{PartError, PartReader};
pub use service::UploadService;
pub use session::{SessionError, UploadOutcome, UploadSession};
