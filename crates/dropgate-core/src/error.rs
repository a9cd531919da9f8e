//! Error types module
//!
//! `AppError` covers the request-level rejections that end an upload request
//! before any file is persisted: wrong method, malformed request shape, a failed
//! CAPTCHA gate, or a deadline that expired before work could start. Per-file
//! outcomes inside an accepted session are not errors at this level; they are
//! folded into the session counters by the API crate.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like malformed requests
    Debug,
    /// Warning level - for rejections an operator may want to notice
    Warn,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "CAPTCHA_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether re-issuing the same request later can succeed
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("CAPTCHA verification failed: {0}")]
    CaptchaFailed(String),

    #[error("Request timed out: {0}")]
    RequestTimeout(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Static metadata for each variant: (http_status, error_code, recoverable, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::MethodNotAllowed(_) => (405, "METHOD_NOT_ALLOWED", false, LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::CaptchaFailed(_) => (403, "CAPTCHA_FAILED", false, LogLevel::Warn),
        AppError::RequestTimeout(_) => (408, "REQUEST_TIMEOUT", true, LogLevel::Warn),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
    }
}

impl AppError {
    /// Variant name, used as a structured log field
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::MethodNotAllowed(_) => "MethodNotAllowed",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::CaptchaFailed(_) => "CaptchaFailed",
            AppError::RequestTimeout(_) => "RequestTimeout",
            AppError::NotFound(_) => "NotFound",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MethodNotAllowed(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            // The verifier's reason stays in the logs.
            AppError::CaptchaFailed(_) => "CAPTCHA verification failed".to_string(),
            AppError::RequestTimeout(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_method_not_allowed() {
        let err = AppError::MethodNotAllowed("Only POST allowed".to_string());
        assert_eq!(err.http_status_code(), 405);
        assert_eq!(err.error_code(), "METHOD_NOT_ALLOWED");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Only POST allowed");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_captcha_hides_reason() {
        let err = AppError::CaptchaFailed("invalid-input-response".to_string());
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.client_message(), "CAPTCHA verification failed");
        assert!(err.to_string().contains("invalid-input-response"));
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_timeout_is_recoverable() {
        let err = AppError::RequestTimeout("Upload timed out".to_string());
        assert_eq!(err.http_status_code(), 408);
        assert!(err.is_recoverable());
        assert_eq!(err.error_type(), "RequestTimeout");
    }
}
