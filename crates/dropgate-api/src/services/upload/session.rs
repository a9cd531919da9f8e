//! Per-request upload bookkeeping and the response it maps to

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio::time::Instant;

const CONNECTION_ISSUE_MESSAGE: &str =
    "Upload failed due to connection issues. Please check your internet connection and try again.";

/// Most recent failure seen in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The client connection dropped or stalled mid-stream.
    ConnectionLost(String),
    Other(String),
}

impl SessionError {
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, SessionError::ConnectionLost(_))
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::ConnectionLost(msg) | SessionError::Other(msg) => f.write_str(msg),
        }
    }
}

/// State of one upload request.
#[derive(Debug)]
pub struct UploadSession {
    id: String,
    deadline: Instant,
    saved: usize,
    failed: usize,
    last_error: Option<SessionError>,
    timed_out: bool,
}

impl UploadSession {
    pub fn new(id: String, deadline: Instant) -> Self {
        Self {
            id,
            deadline,
            saved: 0,
            failed: 0,
            last_error: None,
            timed_out: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn saved(&self) -> usize {
        self.saved
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn record_saved(&mut self) {
        self.saved += 1;
    }

    /// Count a file that could not be stored.
    pub fn record_failed(&mut self, error: SessionError) {
        self.failed += 1;
        self.last_error = Some(error);
    }

    /// Remember an error that ended the session without belonging to a file.
    pub fn record_error(&mut self, error: SessionError) {
        self.last_error = Some(error);
    }

    pub fn mark_timed_out(&mut self) {
        self.timed_out = true;
    }

    pub fn outcome(&self) -> UploadOutcome {
        let (saved, failed) = (self.saved, self.failed);

        if self.timed_out {
            return if saved > 0 {
                UploadOutcome::PartialTimeout { saved, failed }
            } else {
                UploadOutcome::TimedOut
            };
        }

        if saved == 0 {
            return match &self.last_error {
                None => UploadOutcome::NoFiles,
                Some(err) if err.is_connection_lost() => UploadOutcome::ConnectionLost,
                Some(err) => UploadOutcome::Failed(err.to_string()),
            };
        }

        if failed > 0 {
            UploadOutcome::Partial { saved, failed }
        } else {
            UploadOutcome::Created { saved }
        }
    }
}

/// Aggregate result of an upload session, rendered as a plain-text response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    PartialTimeout { saved: usize, failed: usize },
    TimedOut,
    NoFiles,
    ConnectionLost,
    Failed(String),
    Partial { saved: usize, failed: usize },
    Created { saved: usize },
}

impl UploadOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadOutcome::PartialTimeout { .. } | UploadOutcome::Partial { .. } => {
                StatusCode::PARTIAL_CONTENT
            }
            UploadOutcome::TimedOut => StatusCode::REQUEST_TIMEOUT,
            UploadOutcome::NoFiles | UploadOutcome::ConnectionLost | UploadOutcome::Failed(_) => {
                StatusCode::BAD_REQUEST
            }
            UploadOutcome::Created { .. } => StatusCode::CREATED,
        }
    }

    pub fn message(&self) -> String {
        match self {
            UploadOutcome::PartialTimeout { saved, failed } => format!(
                "Upload partially completed: {} file(s) uploaded, {} failed due to timeout",
                saved, failed
            ),
            UploadOutcome::TimedOut => "Upload timed out".to_string(),
            UploadOutcome::NoFiles => "No files uploaded".to_string(),
            UploadOutcome::ConnectionLost => CONNECTION_ISSUE_MESSAGE.to_string(),
            UploadOutcome::Failed(err) => format!("Upload failed: {}", err),
            UploadOutcome::Partial { saved, failed } => format!(
                "Partially successful: {} file(s) uploaded, {} failed",
                saved, failed
            ),
            UploadOutcome::Created { saved } => format!("Uploaded {} file(s)", saved),
        }
    }
}

impl IntoResponse for UploadOutcome {
    fn into_response(self) -> Response {
        (self.status(), self.message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session() -> UploadSession {
        UploadSession::new(
            "2024-01-01_00-00-00.000-abcdef01".to_string(),
            Instant::now() + Duration::from_secs(60),
        )
    }

    #[test]
    fn test_all_saved_is_created() {
        let mut s = session();
        s.record_saved();
        s.record_saved();
        assert_eq!(s.outcome(), UploadOutcome::Created { saved: 2 });
        assert_eq!(s.outcome().status(), StatusCode::CREATED);
        assert_eq!(s.outcome().message(), "Uploaded 2 file(s)");
    }

    #[test]
    fn test_mixed_results_are_partial() {
        let mut s = session();
        s.record_saved();
        s.record_failed(SessionError::Other("disk full".to_string()));
        let outcome = s.outcome();
        assert_eq!(outcome.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            outcome.message(),
            "Partially successful: 1 file(s) uploaded, 1 failed"
        );
    }

    #[test]
    fn test_nothing_received() {
        let outcome = session().outcome();
        assert_eq!(outcome, UploadOutcome::NoFiles);
        assert_eq!(outcome.status(), StatusCode::BAD_REQUEST);
        assert_eq!(outcome.message(), "No files uploaded");
    }

    #[test]
    fn test_connection_loss_gets_guidance() {
        let mut s = session();
        s.record_failed(SessionError::ConnectionLost("unexpected EOF".to_string()));
        let outcome = s.outcome();
        assert_eq!(outcome, UploadOutcome::ConnectionLost);
        assert_eq!(outcome.status(), StatusCode::BAD_REQUEST);
        assert!(outcome.message().contains("connection issues"));
    }

    #[test]
    fn test_other_failure_is_reported_verbatim() {
        let mut s = session();
        s.record_failed(SessionError::Other("permission denied".to_string()));
        let outcome = s.outcome();
        assert_eq!(outcome.status(), StatusCode::BAD_REQUEST);
        assert_eq!(outcome.message(), "Upload failed: permission denied");
    }

    #[test]
    fn test_framing_error_without_files_is_failure() {
        let mut s = session();
        s.record_error(SessionError::Other("malformed header".to_string()));
        assert_eq!(s.failed(), 0);
        assert_eq!(
            s.outcome(),
            UploadOutcome::Failed("malformed header".to_string())
        );
    }

    #[test]
    fn test_last_error_wins() {
        let mut s = session();
        s.record_failed(SessionError::Other("first".to_string()));
        s.record_failed(SessionError::ConnectionLost("second".to_string()));
        assert_eq!(s.outcome(), UploadOutcome::ConnectionLost);
    }

    #[test]
    fn test_timeout_without_files() {
        let mut s = session();
        s.record_failed(SessionError::Other("cut off".to_string()));
        s.mark_timed_out();
        let outcome = s.outcome();
        assert_eq!(outcome.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(outcome.message(), "Upload timed out");
    }

    #[test]
    fn test_timeout_after_some_files() {
        let mut s = session();
        s.record_saved();
        s.record_failed(SessionError::Other("cut off".to_string()));
        s.mark_timed_out();
        let outcome = s.outcome();
        assert_eq!(outcome.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            outcome.message(),
            "Upload partially completed: 1 file(s) uploaded, 1 failed due to timeout"
        );
    }

    #[test]
    fn test_expiry_follows_deadline() {
        let s = UploadSession::new("s".to_string(), Instant::now());
        assert!(s.is_expired());
        assert!(!session().is_expired());
    }
}
