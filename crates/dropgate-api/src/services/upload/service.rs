use super::parts::{PartError, PartReader};
use super::session::{SessionError, UploadOutcome, UploadSession};
use crate::utils::filename::{is_usable_filename, sanitize_filename};
use dropgate_storage::{Storage, StorageError};
use std::sync::Arc;
use tokio::time::timeout_at;

/// Streams the file parts of one request into storage.
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn Storage>,
}

impl UploadService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Consume `parts` until the body ends, an unrecoverable framing error
    /// occurs, or the session deadline passes.
    ///
    /// Every suspension point is bounded by the deadline. A save cut off by
    /// the deadline counts as failed.
    pub async fn receive(&self, session: &mut UploadSession, parts: &mut PartReader) {
        tracing::info!(session_id = %session.id(), "Starting upload session");

        loop {
            if session.is_expired() {
                session.mark_timed_out();
                break;
            }

            let part = match timeout_at(session.deadline(), parts.next_part()).await {
                Err(_) => {
                    session.mark_timed_out();
                    break;
                }
                Ok(Ok(Some(part))) => part,
                Ok(Ok(None)) => {
                    tracing::debug!(session_id = %session.id(), "Upload session completed normally");
                    break;
                }
                Ok(Err(err @ PartError::Interrupted(_))) => {
                    tracing::warn!(
                        session_id = %session.id(),
                        error = %err,
                        "Connection interrupted during upload"
                    );
                    session.record_failed(SessionError::ConnectionLost(err.to_string()));
                    if parts.body_finished() {
                        break;
                    }
                    continue;
                }
                Ok(Err(err @ PartError::Malformed(_))) => {
                    tracing::warn!(
                        session_id = %session.id(),
                        error = %err,
                        "Error reading multipart data"
                    );
                    session.record_error(SessionError::Other(err.to_string()));
                    break;
                }
            };

            let declared = match part.file_name() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => continue,
            };

            let filename = sanitize_filename(&declared);
            if !is_usable_filename(&filename) {
                tracing::warn!(
                    session_id = %session.id(),
                    filename = %declared,
                    "Rejecting file with unusable name"
                );
                session.record_failed(SessionError::Other(format!(
                    "invalid filename {:?}",
                    declared
                )));
                continue;
            }

            let key = format!("{}/{}", session.id(), filename);
            tracing::debug!(session_id = %session.id(), key = %key, "Saving file");

            let saved = timeout_at(
                session.deadline(),
                self.storage.save(&key, part.into_byte_stream()),
            )
            .await;

            match saved {
                Ok(Ok(())) => {
                    session.record_saved();
                    tracing::info!(session_id = %session.id(), key = %key, "Saved file");
                }
                Ok(Err(err)) => {
                    tracing::warn!(
                        session_id = %session.id(),
                        key = %key,
                        error = %err,
                        "Error saving file"
                    );
                    let interrupted = err.is_source_interrupted();
                    session.record_failed(session_error(err));
                    if interrupted && parts.body_finished() {
                        break;
                    }
                }
                Err(_) => {
                    tracing::warn!(
                        session_id = %session.id(),
                        key = %key,
                        "Save cut off by session deadline"
                    );
                    session.record_failed(SessionError::Other(format!(
                        "saving {} exceeded the upload deadline",
                        filename
                    )));
                    session.mark_timed_out();
                    break;
                }
            }
        }

        tracing::info!(
            session_id = %session.id(),
            saved = session.saved(),
            failed = session.failed(),
            timed_out = session.timed_out(),
            last_error = ?session.last_error(),
            "Upload session summary"
        );
    }

    /// Run a full session and classify it.
    pub async fn run(&self, mut session: UploadSession, mut parts: PartReader) -> UploadOutcome {
        self.receive(&mut session, &mut parts).await;
        session.outcome()
    }
}

fn session_error(err: StorageError) -> SessionError {
    if err.is_source_interrupted() {
        SessionError::ConnectionLost(err.to_string())
    } else {
        SessionError::Other(err.to_string())
    }
}
