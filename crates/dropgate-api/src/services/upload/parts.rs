//! Streaming multipart reader
//!
//! Wraps `multer` so the upload loop sees typed errors: `Interrupted` when the
//! body ended or failed mid-message, `Malformed` for framing the parser cannot
//! make sense of. Field bodies are exposed as [`ByteStream`]s whose truncation
//! surfaces as `io::ErrorKind::UnexpectedEof`.
//!
//! A failing request body is treated as one that ended early. multer drops
//! whatever it has buffered when the body yields an error, so the error is
//! logged and swallowed here. Complete parts already received still parse, and
//! the part that was cut off reports an incomplete stream.

use bytes::Bytes;
use dropgate_storage::ByteStream;
use futures::{future, stream, Stream, StreamExt, TryStreamExt};
use std::error::Error as StdError;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::Poll;
use thiserror::Error;
use tokio_util::io::StreamReader;

type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Error)]
pub enum PartError {
    /// The request body was cut short or failed while a part was being read.
    #[error("connection interrupted: {0}")]
    Interrupted(multer::Error),

    #[error("malformed multipart body: {0}")]
    Malformed(multer::Error),
}

impl From<multer::Error> for PartError {
    fn from(err: multer::Error) -> Self {
        if is_interruption(&err) {
            PartError::Interrupted(err)
        } else {
            PartError::Malformed(err)
        }
    }
}

fn is_interruption(err: &multer::Error) -> bool {
    matches!(
        err,
        multer::Error::IncompleteStream
            | multer::Error::IncompleteFieldData { .. }
            | multer::Error::IncompleteHeaders
            | multer::Error::StreamReadFailed(_)
    )
}

fn field_read_error(err: multer::Error) -> io::Error {
    let kind = if is_interruption(&err) {
        io::ErrorKind::UnexpectedEof
    } else {
        io::ErrorKind::InvalidData
    };
    io::Error::new(kind, err)
}

/// One part of the multipart body.
pub struct Part {
    field: multer::Field<'static>,
}

impl Part {
    /// Client-declared filename, if the part carries one.
    pub fn file_name(&self) -> Option<&str> {
        self.field.file_name()
    }

    /// Hand the part's remaining bytes to a consumer as an async reader.
    pub fn into_byte_stream(self) -> ByteStream {
        Box::pin(StreamReader::new(self.field.map_err(field_read_error)))
    }
}

/// Yields parts one at a time from a request body.
pub struct PartReader {
    multipart: multer::Multipart<'static>,
    body_finished: Arc<AtomicBool>,
}

impl PartReader {
    pub fn new<S, E>(body: S, boundary: impl Into<String>) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<Box<dyn StdError + Send + Sync>> + 'static,
    {
        let body_finished = Arc::new(AtomicBool::new(false));

        let on_end = body_finished.clone();
        let body = body
            .map(|chunk| chunk.map_err(Into::<BoxError>::into))
            .take_while(|chunk| {
                if let Err(err) = chunk {
                    tracing::warn!(error = %err, "Request body read failed");
                }
                future::ready(chunk.is_ok())
            })
            .chain(stream::poll_fn(move |_| -> Poll<Option<Result<Bytes, BoxError>>> {
                on_end.store(true, Ordering::Release);
                Poll::Ready(None)
            }));

        PartReader {
            multipart: multer::Multipart::new(body, boundary),
            body_finished,
        }
    }

    /// Next part, or `None` once the closing boundary has been read.
    ///
    /// A part that was not fully consumed is skipped over first.
    pub async fn next_part(&mut self) -> Result<Option<Part>, PartError> {
        let field = self.multipart.next_field().await?;
        Ok(field.map(|field| Part { field }))
    }

    /// Whether the underlying body has ended or failed, so no further bytes
    /// can arrive.
    pub fn body_finished(&self) -> bool {
        self.body_finished.load(Ordering::Acquire)
    }
}
