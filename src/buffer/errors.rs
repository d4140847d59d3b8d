//! Chunked buffer error types
//!
//! Error codes:
//! - AERO_BUFFER_OFFSET_OUT_OF_RANGE (ERROR severity)
//! - AERO_BUFFER_SINK_FAILED (ERROR severity)
//!
//! End-of-stream is not an error; see [`super::ReadStatus`].

use std::io;

use thiserror::Error;

use crate::errors::Severity;

/// Errors from random-access reads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Read started past the end of the logical content
    #[error("offset {offset} is past the end of a {len}-byte buffer")]
    OffsetOutOfRange { offset: usize, len: usize },
}

impl BufferError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            BufferError::OffsetOutOfRange { .. } => "AERO_BUFFER_OFFSET_OUT_OF_RANGE",
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

/// A byte sink failed while a buffer was being streamed into it.
///
/// `written` counts the bytes the sink accepted before the failure; a
/// reader that produced this error is positioned right after them.
#[derive(Debug, Error)]
#[error("sink failed after {written} bytes: {source}")]
pub struct SinkError {
    written: u64,
    #[source]
    source: io::Error,
}

impl SinkError {
    pub(crate) fn new(written: u64, source: io::Error) -> Self {
        Self { written, source }
    }

    /// Bytes accepted by the sink before it failed
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Kind of the underlying I/O failure
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        "AERO_BUFFER_SINK_FAILED"
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Discard the partial count and keep the I/O error
    pub fn into_io(self) -> io::Error {
        self.source
    }
}

impl From<SinkError> for io::Error {
    fn from(err: SinkError) -> Self {
        err.into_io()
    }
}

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_error_display() {
        let err = BufferError::OffsetOutOfRange { offset: 10, len: 4 };
        let display = err.to_string();
        assert!(display.contains("10"));
        assert!(display.contains("4-byte"));
        assert_eq!(err.code(), "AERO_BUFFER_OFFSET_OUT_OF_RANGE");
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn test_sink_error_keeps_partial_count() {
        let err = SinkError::new(12, io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert_eq!(err.written(), 12);
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(std::error::Error::source(&err).is_some());

        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);
    }
}
