// SPDX-License-Identifier: MIT
//! Error types shared by the writer, the session pool and the encode facade

use std::io;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GzipJsonError>;

/// Errors that can occur while encoding and writing a payload
///
/// Every error is terminal for the [`GzipWriter`](crate::GzipWriter) that
/// produced it: the writer moves to its closed state and must not be reused.
#[derive(Debug, thiserror::Error)]
pub enum GzipJsonError {
    /// The serializer failed to produce bytes
    #[error("Encoding error: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The uncompressed flush was accepted only partially by the sink
    #[error("Short write: sink accepted {written} of {expected} buffered bytes")]
    ShortWrite { written: usize, expected: usize },

    /// The gzip stream could not be finalized
    #[error("Unable to close gzip stream during {stage}: {source}")]
    Finalize {
        stage: &'static str,
        #[source]
        source: io::Error,
    },

    /// The sink rejected a forwarded write
    #[error("I/O error: {0}")]
    Sink(#[from] io::Error),

    /// The writer was already closed
    #[error("Writer already closed")]
    Closed,

    /// Invalid pool or encoder configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GzipJsonError {
    /// Build a finalize error for the given stage
    pub(crate) fn finalize(stage: &'static str, source: io::Error) -> Self {
        Self::Finalize { stage, source }
    }

    /// Split a serializer error into its encoding or sink cause
    ///
    /// `serde_json` reports failures of the underlying writer as I/O errors.
    /// Those originate from the sink, so they are unwrapped back into the
    /// original `io::Error`.
    pub(crate) fn from_serializer(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Sink(io::Error::from(err))
        } else {
            Self::Encoding(err)
        }
    }
}

impl From<GzipJsonError> for io::Error {
    fn from(err: GzipJsonError) -> Self {
        match err {
            GzipJsonError::Sink(e) => e,
            GzipJsonError::ShortWrite { .. } => io::Error::new(io::ErrorKind::WriteZero, err),
            GzipJsonError::Closed => io::Error::new(io::ErrorKind::BrokenPipe, err),
            other => io::Error::other(other),
        }
    }
}
