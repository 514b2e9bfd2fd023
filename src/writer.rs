// SPDX-License-Identifier: MIT
//! Size-gated gzip writer
//!
//! [`GzipWriter`] sits between a serializer and a sink. It buffers the first
//! bytes it receives and makes a single decision once enough data has arrived:
//!
//! ```text
//! Buffering ──(buffer >= threshold)──> Compressing
//!     │                                     │
//!     └──────────── close() ───────> Closed <┘
//! ```
//!
//! - Below the threshold at close, the buffer goes to the sink untouched.
//! - At or above the threshold, a pooled [`GzipSession`] takes the whole
//!   buffer in one call and every later write streams through it.

use std::fmt;
use std::io::{self, Write};

use tracing::debug;

use crate::config::{Callback, EncoderConfig};
use crate::error::{GzipJsonError, Result};
use crate::pool::CompressorPool;
use crate::session::GzipSession;

/// Upper bound for the initial buffer allocation
const MAX_PREALLOC: usize = 16 * 1024;

enum State {
    Buffering { buffer: Vec<u8> },
    Compressing { session: GzipSession },
    Closed,
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Buffering { .. } => "buffering",
            State::Compressing { .. } => "compressing",
            State::Closed => "closed",
        }
    }
}

/// Writer that gzips its output only when the payload reaches a threshold
///
/// A writer handles exactly one payload and is driven from one thread.
/// Any error from [`write_chunk`](Self::write_chunk) or [`close`](Self::close)
/// closes the writer for good.
pub struct GzipWriter<'p, W: Write> {
    sink: W,
    pool: &'p CompressorPool,
    state: State,
    threshold: usize,
    compressed: bool,
    on_compressed: Option<Callback>,
    on_uncompressed: Option<Callback>,
}

impl<'p, W: Write> GzipWriter<'p, W> {
    /// Create a writer with the default 1400 byte threshold
    pub fn new(sink: W, pool: &'p CompressorPool) -> Self {
        Self::with_config(sink, pool, &EncoderConfig::default())
    }

    /// Create a writer with explicit configuration
    pub fn with_config(sink: W, pool: &'p CompressorPool, config: &EncoderConfig) -> Self {
        let threshold = config.effective_threshold();
        Self {
            sink,
            pool,
            state: State::Buffering {
                buffer: Vec::with_capacity(threshold.min(MAX_PREALLOC)),
            },
            threshold,
            compressed: false,
            on_compressed: config.on_compressed.clone(),
            on_uncompressed: config.on_uncompressed.clone(),
        }
    }

    /// Threshold in bytes at which this writer switches to gzip
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Whether the payload is being (or was) compressed
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Whether the writer reached its terminal state
    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// Reference to the underlying sink
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Accept bytes from the serializer
    ///
    /// While buffering, bytes are held back and reported as accepted. The
    /// write that brings the buffer to the threshold hands the whole buffer
    /// to a compression session; from then on bytes are compressed straight
    /// into the sink.
    pub fn write_chunk(&mut self, buf: &[u8]) -> Result<usize> {
        let result = self.advance(buf);
        if result.is_err() {
            self.state = State::Closed;
        }
        result
    }

    fn advance(&mut self, buf: &[u8]) -> Result<usize> {
        match &mut self.state {
            State::Closed => Err(GzipJsonError::Closed),
            State::Compressing { session } => Ok(session.write(&mut self.sink, buf)?),
            State::Buffering { buffer } => {
                buffer.extend_from_slice(buf);
                if buffer.len() < self.threshold {
                    return Ok(buf.len());
                }

                let buffered = std::mem::take(buffer);
                debug!(
                    threshold = self.threshold,
                    buffered = buffered.len(),
                    "Threshold reached, switching to gzip"
                );

                let mut session = self.pool.acquire();
                session.reset();
                self.compressed = true;
                session.write(&mut self.sink, &buffered)?;
                self.state = State::Compressing { session };

                Ok(buf.len())
            }
        }
    }

    /// Finish the payload
    ///
    /// Writes the buffered bytes uncompressed if the threshold was never
    /// reached, otherwise terminates the gzip stream and returns the session
    /// to the pool. Exactly one of the configured callbacks runs, matching
    /// the branch taken. Calling `close` twice is an error.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Closed => Err(GzipJsonError::Closed),
            State::Buffering { buffer } => {
                self.write_uncompressed(&buffer)?;
                debug!(size = buffer.len(), "Payload below threshold, written uncompressed");
                if let Some(callback) = &self.on_uncompressed {
                    callback();
                }
                Ok(())
            }
            State::Compressing { mut session } => {
                session.finish(&mut self.sink)?;
                debug!(size = session.total_in(), "Payload written as gzip");
                self.pool.release(session);
                if let Some(callback) = &self.on_compressed {
                    callback();
                }
                Ok(())
            }
        }
    }

    /// Return the sink, closing the writer first if it is still open
    ///
    /// A writer that is already closed hands the sink back as is, including
    /// after a failed close.
    pub fn into_inner(mut self) -> Result<W> {
        if !self.is_closed() {
            self.close()?;
        }
        Ok(self.sink)
    }

    fn write_uncompressed(&mut self, buffer: &[u8]) -> Result<()> {
        if !buffer.is_empty() {
            let written = self.sink.write(buffer)?;
            if written < buffer.len() {
                return Err(GzipJsonError::ShortWrite {
                    written,
                    expected: buffer.len(),
                });
            }
        }
        self.sink.flush()?;
        Ok(())
    }
}

impl<W: Write> Write for GzipWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf).map_err(io::Error::from)
    }

    /// Flushes the sink once compressing; a no-op while the decision is pending
    fn flush(&mut self) -> io::Result<()> {
        match self.state {
            State::Compressing { .. } => self.sink.flush(),
            State::Buffering { .. } => Ok(()),
            State::Closed => Err(GzipJsonError::Closed.into()),
        }
    }
}

impl<W: Write> fmt::Debug for GzipWriter<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GzipWriter")
            .field("state", &self.state.name())
            .field("threshold", &self.threshold)
            .field("compressed", &self.compressed)
            .finish()
    }
}
