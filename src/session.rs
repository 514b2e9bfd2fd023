// SPDX-License-Identifier: MIT
//! Reusable gzip compression session
//!
//! `flate2::write::GzEncoder` owns its writer and cannot be rewound, so a
//! session keeps the raw deflate state (`flate2::Compress`) and the running
//! CRC itself and frames the gzip member by hand. Resetting those two values
//! is all it takes to start a fresh member, which is what makes sessions
//! worth pooling.
//!
//! ```text
//! gzip member (RFC 1952):
//! - Header: 1f 8b 08 00 | mtime (4 bytes, 0) | XFL | OS (10 bytes)
//! - Body: raw deflate stream
//! - Trailer: CRC32 (4 bytes LE) | ISIZE (4 bytes LE)
//! ```

use std::io::{self, Write};

use flate2::{Compress, Compression, Crc, FlushCompress, Status};

use crate::error::{GzipJsonError, Result};

/// gzip magic bytes followed by the deflate method id
const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// "Unknown" operating system id
const GZIP_OS_UNKNOWN: u8 = 0xff;

/// Size of the gzip header without optional fields
pub const GZIP_HEADER_SIZE: usize = 10;

/// Size of the gzip trailer (CRC32 + ISIZE)
pub const GZIP_TRAILER_SIZE: usize = 8;

/// Scratch capacity for compressed output between sink writes
const SCRATCH_CAPACITY: usize = 32 * 1024;

/// A stateful gzip encoder that can be reset and reused
///
/// A session is not bound to a sink type: the sink is passed to every call,
/// and the writer that owns the session always passes the same one between
/// `reset` and `finish`.
pub struct GzipSession {
    level: Compression,
    deflate: Compress,
    crc: Crc,
    scratch: Vec<u8>,
    header_written: bool,
    finished: bool,
}

impl GzipSession {
    /// Create a session compressing at the given level
    pub fn new(level: Compression) -> Self {
        Self {
            level,
            deflate: Compress::new(level, false),
            crc: Crc::new(),
            scratch: Vec::with_capacity(SCRATCH_CAPACITY),
            header_written: false,
            finished: false,
        }
    }

    /// Compression level this session was created with
    pub fn level(&self) -> Compression {
        self.level
    }

    /// Whether the last member was finalized cleanly
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of uncompressed bytes fed into the current member
    pub fn total_in(&self) -> u64 {
        self.deflate.total_in()
    }

    /// Prepare the session for a new gzip member
    pub fn reset(&mut self) {
        self.deflate.reset();
        self.crc.reset();
        self.scratch.clear();
        self.header_written = false;
        self.finished = false;
    }

    /// Compress `data` and forward the compressed bytes to `sink`
    ///
    /// Writes the gzip header on first use. Deflate may hold input back
    /// internally, so a call can forward fewer compressed bytes than it
    /// consumed; everything pending is drained by [`finish`](Self::finish).
    pub fn write<W: Write>(&mut self, sink: &mut W, data: &[u8]) -> io::Result<usize> {
        self.write_header(sink)?;

        let mut input = data;
        while !input.is_empty() {
            self.scratch.clear();
            let before = self.deflate.total_in();
            self.deflate
                .compress_vec(input, &mut self.scratch, FlushCompress::None)
                .map_err(io::Error::other)?;
            let consumed = (self.deflate.total_in() - before) as usize;

            if consumed == 0 && self.scratch.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "deflate made no progress",
                ));
            }

            self.crc.update(&input[..consumed]);
            input = &input[consumed..];
            sink.write_all(&self.scratch)?;
        }

        Ok(data.len())
    }

    /// Terminate the gzip member: drain deflate, write the trailer, flush
    pub fn finish<W: Write>(&mut self, sink: &mut W) -> Result<()> {
        self.write_header(sink)
            .map_err(|e| GzipJsonError::finalize("header", e))?;

        loop {
            self.scratch.clear();
            let status = self
                .deflate
                .compress_vec(&[], &mut self.scratch, FlushCompress::Finish)
                .map_err(|e| GzipJsonError::finalize("deflate", io::Error::other(e)))?;
            sink.write_all(&self.scratch)
                .map_err(|e| GzipJsonError::finalize("deflate", e))?;
            if status == Status::StreamEnd {
                break;
            }
        }

        let mut trailer = [0u8; GZIP_TRAILER_SIZE];
        trailer[..4].copy_from_slice(&self.crc.sum().to_le_bytes());
        trailer[4..].copy_from_slice(&self.crc.amount().to_le_bytes());
        sink.write_all(&trailer)
            .map_err(|e| GzipJsonError::finalize("trailer", e))?;

        sink.flush()
            .map_err(|e| GzipJsonError::finalize("flush", e))?;

        self.finished = true;
        Ok(())
    }

    fn write_header<W: Write>(&mut self, sink: &mut W) -> io::Result<()> {
        if self.header_written {
            return Ok(());
        }

        let mut header = [0u8; GZIP_HEADER_SIZE];
        header[..3].copy_from_slice(&GZIP_MAGIC);
        // FLG and MTIME stay zero
        header[8] = extra_flags(self.level);
        header[9] = GZIP_OS_UNKNOWN;
        sink.write_all(&header)?;

        self.header_written = true;
        Ok(())
    }
}

impl std::fmt::Debug for GzipSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzipSession")
            .field("level", &self.level.level())
            .field("total_in", &self.deflate.total_in())
            .field("total_out", &self.deflate.total_out())
            .field("header_written", &self.header_written)
            .field("finished", &self.finished)
            .finish()
    }
}

/// XFL byte: 2 for maximum compression, 4 for fastest
fn extra_flags(level: Compression) -> u8 {
    match level.level() {
        9 => 2,
        0 | 1 => 4,
        _ => 0,
    }
}
