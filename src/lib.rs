// SPDX-License-Identifier: MIT
//! # gzip-json
//!
//! Streaming output adapter that gzips a serialized payload only when it is
//! large enough to benefit.
//!
//! Small JSON responses gain nothing from gzip: the CPU cost and the ~18 bytes
//! of gzip framing outweigh the savings. [`GzipWriter`] buffers the first bytes
//! of a payload and decides once, at a configurable threshold (1400 bytes by
//! default), whether the sink gets the raw bytes or a gzip stream.
//!
//! ## Components
//!
//! - **[`GzipWriter`]**: the buffering/decision state machine, an `io::Write`
//!   adapter in front of any sink
//! - **[`CompressorPool`]**: thread-safe free list of reusable
//!   [`GzipSession`]s, constructed by the caller and shared by reference
//! - **[`EncoderConfig`]**: threshold and optional `on_compressed` /
//!   `on_uncompressed` hooks
//! - **[`encode`] / [`encode_with_config`] / [`JsonEncoder`]**: serialize a
//!   `serde` value straight through the writer
//!
//! ## Output Format
//!
//! ```text
//! payload < threshold   sink receives the serialized bytes unchanged
//! payload >= threshold  sink receives one RFC 1952 gzip member of those bytes
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use gzip_json::{encode, CompressorPool};
//!
//! let pool = CompressorPool::default();
//! let mut body = Vec::new();
//!
//! let compressed = encode(&pool, &mut body, &serde_json::json!({"age": 44})).unwrap();
//! assert!(!compressed);
//! assert_eq!(body, br#"{"age":44}"#);
//! ```
//!
//! Whether to send `Content-Encoding: gzip` follows from the returned flag and
//! stays with the caller.

pub mod config;
pub mod encode;
pub mod error;
pub mod pool;
pub mod session;
pub mod writer;

// Re-export main types
pub use config::{Callback, EncoderConfig, PoolConfig, DEFAULT_MIN_SIZE};
pub use encode::{encode, encode_with_config, JsonEncoder};
pub use error::{GzipJsonError, Result};
pub use flate2::Compression;
pub use pool::{CompressorPool, PoolStats, DEFAULT_MAX_IDLE};
pub use session::GzipSession;
pub use writer::GzipWriter;
