// SPDX-License-Identifier: MIT
//! JSON encode entry points
//!
//! Serialize a value straight into a [`GzipWriter`] and report whether the
//! sink received gzip. Setting `Content-Encoding: gzip` (or not) from that
//! flag is left to the caller.

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use crate::config::EncoderConfig;
use crate::error::{GzipJsonError, Result};
use crate::pool::CompressorPool;
use crate::writer::GzipWriter;

/// Encode `value` as JSON into `sink`, compressing payloads of 1400 bytes or more
///
/// Returns `true` when the sink received a gzip stream.
pub fn encode<W, T>(pool: &CompressorPool, sink: W, value: &T) -> Result<bool>
where
    W: Write,
    T: Serialize + ?Sized,
{
    encode_with_config(pool, sink, value, &EncoderConfig::default())
}

/// Encode `value` as JSON into `sink` using an explicit configuration
pub fn encode_with_config<W, T>(
    pool: &CompressorPool,
    sink: W,
    value: &T,
    config: &EncoderConfig,
) -> Result<bool>
where
    W: Write,
    T: Serialize + ?Sized,
{
    let mut writer = GzipWriter::with_config(sink, pool, config);
    serde_json::to_writer(&mut writer, value).map_err(GzipJsonError::from_serializer)?;
    writer.close()?;
    Ok(writer.is_compressed())
}

/// Pool and configuration bundled for repeated encodes
///
/// Cheap to clone; clones share the same session pool.
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    pool: Arc<CompressorPool>,
    config: EncoderConfig,
}

impl JsonEncoder {
    /// Encoder with a fresh default pool and default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given configuration for every encode
    pub fn with_config(mut self, config: EncoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing pool
    pub fn with_pool(mut self, pool: Arc<CompressorPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Pool this encoder draws sessions from
    pub fn pool(&self) -> &Arc<CompressorPool> {
        &self.pool
    }

    /// Configuration applied to every encode
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode `value` into `sink`, returning whether it was compressed
    pub fn encode<W, T>(&self, sink: W, value: &T) -> Result<bool>
    where
        W: Write,
        T: Serialize + ?Sized,
    {
        encode_with_config(&self.pool, sink, value, &self.config)
    }
}
