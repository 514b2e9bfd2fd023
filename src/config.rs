// SPDX-License-Identifier: MIT
//! Encoder and pool configuration

use std::fmt;
use std::sync::Arc;

use crate::error::{GzipJsonError, Result};
use crate::pool::DEFAULT_MAX_IDLE;

/// Payloads of at least this many bytes are compressed unless configured otherwise.
///
/// Around one Ethernet MTU: below it the CPU and framing cost of gzip
/// outweighs the bandwidth saved for typical JSON payloads.
pub const DEFAULT_MIN_SIZE: usize = 1400;

/// Zero-argument hook invoked when a writer closes
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Per-encode configuration: threshold and observability hooks
#[derive(Clone)]
pub struct EncoderConfig {
    /// Byte count at which compression kicks in; negative means default
    pub threshold: i64,
    /// Invoked once when the payload was compressed
    pub on_compressed: Option<Callback>,
    /// Invoked once when the payload was written uncompressed
    pub on_uncompressed: Option<Callback>,
}

impl EncoderConfig {
    /// Default configuration (1400 byte threshold, no callbacks)
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_MIN_SIZE as i64,
            on_compressed: None,
            on_uncompressed: None,
        }
    }

    /// Read the threshold from `GZIP_JSON_MIN_SIZE`
    pub fn from_env() -> Self {
        Self {
            threshold: std::env::var("GZIP_JSON_MIN_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MIN_SIZE as i64),
            ..Self::new()
        }
    }

    /// Set the threshold (negative values select the default)
    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Register the compressed-path hook
    pub fn on_compressed<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_compressed = Some(Arc::new(f));
        self
    }

    /// Register the uncompressed-path hook
    pub fn on_uncompressed<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_uncompressed = Some(Arc::new(f));
        self
    }

    /// Threshold in bytes after resolving negative values to the default
    pub fn effective_threshold(&self) -> usize {
        usize::try_from(self.threshold).unwrap_or(DEFAULT_MIN_SIZE)
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EncoderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderConfig")
            .field("threshold", &self.threshold)
            .field("on_compressed", &self.on_compressed.is_some())
            .field("on_uncompressed", &self.on_uncompressed.is_some())
            .finish()
    }
}

/// Configuration for a [`CompressorPool`](crate::CompressorPool)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// gzip level, 0 (store) to 9 (best)
    pub level: u32,
    /// Idle sessions kept for reuse
    pub max_idle: usize,
}

impl PoolConfig {
    /// Read `GZIP_JSON_LEVEL` and `GZIP_JSON_POOL_MAX_IDLE`, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: std::env::var("GZIP_JSON_LEVEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.level),
            max_idle: std::env::var("GZIP_JSON_POOL_MAX_IDLE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_idle),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.level > 9 {
            return Err(GzipJsonError::InvalidConfig(format!(
                "GZIP_JSON_LEVEL must be between 0 and 9, got {}",
                self.level
            )));
        }

        if self.max_idle == 0 {
            return Err(GzipJsonError::InvalidConfig(
                "GZIP_JSON_POOL_MAX_IDLE must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            level: 6,
            max_idle: DEFAULT_MAX_IDLE,
        }
    }
}
