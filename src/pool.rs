// SPDX-License-Identifier: MIT
//! Compression session pool
//!
//! Recycles [`GzipSession`]s across writers so the deflate state and scratch
//! buffers are allocated once and reused. The pool is an ordinary value: build
//! one per process (or per test) and share it by reference or `Arc`.

use std::sync::atomic::{AtomicU64, Ordering};

use flate2::Compression;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::PoolConfig;
use crate::error::Result;
use crate::session::GzipSession;

/// Idle sessions kept by a default pool
pub const DEFAULT_MAX_IDLE: usize = 64;

/// Thread-safe free list of compression sessions
#[derive(Debug)]
pub struct CompressorPool {
    level: Compression,
    max_idle: usize,
    idle: Mutex<Vec<GzipSession>>,
    created: AtomicU64,
    reused: AtomicU64,
    released: AtomicU64,
    discarded: AtomicU64,
}

impl CompressorPool {
    /// Create a pool handing out sessions at the given compression level
    pub fn new(level: Compression) -> Self {
        Self::with_capacity(level, DEFAULT_MAX_IDLE)
    }

    /// Create a pool that keeps at most `max_idle` idle sessions
    pub fn with_capacity(level: Compression, max_idle: usize) -> Self {
        Self {
            level,
            max_idle,
            idle: Mutex::new(Vec::new()),
            created: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            released: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Create a pool from validated configuration
    pub fn from_config(config: &PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_capacity(
            Compression::new(config.level),
            config.max_idle,
        ))
    }

    /// Compression level of sessions created by this pool
    pub fn level(&self) -> Compression {
        self.level
    }

    /// Take a session out of the pool, creating one if none is idle
    ///
    /// The returned session's state is unspecified: call
    /// [`GzipSession::reset`] before writing through it.
    pub fn acquire(&self) -> GzipSession {
        // Keep the lock scope to the pop itself
        let pooled = self.idle.lock().pop();
        match pooled {
            Some(session) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                debug!("Reusing pooled gzip session");
                session
            }
            None => {
                self.created.fetch_add(1, Ordering::Relaxed);
                debug!(level = self.level.level(), "Creating gzip session");
                GzipSession::new(self.level)
            }
        }
    }

    /// Return a cleanly finished session for reuse
    ///
    /// Must be called at most once per acquired session, and only after
    /// [`GzipSession::finish`] succeeded. Sessions that were not finished, or
    /// that would exceed the idle limit, are dropped instead.
    pub fn release(&self, session: GzipSession) {
        if !session.is_finished() {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            warn!("Discarding gzip session that was not finalized");
            return;
        }

        let mut idle = self.idle.lock();
        if idle.len() >= self.max_idle {
            drop(idle);
            self.discarded.fetch_add(1, Ordering::Relaxed);
            debug!(max_idle = self.max_idle, "Pool full, dropping gzip session");
            return;
        }

        idle.push(session);
        drop(idle);
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of pool counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            idle: self.idle.lock().len(),
        }
    }
}

impl Default for CompressorPool {
    fn default() -> Self {
        Self::new(Compression::default())
    }
}

/// Pool statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Sessions created because none was idle
    pub created: u64,
    /// Acquisitions served from the free list
    pub reused: u64,
    /// Sessions returned to the free list
    pub released: u64,
    /// Sessions dropped on release (unfinished or pool full)
    pub discarded: u64,
    /// Sessions currently idle
    pub idle: usize,
}

impl PoolStats {
    /// Fraction of acquisitions served by reuse
    pub fn reuse_ratio(&self) -> f64 {
        let total = self.created + self.reused;
        if total == 0 {
            return 0.0;
        }
        self.reused as f64 / total as f64
    }
}
