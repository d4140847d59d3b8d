//! Metrics registry for the runtime primitives
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, relaxed atomics

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use serde::Serialize;

static GLOBAL: OnceLock<MetricsRegistry> = OnceLock::new();

/// Metrics registry containing all runtime counters
///
/// Uses Relaxed ordering; values are exact once all writers are quiescent.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Pages allocated by chunked buffers
    pages_allocated: AtomicU64,
    /// Bytes appended to chunked buffers
    bytes_buffered: AtomicU64,
    /// Successful throttle admissions
    throttle_admissions: AtomicU64,
    /// Errors reported to throttles
    throttle_errors: AtomicU64,
    /// Closers signalled
    closers_signalled: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry the primitives report into
    pub fn global() -> &'static MetricsRegistry {
        GLOBAL.get_or_init(MetricsRegistry::new)
    }

    pub fn increment_pages_allocated(&self) {
        self.pages_allocated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes_buffered(&self, bytes: u64) {
        self.bytes_buffered.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn increment_throttle_admissions(&self) {
        self.throttle_admissions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_throttle_errors(&self) {
        self.throttle_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_closers_signalled(&self) {
        self.closers_signalled.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pages_allocated: self.pages_allocated.load(Ordering::Relaxed),
            bytes_buffered: self.bytes_buffered.load(Ordering::Relaxed),
            throttle_admissions: self.throttle_admissions.load(Ordering::Relaxed),
            throttle_errors: self.throttle_errors.load(Ordering::Relaxed),
            closers_signalled: self.closers_signalled.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub pages_allocated: u64,
    pub bytes_buffered: u64,
    pub throttle_admissions: u64,
    pub throttle_errors: u64,
    pub closers_signalled: u64,
}

impl MetricsSnapshot {
    /// Render as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
