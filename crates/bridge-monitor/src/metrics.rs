//! Process-wide counters.
//!
//! Counters only ever grow; a restart is the only reset.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Live counters shared by every request.
#[derive(Debug)]
pub struct Metrics {
    started_at: DateTime<Utc>,
    started: Instant,
    requests: AtomicU64,
    errors: AtomicU64,
    rate_limited: AtomicU64,
    tool_executions: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl Metrics {
    /// Start counting from now.
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
            requests: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            rate_limited: AtomicU64::new(0),
            tool_executions: AtomicU64::new(0),
            last_error: Mutex::new(None),
        }
    }

    /// Count an incoming request.
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed request.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a request rejected by the rate limiter.
    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    /// Count `n` tool invocations.
    pub fn record_tool_executions(&self, n: u64) {
        self.tool_executions.fetch_add(n, Ordering::Relaxed);
    }

    /// Remember the most recent failure message.
    pub fn set_last_error(&self, message: impl Into<String>) {
        let mut last = self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *last = Some(message.into());
    }

    /// Seconds since the counters started.
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Point-in-time copy for reporting.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            started_at: self.started_at,
            uptime_seconds: self.uptime_secs(),
            requests: self.requests.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            tool_executions: self.tool_executions.load(Ordering::Relaxed),
            last_error: self
                .last_error
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            memory: MemorySnapshot::current(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized form of [`Metrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Process start time.
    pub started_at: DateTime<Utc>,
    /// Whole seconds since start.
    pub uptime_seconds: u64,
    /// All requests seen.
    pub requests: u64,
    /// Failed requests.
    pub errors: u64,
    /// Requests rejected by the rate limiter.
    pub rate_limited: u64,
    /// Tool invocations attempted.
    pub tool_executions: u64,
    /// Most recent failure message, or null.
    pub last_error: Option<String>,
    /// Process memory at snapshot time.
    pub memory: MemorySnapshot,
}

/// Process memory usage.
///
/// Read from the `VmRSS`/`VmSize` lines of `/proc/self/status` on Linux,
/// which the kernel reports in kB whatever the page size. Both fields are
/// `None` elsewhere or if the read fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    /// Resident set size in bytes.
    pub resident_bytes: Option<u64>,
    /// Virtual memory size in bytes.
    pub virtual_bytes: Option<u64>,
}

impl MemorySnapshot {
    /// Sample the current process.
    pub fn current() -> Self {
        #[cfg(target_os = "linux")]
        {
            std::fs::read_to_string("/proc/self/status")
                .map(|status| Self::from_status(&status))
                .unwrap_or_default()
        }
        #[cfg(not(target_os = "linux"))]
        {
            Self::default()
        }
    }

    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    fn from_status(status: &str) -> Self {
        Self {
            resident_bytes: status_kib(status, "VmRSS:").map(|kib| kib * 1024),
            virtual_bytes: status_kib(status, "VmSize:").map(|kib| kib * 1024),
        }
    }
}

/// Value of a `Key:   1234 kB` line.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn status_kib(status: &str, key: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix(key))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|value| value.parse().ok())
}
