//! # Fixed-Window Rate Limiter
//!
//! Counts requests per source key inside a window of length `W` and rejects
//! once `C` requests have been admitted.
//!
//! ## Algorithm
//!
//! | State | Action |
//! |-------|--------|
//! | No entry, or `reset_at` reached | Fresh entry, `count = 1`, `reset_at = now + W`, admit |
//! | `count >= C` | Reject, count untouched |
//! | Otherwise | `count += 1`, admit |
//!
//! A rejected request is never counted, so `count` tops out at exactly `C`.
//!
//! ## Known Approximation
//!
//! Windows start at each key's first request rather than sliding, so a
//! caller can land `C` requests at the end of one window and `C` more at the
//! start of the next: up to `2 × C` inside any span of length `W`. That is
//! acceptable for a single-operator gateway; a token bucket would be the
//! upgrade if it ever is not.
//!
//! ## Memory
//!
//! Each distinct key costs one entry. [`RateLimiter::sweep`] drops entries
//! whose window has closed and [`RateLimiter::spawn_sweeper`] runs it once per
//! window, so churn of source addresses cannot grow the map without bound.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{MonitorError, Result};

/// Rate limiter settings.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use bridge_monitor::RateLimitConfig;
///
/// let config = RateLimitConfig::new()
///     .with_window(Duration::from_secs(30))
///     .with_max_requests(10);
/// assert_eq!(config.max_requests, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Window length `W`.
    pub window: Duration,
    /// Requests admitted per window, `C`.
    pub max_requests: u32,
}

impl RateLimitConfig {
    /// Defaults: 60 requests per 60 seconds.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 60,
        }
    }

    /// Sets the window length.
    #[must_use]
    pub const fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Sets the per-window capacity.
    #[must_use]
    pub const fn with_max_requests(mut self, max_requests: u32) -> Self {
        self.max_requests = max_requests;
        self
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-key window state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests admitted in the current window.
    pub count: u32,
    /// When the current window closes.
    pub reset_at: Instant,
}

/// Fixed-window admission control keyed by source address.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl RateLimiter {
    /// Creates a limiter.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ZeroLimit`] if the window or capacity is zero.
    pub fn new(config: RateLimitConfig) -> Result<Self> {
        if config.window.is_zero() {
            return Err(MonitorError::ZeroLimit { field: "window" });
        }
        if config.max_requests == 0 {
            return Err(MonitorError::ZeroLimit {
                field: "max_requests",
            });
        }
        Ok(Self {
            config,
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Seconds a rejected caller should wait, rounded up.
    pub fn retry_after_secs(&self) -> u64 {
        let window = self.config.window;
        window.as_secs() + u64::from(window.subsec_nanos() > 0)
    }

    /// Admit or reject one request from `key`.
    pub fn admit(&self, key: &str) -> bool {
        self.admit_at(key, Instant::now())
    }

    /// Admit or reject one request from `key` at time `now`.
    pub fn admit_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.lock();

        match entries.get_mut(key) {
            Some(entry) if now < entry.reset_at => {
                if entry.count >= self.config.max_requests {
                    return false;
                }
                entry.count += 1;
                true
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    RateLimitEntry {
                        count: 1,
                        reset_at: now + self.config.window,
                    },
                );
                true
            }
        }
    }

    /// Current count for `key`, if it has an entry.
    pub fn count(&self, key: &str) -> Option<u32> {
        self.lock().get(key).map(|entry| entry.count)
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    /// Drop entries whose window has closed. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Drop entries whose window closed at or before `now`.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.reset_at > now);
        before - entries.len()
    }

    /// Run [`sweep`](Self::sweep) once per window on the current runtime.
    ///
    /// The task runs until aborted.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        let period = self.config.window;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = limiter.sweep();
                if removed > 0 {
                    debug!(removed, "swept expired rate-limit entries");
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
