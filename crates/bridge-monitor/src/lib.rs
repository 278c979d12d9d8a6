//! # Bridge Monitor
//!
//! Per-process bookkeeping shared by every request the gateway handles.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`RateLimiter`] | Fixed-window admission control per source address |
//! | [`ExecutionLog`] | Bounded FIFO of recent gated requests |
//! | [`Metrics`] | Monotonic process-wide counters |
//!
//! All three are `Sync` and meant to live behind one `Arc`d context object
//! constructed at startup. Each guards its own state with a mutex or atomics,
//! so request tasks on a multi-threaded runtime can share them freely.
//!
//! ## Quick Start
//!
//! ```rust
//! use bridge_monitor::{RateLimiter, RateLimitConfig};
//!
//! let limiter = RateLimiter::new(RateLimitConfig::new().with_max_requests(2))?;
//!
//! assert!(limiter.admit("10.0.0.1"));
//! assert!(limiter.admit("10.0.0.1"));
//! assert!(!limiter.admit("10.0.0.1"));
//! # Ok::<(), bridge_monitor::MonitorError>(())
//! ```

mod error;
mod log;
mod metrics;
mod rate;

pub use error::{MonitorError, Result};
pub use log::{ExecutionLog, LogEntry, LogId, DEFAULT_LOG_CAPACITY};
pub use metrics::{MemorySnapshot, Metrics, MetricsSnapshot};
pub use rate::{RateLimitConfig, RateLimitEntry, RateLimiter};
