//! # Execution Log
//!
//! Bounded FIFO of recent requests to the gated tool routes.
//!
//! An entry is appended when a request arrives and filled in as it moves
//! through the pipeline: the route handler records the tool name and
//! outcome, the tracking layer records status and duration when the response
//! is produced. Updates address entries by [`LogId`]; an update for an entry
//! that has already been evicted is a no-op.
//!
//! ## Eviction
//!
//! | Policy | Description |
//! |--------|-------------|
//! | FIFO | Oldest entry leaves first once capacity is reached |
//!
//! The buffer never holds more than its capacity, regardless of request
//! volume.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{MonitorError, Result};

/// Default number of entries retained.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Handle to a log entry for in-place updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogId(u64);

/// One gated request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(skip)]
    id: LogId,
    /// When the request arrived.
    pub timestamp: DateTime<Utc>,
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Tool name, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Rate-limit key of the caller.
    pub source_address: String,
    /// Tool outcome, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Response status, once sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Time to response, once sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl LogEntry {
    /// Handle for this entry.
    pub fn id(&self) -> LogId {
        self.id
    }
}

#[derive(Debug)]
struct Inner {
    entries: VecDeque<LogEntry>,
    next_id: u64,
}

/// Bounded, shared execution log.
#[derive(Debug)]
pub struct ExecutionLog {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl ExecutionLog {
    /// Creates a log retaining at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ZeroLimit`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MonitorError::ZeroLimit {
                field: "log_capacity",
            });
        }
        Ok(Self {
            capacity,
            inner: Mutex::new(Inner {
                entries: VecDeque::with_capacity(capacity),
                next_id: 0,
            }),
        })
    }

    /// Maximum number of retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// `true` if nothing has been logged yet.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Append a new entry, evicting the oldest if full.
    pub fn begin(
        &self,
        method: impl Into<String>,
        path: impl Into<String>,
        source_address: impl Into<String>,
    ) -> LogId {
        let mut inner = self.lock();
        let id = LogId(inner.next_id);
        inner.next_id += 1;

        if inner.entries.len() >= self.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(LogEntry {
            id,
            timestamp: Utc::now(),
            method: method.into(),
            path: path.into(),
            tool: None,
            source_address: source_address.into(),
            success: None,
            status_code: None,
            duration_ms: None,
        });
        id
    }

    /// Apply `update` to the entry `id`. Returns `false` if it was evicted.
    pub fn update(&self, id: LogId, update: impl FnOnce(&mut LogEntry)) -> bool {
        let mut inner = self.lock();
        // Ids are assigned in push order, so search from the back.
        match inner.entries.iter_mut().rev().find(|entry| entry.id == id) {
            Some(entry) => {
                update(entry);
                true
            }
            None => false,
        }
    }

    /// Record the tool name for `id`.
    pub fn set_tool(&self, id: LogId, tool: &str) -> bool {
        self.update(id, |entry| entry.tool = Some(tool.to_string()))
    }

    /// Record the tool outcome for `id`.
    pub fn set_success(&self, id: LogId, success: bool) -> bool {
        self.update(id, |entry| entry.success = Some(success))
    }

    /// Record response status and duration for `id`.
    pub fn complete(&self, id: LogId, status_code: Option<u16>, duration_ms: u64) -> bool {
        self.update(id, |entry| {
            entry.status_code = status_code;
            entry.duration_ms = Some(duration_ms);
        })
    }

    /// Copy of all retained entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().entries.iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ExecutionLog {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_LOG_CAPACITY,
            inner: Mutex::new(Inner {
                entries: VecDeque::with_capacity(DEFAULT_LOG_CAPACITY),
                next_id: 0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(ExecutionLog::new(0).is_err());
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let log = ExecutionLog::default();
        for i in 0..1_000 {
            log.begin("POST", "/execute", format!("10.0.0.{}", i % 255));
            assert!(log.len() <= DEFAULT_LOG_CAPACITY);
        }
        assert_eq!(log.len(), DEFAULT_LOG_CAPACITY);
    }

    #[test]
    fn test_oldest_evicted_first() {
        let log = ExecutionLog::new(3).unwrap();
        let ids: Vec<LogId> = (0..5)
            .map(|i| log.begin("POST", format!("/p{}", i), "ip"))
            .collect();

        let paths: Vec<String> = log.entries().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["/p2", "/p3", "/p4"]);

        assert!(!log.set_tool(ids[0], "gone"));
        assert!(log.set_tool(ids[4], "kept"));
    }

    #[test]
    fn test_in_place_updates() {
        let log = ExecutionLog::new(10).unwrap();
        let id = log.begin("POST", "/execute", "127.0.0.1");

        log.set_tool(id, "run_command");
        log.set_success(id, true);
        log.complete(id, Some(200), 12);

        let entry = &log.entries()[0];
        assert_eq!(entry.id(), id);
        assert_eq!(entry.tool.as_deref(), Some("run_command"));
        assert_eq!(entry.success, Some(true));
        assert_eq!(entry.status_code, Some(200));
        assert_eq!(entry.duration_ms, Some(12));
    }

    #[test]
    fn test_serialized_shape() {
        let log = ExecutionLog::new(10).unwrap();
        let id = log.begin("POST", "/batch", "::1");
        log.complete(id, Some(401), 0);

        let json = serde_json::to_value(&log.entries()[0]).unwrap();
        assert_eq!(json["sourceAddress"], "::1");
        assert_eq!(json["statusCode"], 401);
        assert!(json.get("tool").is_none());
        assert!(json.get("id").is_none());
        assert!(json["timestamp"].is_string());
    }
}
