//! # Monitor Integration Tests
//!
//! Shared-state behavior under concurrent access from many tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bridge_monitor::{ExecutionLog, Metrics, RateLimitConfig, RateLimiter};

#[test]
fn test_concurrent_admission_never_exceeds_capacity() {
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig::new().with_max_requests(60)).unwrap());
    let now = Instant::now();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            std::thread::spawn(move || (0..20).filter(|_| limiter.admit_at("shared", now)).count())
        })
        .collect();

    let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(admitted, 60);
    assert_eq!(limiter.count("shared"), Some(60));
}

#[test]
fn test_new_window_after_expiry() {
    let limiter = RateLimiter::new(
        RateLimitConfig::new()
            .with_max_requests(60)
            .with_window(Duration::from_secs(60)),
    )
    .unwrap();
    let start = Instant::now();

    for _ in 0..60 {
        assert!(limiter.admit_at("caller", start));
    }
    assert!(!limiter.admit_at("caller", start + Duration::from_secs(30)));

    assert!(limiter.admit_at("caller", start + Duration::from_secs(60)));
    assert_eq!(limiter.count("caller"), Some(1));
}

#[test]
fn test_concurrent_log_appends_stay_bounded() {
    let log = Arc::new(ExecutionLog::new(100).unwrap());
    let metrics = Arc::new(Metrics::new());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let log = Arc::clone(&log);
            let metrics = Arc::clone(&metrics);
            std::thread::spawn(move || {
                for i in 0..250 {
                    metrics.record_request();
                    let id = log.begin("POST", "/execute", format!("{}-{}", t, i));
                    log.complete(id, Some(200), 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(log.len(), 100);
    assert_eq!(metrics.snapshot().requests, 1_000);
    assert!(log.entries().iter().all(|e| e.status_code == Some(200)));
}
