//! Shared gateway state.
//!
//! Built once at startup and handed to every middleware and route as
//! `Arc<GatewayContext>`. Nothing in the gateway lives in a global.

use std::sync::Arc;

use bridge_monitor::{ExecutionLog, Metrics, RateLimiter};
use bridge_registry::{ToolDescriptor, ToolRegistry};
use tokio::sync::watch;
use tracing::error;

use crate::auth::Authenticator;
use crate::config::GatewayConfig;
use crate::cors::CorsPolicy;
use crate::credentials::AuthToken;
use crate::error::Result;

/// Everything a request needs.
#[derive(Debug)]
pub struct GatewayContext {
    /// Effective configuration.
    pub config: GatewayConfig,
    /// Bearer-token check.
    pub authenticator: Authenticator,
    /// Tool catalogue.
    pub registry: ToolRegistry,
    /// Per-source admission control.
    pub limiter: Arc<RateLimiter>,
    /// Recent gated requests.
    pub log: ExecutionLog,
    /// Process counters.
    pub metrics: Metrics,
    /// Cross-origin policy.
    pub cors: CorsPolicy,
    fault: watch::Sender<bool>,
}

impl GatewayContext {
    /// Assemble the context.
    ///
    /// # Errors
    ///
    /// Fails if the tools cannot form a registry or a limit is zero.
    pub fn new(
        config: GatewayConfig,
        token: AuthToken,
        tools: Vec<ToolDescriptor>,
    ) -> Result<Self> {
        let registry = ToolRegistry::new(tools)?.with_max_batch(config.limits.max_batch);
        let limiter = Arc::new(RateLimiter::new(config.limits.rate_limit())?);
        let log = ExecutionLog::new(config.limits.log_capacity)?;
        let cors = CorsPolicy::new(&config.cors);
        let (fault, _) = watch::channel(false);

        Ok(Self {
            config,
            authenticator: Authenticator::new(token),
            registry,
            limiter,
            log,
            metrics: Metrics::new(),
            cors,
            fault,
        })
    }

    /// Wrap in an `Arc` for sharing.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Record an unrecoverable runtime fault and ask the server to stop.
    pub fn raise_fault(&self, message: &str) {
        error!(error = %message, "runtime fault, shutting down");
        self.metrics.set_last_error(message);
        self.fault.send_replace(true);
    }

    /// `true` once a fault has been raised.
    pub fn is_faulted(&self) -> bool {
        *self.fault.borrow()
    }

    /// Resolves when a fault is raised.
    pub async fn faulted(&self) {
        let mut rx = self.fault.subscribe();
        // The sender lives as long as `self`, so this cannot fail while borrowed.
        let _ = rx.wait_for(|raised| *raised).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_registry::builtin;
    use std::time::Duration;

    fn context() -> GatewayContext {
        GatewayContext::new(
            GatewayConfig::default(),
            AuthToken::new("t0ken").unwrap(),
            builtin::default_tools(),
        )
        .unwrap()
    }

    #[test]
    fn test_limits_flow_into_components() {
        let mut config = GatewayConfig::default();
        config.limits.max_batch = 3;
        config.limits.log_capacity = 7;
        let token = AuthToken::new("t").unwrap();
        let ctx = GatewayContext::new(config, token, builtin::default_tools()).unwrap();
        assert_eq!(ctx.registry.max_batch(), 3);
        assert_eq!(ctx.log.capacity(), 7);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut config = GatewayConfig::default();
        config.limits.rate_limit_max = 0;
        let result = GatewayContext::new(config, AuthToken::new("t").unwrap(), vec![]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fault_wakes_waiter() {
        let ctx = context().shared();
        assert!(!ctx.is_faulted());

        let waiter = {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move { ctx.faulted().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctx.raise_fault("boom");

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(ctx.is_faulted());
        assert_eq!(ctx.metrics.snapshot().last_error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_fault_seen_by_late_waiter() {
        let ctx = context();
        ctx.raise_fault("early");
        tokio::time::timeout(Duration::from_secs(1), ctx.faulted())
            .await
            .unwrap();
    }
}
