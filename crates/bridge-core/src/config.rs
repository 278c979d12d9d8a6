//! Configuration types for the gateway.

use std::net::IpAddr;
use std::time::Duration;

use bridge_monitor::RateLimitConfig;
use serde::{Deserialize, Serialize};

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener and connection settings.
    pub server: ServerConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Admission limits.
    pub limits: LimitsConfig,
}

/// Listener and connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address. Loopback unless the operator opts in.
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Take the client address from `X-Forwarded-For`.
    pub trust_proxy: bool,

    /// Time allowed to receive request headers, also the idle keep-alive limit.
    pub header_timeout_secs: u64,

    /// Time allowed for a whole request.
    pub request_timeout_secs: u64,

    /// Reuse connections between requests.
    pub keep_alive: bool,

    /// Time open connections get to finish after shutdown starts.
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            trust_proxy: false,
            header_timeout_secs: 15,
            request_timeout_secs: 30,
            keep_alive: true,
            shutdown_grace_secs: 5,
        }
    }
}

impl ServerConfig {
    /// `host:port`, bracketing IPv6 literals.
    pub fn bind_address(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("[{ip}]:{}", self.port),
            _ => format!("{}:{}", self.host, self.port),
        }
    }

    /// `true` if the listener is reachable only from this machine.
    pub fn is_loopback(&self) -> bool {
        match self.host.parse::<IpAddr>() {
            Ok(ip) => ip.is_loopback(),
            Err(_) => self.host.eq_ignore_ascii_case("localhost"),
        }
    }

    /// Header-read timeout.
    pub fn header_timeout(&self) -> Duration {
        Duration::from_secs(self.header_timeout_secs)
    }

    /// Whole-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Shutdown drain period.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Cross-origin policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. Empty means same-origin only; `*` allows any.
    pub origins: Vec<String>,
}

impl CorsConfig {
    /// Parse a comma-separated origin list, dropping blanks.
    pub fn from_list(list: &str) -> Self {
        Self {
            origins: list
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// `true` if a `*` entry is configured. It is flagged at startup but
    /// never matches a real origin.
    pub fn has_wildcard(&self) -> bool {
        self.origins.iter().any(|origin| origin == "*")
    }
}

/// Admission limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Rate-limit window length.
    pub rate_limit_window_secs: u64,

    /// Requests allowed per source per window.
    pub rate_limit_max: u32,

    /// Largest accepted request body.
    pub max_body_bytes: usize,

    /// Longest accepted batch.
    pub max_batch: usize,

    /// Execution log capacity.
    pub log_capacity: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            rate_limit_window_secs: 60,
            rate_limit_max: 60,
            max_body_bytes: 100 * 1024,
            max_batch: 10,
            log_capacity: 100,
        }
    }
}

impl LimitsConfig {
    /// Rate limiter settings.
    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig::new()
            .with_window(Duration::from_secs(self.rate_limit_window_secs))
            .with_max_requests(self.rate_limit_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert!(config.server.is_loopback());
        assert!(config.cors.origins.is_empty());
        assert_eq!(config.limits.max_body_bytes, 102_400);
        assert_eq!(config.limits.max_batch, 10);
    }

    #[test]
    fn test_config_serialization() {
        let config = GatewayConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: GatewayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: GatewayConfig =
            serde_json::from_str(r#"{ "server": { "port": 8080 } }"#).unwrap();
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.server.host, "127.0.0.1");
        assert_eq!(parsed.limits.rate_limit_max, 60);
    }

    #[test]
    fn test_exposure() {
        let mut server = ServerConfig::default();
        server.host = "0.0.0.0".to_string();
        assert!(!server.is_loopback());
        server.host = "localhost".to_string();
        assert!(server.is_loopback());
        server.host = "::1".to_string();
        assert!(server.is_loopback());
        assert_eq!(server.bind_address(), "[::1]:3000");
    }

    #[test]
    fn test_cors_list_parsing() {
        let cors = CorsConfig::from_list(" https://a.example , ,https://b.example");
        assert_eq!(cors.origins, vec!["https://a.example", "https://b.example"]);
        assert!(!cors.has_wildcard());
        assert!(CorsConfig::from_list("*").has_wildcard());
    }

    #[test]
    fn test_rate_limit_conversion() {
        let limits = LimitsConfig::default();
        let rate = limits.rate_limit();
        assert_eq!(rate.window, Duration::from_secs(60));
        assert_eq!(rate.max_requests, 60);
    }
}
