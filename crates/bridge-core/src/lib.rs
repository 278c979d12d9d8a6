//! # Bridge Core
//!
//! HTTP gateway in front of the tool registry. Every request goes through the
//! same ordered gates before any tool code runs.
//!
//! ## Threat Coverage
//!
//! | Gate | Component | Rejects |
//! |------|-----------|---------|
//! | Body limit | `tower-http` | Oversized payloads (413) |
//! | CORS | [`CorsPolicy`] | Cross-site reads from unlisted origins |
//! | Rate limit | `bridge-monitor` | Floods, including unauthenticated ones (429) |
//! | Auth | [`Authenticator`] | Callers without the shared token (401) |
//! | Screening | `bridge-firewall` | Credential paths, shell hazards |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        BRIDGE CORE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │   TCP ──▶ server (hyper http1) ──▶ gateway (axum Router)    │
//! │                                        │                    │
//! │                            ┌───────────┴───────────┐        │
//! │                            ▼                       ▼        │
//! │                    GatewayContext             routes        │
//! │           (limiter, log, metrics, auth)          │          │
//! │                                                  ▼          │
//! │                                           ToolRegistry      │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bridge_core::{credentials, serve, GatewayConfig, GatewayContext};
//! use bridge_registry::builtin;
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), bridge_core::BridgeError> {
//! let token = credentials::load_token(
//!     std::env::var(credentials::TOKEN_ENV).ok(),
//!     Path::new(credentials::DEFAULT_CONFIG_FILE),
//! )?;
//! let ctx = GatewayContext::new(GatewayConfig::default(), token, builtin::default_tools())?;
//! let reason = serve(ctx.shared()).await?;
//! std::process::exit(i32::from(reason.exit_code()));
//! # }
//! ```
//!
//! ## Security Notes
//!
//! - There is no open mode: without a token the process refuses to start.
//! - The listener defaults to loopback. Binding elsewhere is logged loudly.
//! - The safety filter is a deny-list. It slows an attacker down; it is not a
//!   sandbox, and tools run with the bridge's own privileges.

pub mod auth;
mod config;
mod context;
mod cors;
pub mod credentials;
mod error;
mod gateway;
mod routes;
mod server;

pub use auth::{AuthFailure, Authenticator};
pub use config::{CorsConfig, GatewayConfig, LimitsConfig, ServerConfig};
pub use context::GatewayContext;
pub use cors::CorsPolicy;
pub use credentials::AuthToken;
pub use error::{BridgeError, Result};
pub use gateway::{router, source_key, LogHandle, LOGGED_PATHS, UNKNOWN_SOURCE};
pub use server::{serve, serve_listener, ShutdownReason};
