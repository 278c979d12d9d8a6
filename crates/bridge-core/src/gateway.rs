//! # Request Gateway
//!
//! The middleware chain every request passes through, outermost first:
//!
//! ```text
//!  request
//!     │
//!     ▼
//!  security headers ── nosniff, DENY framing, no-referrer (on every response)
//!     ▼
//!  request timeout ─── 408 when the whole request runs too long
//!     ▼
//!  tracking ────────── counts the request, opens a log entry for
//!     │                /execute and /batch, completes it on drop
//!     ▼
//!  panic guard ─────── 500, records lastError, raises the fault signal
//!     ▼
//!  body limit ──────── 413 before any JSON parsing
//!     ▼
//!  CORS ────────────── preflight short-circuits with 204
//!     ▼
//!  rate limit ──────── 429 + Retry-After
//!     ▼
//!  bearer auth ─────── 401 (protected routes only)
//!     ▼
//!  route handler
//! ```
//!
//! ## Security Notes
//!
//! - Rate limiting runs before authentication, so unauthenticated floods are
//!   throttled as well.
//! - Authentication runs before the handler, so no tool name or argument is
//!   looked at for an unauthenticated caller.
//! - The log entry is opened before either gate, so rejected requests show up
//!   in `/logs` with their status code.

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use bridge_monitor::LogId;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::{debug, warn};

use crate::context::GatewayContext;
use crate::error::BridgeError;
use crate::routes;

/// Paths whose requests are recorded in the execution log.
pub const LOGGED_PATHS: [&str; 2] = ["/execute", "/batch"];

/// Source key used when the peer address is unknown.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Request extension pointing at the log entry opened for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogHandle(pub LogId);

/// Build the full application.
pub fn router(ctx: Arc<GatewayContext>) -> Router {
    let panic_ctx = Arc::clone(&ctx);
    let max_body = ctx.config.limits.max_body_bytes;
    let request_timeout = ctx.config.server.request_timeout();

    let protected = Router::new()
        .route("/tools", get(routes::list_tools))
        .route("/execute", post(routes::execute))
        .route("/batch", post(routes::batch))
        .route("/logs", get(routes::logs))
        .route("/metrics", get(routes::metrics))
        .route_layer(from_fn_with_state(Arc::clone(&ctx), require_bearer));

    Router::new()
        .route("/health", get(routes::health))
        .merge(protected)
        .fallback(routes::not_found)
        .layer(from_fn_with_state(Arc::clone(&ctx), rate_limit))
        .layer(from_fn_with_state(Arc::clone(&ctx), cors))
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| panic_response(&panic_ctx, panic),
        ))
        .layer(from_fn_with_state(Arc::clone(&ctx), track))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .with_state(ctx)
}

/// Rate-limit key for a request.
///
/// With `trust_proxy`, the first `X-Forwarded-For` entry; otherwise the peer
/// IP from [`ConnectInfo`].
pub fn source_key(req: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty());
        if let Some(client) = forwarded {
            return client.to_string();
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

/// Completes the request's bookkeeping however the request ends.
struct Tracking<'a> {
    ctx: &'a GatewayContext,
    log: Option<LogId>,
    started: Instant,
    status: Option<StatusCode>,
}

impl Drop for Tracking<'_> {
    fn drop(&mut self) {
        let elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match self.status {
            Some(status) if status == StatusCode::TOO_MANY_REQUESTS => {}
            Some(status) if status.is_client_error() || status.is_server_error() => {
                self.ctx.metrics.record_error();
            }
            Some(_) => {}
            None => {
                debug!(elapsed_ms, "request dropped before a response was produced");
                self.ctx.metrics.record_error();
            }
        }
        if let Some(id) = self.log {
            self.ctx
                .log
                .complete(id, self.status.map(|status| status.as_u16()), elapsed_ms);
        }
    }
}

async fn track(State(ctx): State<Arc<GatewayContext>>, mut req: Request, next: Next) -> Response {
    ctx.metrics.record_request();
    let mut tracking = Tracking {
        ctx: &ctx,
        log: None,
        started: Instant::now(),
        status: None,
    };

    let path = req.uri().path();
    if LOGGED_PATHS.contains(&path) {
        let source = source_key(&req, ctx.config.server.trust_proxy);
        let id = ctx.log.begin(req.method().as_str(), path, source);
        req.extensions_mut().insert(LogHandle(id));
        tracking.log = Some(id);
    }

    let response = next.run(req).await;
    tracking.status = Some(response.status());
    response
}

async fn cors(State(ctx): State<Arc<GatewayContext>>, req: Request, next: Next) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };
    ctx.cors.apply(origin.as_deref(), response.headers_mut());
    response
}

async fn rate_limit(State(ctx): State<Arc<GatewayContext>>, req: Request, next: Next) -> Response {
    let source = source_key(&req, ctx.config.server.trust_proxy);
    if !ctx.limiter.admit(&source) {
        ctx.metrics.record_rate_limited();
        warn!(source = %source, path = %req.uri().path(), "rate limit exceeded");
        return BridgeError::RateLimited {
            retry_after_secs: ctx.limiter.retry_after_secs(),
        }
        .into_response();
    }
    next.run(req).await
}

async fn require_bearer(
    State(ctx): State<Arc<GatewayContext>>,
    req: Request,
    next: Next,
) -> Response {
    // A header that is not valid ASCII is present but unusable.
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default());

    match ctx.authenticator.verify(header) {
        Ok(()) => next.run(req).await,
        Err(failure) => {
            warn!(reason = %failure, path = %req.uri().path(), "authentication failed");
            BridgeError::Unauthorized(failure).into_response()
        }
    }
}

fn panic_response(ctx: &GatewayContext, panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown panic".to_string()
    };
    ctx.raise_fault(&format!("panic: {detail}"));
    BridgeError::Internal(detail).into_response()
}
