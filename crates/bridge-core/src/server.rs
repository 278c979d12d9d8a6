//! HTTP server lifecycle.
//!
//! Each accepted connection is served on its own task by hyper's HTTP/1
//! connection builder. The header-read timeout also bounds how long an idle
//! keep-alive connection may wait for its next request. Shutdown stops the
//! accept loop, then gives open connections a grace period to drain.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracing::{debug, info, warn};

use crate::context::GatewayContext;
use crate::error::Result;
use crate::gateway::router;

/// Why the server stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Operator asked to stop (Ctrl-C or SIGTERM).
    Signal,
    /// A runtime fault was raised.
    Fault,
}

impl ShutdownReason {
    /// Process exit code for this reason.
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Signal => 0,
            Self::Fault => 1,
        }
    }
}

/// Bind the configured address and serve until shutdown.
///
/// # Errors
///
/// Fails if the address cannot be bound.
pub async fn serve(ctx: Arc<GatewayContext>) -> Result<ShutdownReason> {
    let address = ctx.config.server.bind_address();
    let listener = TcpListener::bind(&address).await?;
    serve_listener(listener, ctx).await
}

/// Serve on an already-bound listener until shutdown.
///
/// # Errors
///
/// Fails if the listener's local address cannot be read.
pub async fn serve_listener(
    listener: TcpListener,
    ctx: Arc<GatewayContext>,
) -> Result<ShutdownReason> {
    let local = listener.local_addr()?;
    log_startup(&ctx, local);

    let app = router(Arc::clone(&ctx));
    let sweeper = ctx.limiter.spawn_sweeper();
    let graceful = GracefulShutdown::new();

    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(ctx.config.server.header_timeout())
        .keep_alive(ctx.config.server.keep_alive);

    let shutdown = shutdown_signal(&ctx);
    tokio::pin!(shutdown);

    let reason = loop {
        tokio::select! {
            reason = &mut shutdown => break reason,
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let app = app.clone();
                let service = service_fn(move |mut req: hyper::Request<Incoming>| {
                    req.extensions_mut().insert(ConnectInfo(peer));
                    app.clone().oneshot(req.map(Body::new))
                });

                let connection = builder.serve_connection(TokioIo::new(stream), service);
                let connection = graceful.watch(connection);
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        debug!(peer = %peer, error = %e, "connection ended with error");
                    }
                });
            }
        }
    };

    drop(listener);
    sweeper.abort();

    let grace = ctx.config.server.shutdown_grace();
    info!(reason = ?reason, grace_secs = grace.as_secs(), "shutting down, draining connections");
    match tokio::time::timeout(grace, graceful.shutdown()).await {
        Ok(()) => info!("all connections closed"),
        Err(_) => warn!("grace period elapsed with connections still open"),
    }
    Ok(reason)
}

fn log_startup(ctx: &GatewayContext, local: SocketAddr) {
    let limits = &ctx.config.limits;
    info!(
        address = %local,
        tools = ctx.registry.len(),
        rate_limit = limits.rate_limit_max,
        window_secs = limits.rate_limit_window_secs,
        max_body_bytes = limits.max_body_bytes,
        "host bridge listening"
    );
    if ctx.config.server.is_loopback() {
        info!("bound to loopback; not reachable from the network");
    } else {
        warn!(
            host = %ctx.config.server.host,
            "network exposed: any reachable client can attempt authentication"
        );
    }
    if ctx.config.server.trust_proxy {
        info!("trusting X-Forwarded-For for client addresses");
    }
    if ctx.config.cors.has_wildcard() {
        warn!("CORS origin \"*\" is insecure and is not honoured; list explicit origins instead");
    } else if !ctx.cors.is_same_origin_only() {
        info!(origins = ?ctx.config.cors.origins, "CORS allow-list active");
    }
}

async fn shutdown_signal(ctx: &GatewayContext) -> ShutdownReason {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => ShutdownReason::Signal,
        () = terminate => ShutdownReason::Signal,
        () = ctx.faulted() => ShutdownReason::Fault,
    }
}
