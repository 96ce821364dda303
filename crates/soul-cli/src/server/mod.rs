//! HTTP server startup and graceful shutdown.

mod error;
mod shutdown;

use std::future::{Future, IntoFuture};
use std::io;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub use self::error::{ServerError, ServerResult};
use self::shutdown::shutdown_signal;
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` until a shutdown signal.
///
/// In-flight requests get up to `SHUTDOWN_TIMEOUT` seconds to finish.
pub async fn serve(app: Router, config: ServerConfig) -> ServerResult<()> {
    let server_addr = config.server_addr();

    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %err,
            "Failed to bind to address"
        );
        ServerError::bind(server_addr, err)
    })?;

    let shutdown_timeout = config.shutdown_timeout();
    serve_with_shutdown(&config, || drain(listener, app, shutdown_timeout)).await
}

/// Serves until a shutdown signal, then allows `shutdown_timeout` for
/// in-flight requests to finish.
async fn drain(listener: TcpListener, app: Router, shutdown_timeout: Duration) -> io::Result<()> {
    let (fired_tx, mut fired_rx) = oneshot::channel::<()>();
    let signal = async move {
        shutdown_signal(shutdown_timeout).await;
        let _ = fired_tx.send(());
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        _ = &mut fired_rx => {}
    }

    match tokio::time::timeout(shutdown_timeout, server).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "in-flight requests did not finish before the shutdown timeout",
        )),
    }
}

/// Runs `serve_fn`, logging readiness, uptime and failures.
async fn serve_with_shutdown<F>(
    config: &ServerConfig,
    serve_fn: impl FnOnce() -> F,
) -> ServerResult<()>
where
    F: Future<Output = io::Result<()>>,
{
    let start_time = Instant::now();

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %config.server_addr(),
        "Server is ready and listening for connections"
    );

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server bound to all interfaces, ensure the firewall is configured"
        );
    }

    let uptime_secs = || start_time.elapsed().as_secs();
    match serve_fn().await {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs = uptime_secs(),
                "Shutdown completed"
            );
            Ok(())
        }
        Err(err) => {
            let error = ServerError::Runtime(err);
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %error,
                uptime_secs = uptime_secs(),
                suggestion = ?error.suggestion(),
                "Fatal error"
            );
            Err(error)
        }
    }
}
