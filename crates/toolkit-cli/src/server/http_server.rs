//! HTTP server lifecycle.

use std::future::{Future, IntoFuture};
use std::time::{Duration, Instant};

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::server::shutdown::{ShutdownReason, drain_deadline, wait_for_signal};
use crate::server::{Result, ServerError};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds to the configured address and serves `app` until a shutdown
/// signal arrives, then drains connections for at most the configured
/// shutdown timeout.
///
/// # Errors
///
/// - [`ServerError::InvalidConfig`] if the configuration does not validate.
/// - [`ServerError::BindError`] if the address cannot be bound.
/// - [`ServerError::Runtime`] if the server fails while running.
pub async fn serve(app: Router, server_config: ServerConfig) -> Result<()> {
    if let Err(err) = server_config.validate() {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            error = %err,
            "Invalid server configuration"
        );
        return Err(err);
    }

    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        let err = ServerError::bind_error(server_addr, err);
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %err,
            suggestion = err.suggestion(),
            "Failed to bind to address"
        );
        err
    })?;

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server bound to all interfaces, ensure firewall is configured"
        );
    }

    run(
        listener,
        app,
        wait_for_signal(),
        server_config.shutdown_timeout(),
    )
    .await
}

/// Serves `app` on `listener` until `signal` resolves and the connections
/// drain, or `drain_timeout` elapses after the signal.
async fn run<S>(
    listener: TcpListener,
    app: Router,
    signal: S,
    drain_timeout: Duration,
) -> Result<()>
where
    S: Future<Output = ShutdownReason> + Send + 'static,
{
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = ?listener.local_addr().ok(),
        "Server is ready and listening for connections"
    );

    let start_time = Instant::now();
    let (graceful, deadline) = drain_deadline(signal, drain_timeout);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .into_future();

    tokio::select! {
        served = server => served.map_err(|err| {
            let err = ServerError::Runtime(err);
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                uptime_secs = start_time.elapsed().as_secs(),
                suggestion = err.suggestion(),
                "Server encountered an error"
            );
            err
        })?,
        () = deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                drain_timeout_secs = drain_timeout.as_secs_f64(),
                "Drain timeout elapsed, dropping remaining connections"
            );
        }
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        uptime_secs = start_time.elapsed().as_secs(),
        "Shutdown completed"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn invalid_config_is_rejected_before_binding() {
        let config = ServerConfig {
            port: 80,
            ..ServerConfig::default()
        };

        let err = serve(Router::new(), config).await.unwrap_err();
        assert!(matches!(err, ServerError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn stuck_request_is_dropped_after_drain_timeout() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let app = Router::new().route("/stuck", get(std::future::pending::<()>));

        let (trigger, triggered) = oneshot::channel();
        let signal = async move {
            let _ = triggered.await;
            ShutdownReason::Interrupt
        };
        let server = tokio::spawn(run(listener, app, signal, Duration::from_millis(50)));

        let mut client = TcpStream::connect(address).await?;
        client
            .write_all(b"GET /stuck HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await?;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let _ = trigger.send(());
        let finished = tokio::time::timeout(Duration::from_secs(5), server).await;
        assert!(matches!(finished, Ok(Ok(Ok(())))));
        Ok(())
    }

    #[tokio::test]
    async fn idle_server_stops_on_signal() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let (trigger, triggered) = oneshot::channel();
        let signal = async move {
            let _ = triggered.await;
            ShutdownReason::Terminate
        };
        let server = tokio::spawn(run(
            listener,
            Router::new(),
            signal,
            Duration::from_secs(60),
        ));

        let _ = trigger.send(());
        let finished = tokio::time::timeout(Duration::from_secs(5), server).await;
        assert!(matches!(finished, Ok(Ok(Ok(())))));
        Ok(())
    }
}
