//! Shutdown signals and the connection drain deadline.
//!
//! [`wait_for_signal`] resolves on the first SIGINT or SIGTERM. The future
//! returned by [`drain_deadline`] resolves once the signal has fired *and*
//! the drain timeout has elapsed; the server races it against the graceful
//! shutdown so in-flight connections cannot keep the process alive forever.

use std::future::{self, Future};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// What asked the server to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT or Ctrl+C.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl ShutdownReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::Interrupt => "interrupt",
            Self::Terminate => "terminate",
        }
    }
}

/// Resolves with the first shutdown signal received.
///
/// A handler that cannot be installed is logged and then never fires.
pub async fn wait_for_signal() -> ShutdownReason {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                "Failed to install Ctrl+C handler"
            );
            future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = interrupt => ShutdownReason::Interrupt,
        () = terminate() => ShutdownReason::Terminate,
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                "Failed to install SIGTERM handler"
            );
            future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    future::pending::<()>().await;
}

/// Splits `signal` into the future handed to
/// [`axum::serve::Serve::with_graceful_shutdown`] and a deadline that
/// resolves `timeout` after that future completed.
pub fn drain_deadline<S>(
    signal: S,
    timeout: Duration,
) -> (
    impl Future<Output = ()> + Send + 'static,
    impl Future<Output = ()> + Send + 'static,
)
where
    S: Future<Output = ShutdownReason> + Send + 'static,
{
    let (fired_tx, fired_rx) = oneshot::channel::<()>();

    let graceful = async move {
        let reason = signal.await;
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            reason = reason.as_str(),
            drain_timeout_secs = timeout.as_secs_f64(),
            "Shutdown signal received, draining connections"
        );
        let _ = fired_tx.send(());
    };

    let deadline = async move {
        // Dropped sender means the server ended without a signal.
        if fired_rx.await.is_err() {
            future::pending::<()>().await;
        }
        tokio::time::sleep(timeout).await;
    };

    (graceful, deadline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deadline_waits_for_the_signal() {
        let (trigger, triggered) = oneshot::channel();
        let signal = async move {
            let _ = triggered.await;
            ShutdownReason::Terminate
        };

        let (graceful, deadline) = drain_deadline(signal, Duration::from_millis(10));
        let graceful = tokio::spawn(graceful);
        tokio::pin!(deadline);

        let early = tokio::time::timeout(Duration::from_millis(100), &mut deadline).await;
        assert!(early.is_err());

        trigger.send(()).unwrap();
        graceful.await.unwrap();

        let fired = tokio::time::timeout(Duration::from_secs(5), &mut deadline).await;
        assert!(fired.is_ok());
    }

    #[tokio::test]
    async fn deadline_never_fires_without_a_signal() {
        let (graceful, deadline) =
            drain_deadline(future::pending::<ShutdownReason>(), Duration::ZERO);
        drop(graceful);

        let fired = tokio::time::timeout(Duration::from_millis(100), deadline).await;
        assert!(fired.is_err());
    }
}
