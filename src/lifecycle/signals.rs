//! OS signal handling.

use tracing::info;

use crate::lifecycle::shutdown::Shutdown;

/// Resolve on Ctrl+C, SIGTERM (unix) or an internal trigger.
pub async fn wait_for_shutdown(shutdown: &Shutdown) {
    let mut triggered = shutdown.subscribe();

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl+c, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
        _ = triggered.recv() => info!("shutdown triggered"),
    }

    shutdown.trigger();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_internal_trigger_resolves() {
        let shutdown = Shutdown::new();
        let waiter = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { wait_for_shutdown(&shutdown).await })
        };
        tokio::task::yield_now().await;
        while shutdown.receiver_count() == 0 {
            tokio::task::yield_now().await;
        }
        shutdown.trigger();
        assert!(waiter.await.is_ok());
    }
}
