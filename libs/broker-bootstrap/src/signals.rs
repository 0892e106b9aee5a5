use anyhow::Result;
use tokio::signal;

/// Wait for a termination signal (Ctrl+C, SIGTERM).
pub async fn wait_for_shutdown() -> Result<()> {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(%e, "failed to install Ctrl+C handler");
            return Err(e);
        }
        Ok(())
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut handler) => {
                handler.recv().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(%e, "failed to install SIGTERM handler");
                Err(e)
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = async { Ok::<(), std::io::Error>(()) };

    tokio::select! {
        result = ctrl_c => {
            result?;
            tracing::info!("received Ctrl+C");
        },
        result = terminate => {
            result?;
            tracing::info!("received SIGTERM");
        },
    }

    tracing::info!("shutdown signal received, stopping");
    Ok(())
}
