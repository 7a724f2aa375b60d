#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for SIGINT: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Wait for SIGTERM or SIGINT and return the name of whichever arrived first
pub async fn wait_for_signal() -> &'static str {
    #[cfg(unix)]
    {
        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => Some(term),
            Err(e) => {
                tracing::error!("Failed to register SIGTERM handler: {}", e);
                None
            }
        };

        tokio::select! {
            _ = ctrl_c() => "SIGINT",
            _ = async {
                match term.as_mut() {
                    Some(term) => {
                        term.recv().await;
                    }
                    None => std::future::pending::<()>().await,
                }
            } => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await;
        "SIGINT"
    }
}
