//! Process termination signals

/// Wait for Ctrl+C or (on unix) SIGTERM; returns a label for the log line
pub async fn wait_for_shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => "Received Ctrl+C signal",
                    _ = terminate.recv() => "Received SIGTERM",
                }
            }
            Err(_) => ctrl_c_only().await,
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c_only().await
    }
}

async fn ctrl_c_only() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "Received Ctrl+C signal",
        // No signal source; never resolve rather than report a phantom signal.
        Err(_) => std::future::pending().await,
    }
}
