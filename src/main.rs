use homeguard::api;
use homeguard::startup::{build_gate, GateConfig};

use color_eyre::Result;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("homeguard v{} starting", VERSION);

    let config = GateConfig::from_env()?;
    let gate = build_gate(&config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = gate.sweeper().spawn(shutdown_rx);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    let served = api::serve(listener, gate, shutdown_signal()).await;

    // Stop scheduling sweeps; one already running finishes first.
    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper.await {
        tracing::error!("Sweeper task failed: {}", e);
    }

    served?;
    tracing::info!("homeguard stopped");
    Ok(())
}
