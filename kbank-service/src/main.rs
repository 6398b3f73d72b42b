//! Entry point for the `kbank-service` backing server.

use kbank_service::{BackingServer, ServiceConfig, ServiceError, ShutdownSignals};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "kbank-service failed");
        std::process::exit(1);
    }

    // Exit without waiting on connection tasks still running in the runtime.
    std::process::exit(0);
}

async fn run() -> Result<(), ServiceError> {
    let config = ServiceConfig::from_env()?;
    let signals = ShutdownSignals::install().map_err(ServiceError::Signal)?;

    let server = BackingServer::new(config);
    let signal = server.run(signals.recv()).await?;

    info!(%signal, state = %server.state(), "kbank-service exiting");
    Ok(())
}
