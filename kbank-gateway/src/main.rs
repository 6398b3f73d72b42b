//! Entry point for the `kbank-gateway` HTTP server.

use std::sync::Arc;

use kbank_executor::{ProcessBackend, UnitBackend, UnitResolver};
use kbank_gateway::{
    config::GatewayConfig,
    routes::{create_router, AppState},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match GatewayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let backend = ProcessBackend::with_defaults();
    if let Err(e) = backend.health_check(&config.unit).await {
        tracing::warn!(
            binding = %config.binding,
            error = %e,
            "unit program unavailable; requests will fail until it is installed"
        );
    }

    let resolver =
        UnitResolver::new(backend).with_binding(config.binding.clone(), config.unit.clone());
    let app = create_router(AppState::new(Arc::new(resolver), config.binding.clone()));

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %config.listen_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %config.listen_addr, binding = %config.binding, "kbank-gateway listening");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("kbank-gateway shutting down");
    };

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
