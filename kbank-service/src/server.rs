//! The backing service server object.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::lifecycle::{Lifecycle, ServiceState};
use crate::routes::create_router;
use crate::signal::ShutdownSignal;

/// A backing service instance owning its listener and lifecycle.
///
/// Constructed once at process entry from a validated [`ServiceConfig`], so
/// configuration errors surface before any socket is bound.
#[derive(Debug)]
pub struct BackingServer {
    config: ServiceConfig,
    lifecycle: Lifecycle,
}

impl BackingServer {
    /// Create a server in [`ServiceState::Starting`].
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::new(),
        }
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ServiceState {
        self.lifecycle.state()
    }

    /// Observe lifecycle transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ServiceState> {
        self.lifecycle.subscribe()
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    ///
    /// When `shutdown` resolves the server stops at once. In-flight requests
    /// are not drained.
    ///
    /// # Errors
    /// Returns [`ServiceError::Bind`] if the address cannot be bound, or
    /// [`ServiceError::Serve`] if the server fails while listening.
    pub async fn run<F>(&self, shutdown: F) -> Result<ShutdownSignal, ServiceError>
    where
        F: Future<Output = ShutdownSignal>,
    {
        let addr = self.config.listen_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServiceError::Bind { addr, source })?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// # Errors
    /// Returns [`ServiceError::Serve`] if the server fails while listening.
    pub async fn serve<F>(
        &self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<ShutdownSignal, ServiceError>
    where
        F: Future<Output = ShutdownSignal>,
    {
        let addr: Option<SocketAddr> = listener.local_addr().ok();
        self.lifecycle.advance(ServiceState::Listening);
        info!(addr = ?addr, "kbank-service listening");

        let result = tokio::select! {
            res = axum::serve(listener, create_router()).into_future() => {
                // `axum::serve` only returns on a listener failure.
                Err(ServiceError::Serve(match res {
                    Ok(()) => std::io::Error::other("server stopped unexpectedly"),
                    Err(e) => e,
                }))
            }
            signal = shutdown => {
                self.lifecycle.advance(ServiceState::ShuttingDown);
                info!(%signal, "shutdown signal received");
                Ok(signal)
            }
        };

        self.lifecycle.advance(ServiceState::Terminated);
        result
    }
}
