//! Error types for the backing service.

use std::net::SocketAddr;

use crate::config::ConfigError;

/// Errors that stop the backing service.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// Configuration was missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Signal handlers could not be installed.
    #[error("failed to install signal handlers: {0}")]
    Signal(std::io::Error),

    /// The HTTP server stopped with an error.
    #[error("server error: {0}")]
    Serve(std::io::Error),
}
