//! Backing service configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Environment variable holding the listening port.
pub const PORT_ENV: &str = "PORT";

/// Errors raised while building a [`ServiceConfig`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// `PORT` is not set.
    #[error("PORT is not set")]
    MissingPort,

    /// `PORT` is set but is not a valid TCP port.
    #[error("invalid PORT={value:?}: {reason}")]
    InvalidPort { value: String, reason: String },
}

/// Validated backing service configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct ServiceConfig {
    /// Interface to bind; all interfaces so the unit is reachable from its host.
    pub host: IpAddr,
    /// Port to bind, from `PORT`.
    pub port: u16,
}

impl ServiceConfig {
    /// Create a config listening on all interfaces at `port`.
    #[must_use]
    pub fn new(port: u16) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port,
        }
    }

    /// Build the config from process environment variables.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingPort`] if `PORT` is unset, or
    /// [`ConfigError::InvalidPort`] if it does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingPort`] if `PORT` is unset, or
    /// [`ConfigError::InvalidPort`] if it does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = lookup(PORT_ENV).ok_or(ConfigError::MissingPort)?;
        let port = value
            .trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidPort {
                value: value.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(port))
    }

    /// The socket address to bind.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
