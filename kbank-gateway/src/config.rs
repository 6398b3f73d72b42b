//! Gateway configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use kbank_core::{Binding, CoreError};
use kbank_executor::{UnitConfig, DEFAULT_UNIT_PORT};

/// Address the gateway listens on when `KBANK_LISTEN_ADDR` is unset.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8787";

/// Binding resolved when `KBANK_BINDING` is unset.
pub const DEFAULT_BINDING: &str = "KBANK_CONTAINER";

/// Unit program started when `KBANK_UNIT_BIN` is unset.
pub const DEFAULT_UNIT_BIN: &str = "kbank-service";

/// Errors raised while building a [`GatewayConfig`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A variable was set to a value that does not parse.
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// The binding name was rejected.
    #[error(transparent)]
    Binding(#[from] CoreError),
}

/// Validated gateway configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// Public listening address.
    pub listen_addr: SocketAddr,
    /// Binding every request is forwarded to.
    pub binding: Binding,
    /// How to start the unit behind `binding`.
    pub unit: UnitConfig,
}

impl GatewayConfig {
    /// Build the config from process environment variables.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if any variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if any variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = lookup("KBANK_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());
        let listen_addr = listen_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "KBANK_LISTEN_ADDR",
                value: listen_addr.clone(),
                reason: e.to_string(),
            })?;

        let binding = Binding::new(lookup("KBANK_BINDING").unwrap_or_else(|| DEFAULT_BINDING.to_owned()))?;

        let program = lookup("KBANK_UNIT_BIN").map_or_else(|| PathBuf::from(DEFAULT_UNIT_BIN), PathBuf::from);

        let port = match lookup("KBANK_UNIT_PORT") {
            None => DEFAULT_UNIT_PORT,
            Some(value) => value.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "KBANK_UNIT_PORT",
                value: value.clone(),
                reason: e.to_string(),
            })?,
        };

        Ok(Self {
            listen_addr,
            binding,
            unit: UnitConfig::new(program).with_port(port),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn gateway_config_defaults_when_unset() {
        let config = match GatewayConfig::from_lookup(lookup_from(&[])) {
            Ok(c) => c,
            Err(e) => panic!("defaults must be valid: {e}"),
        };
        assert_eq!(config.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
        assert_eq!(config.binding.as_str(), DEFAULT_BINDING);
        assert_eq!(config.unit.program, PathBuf::from(DEFAULT_UNIT_BIN));
        assert_eq!(config.unit.port, DEFAULT_UNIT_PORT);
    }

    #[test]
    fn gateway_config_reads_overrides() {
        let config = match GatewayConfig::from_lookup(lookup_from(&[
            ("KBANK_LISTEN_ADDR", "0.0.0.0:9000"),
            ("KBANK_BINDING", "KBANK_STAGING"),
            ("KBANK_UNIT_BIN", "/opt/kbank/bin/kbank-service"),
            ("KBANK_UNIT_PORT", "18080"),
        ])) {
            Ok(c) => c,
            Err(e) => panic!("overrides must be valid: {e}"),
        };
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.binding.as_str(), "KBANK_STAGING");
        assert_eq!(config.unit.program, PathBuf::from("/opt/kbank/bin/kbank-service"));
        assert_eq!(config.unit.port, 18080);
    }

    #[test]
    fn gateway_config_rejects_bad_values() {
        let bad_addr = GatewayConfig::from_lookup(lookup_from(&[("KBANK_LISTEN_ADDR", "nowhere")]));
        assert!(matches!(bad_addr, Err(ConfigError::Invalid { var: "KBANK_LISTEN_ADDR", .. })));

        let bad_port = GatewayConfig::from_lookup(lookup_from(&[("KBANK_UNIT_PORT", "70000")]));
        assert!(matches!(bad_port, Err(ConfigError::Invalid { var: "KBANK_UNIT_PORT", .. })));

        let bad_binding = GatewayConfig::from_lookup(lookup_from(&[("KBANK_BINDING", "")]));
        assert!(matches!(bad_binding, Err(ConfigError::Binding(_))));
    }
}
