//! Execution unit process configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Port every unit listens on unless configured otherwise.
pub const DEFAULT_UNIT_PORT: u16 = 8080;

/// Environment variable through which a unit learns its listening port.
pub const PORT_ENV: &str = "PORT";

/// Configuration for starting one execution unit process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct UnitConfig {
    /// Program to run (absolute path or a name looked up in `PATH`).
    pub program: PathBuf,

    /// Arguments passed to the program.
    pub args: Vec<String>,

    /// TCP port the unit listens on. Exported to the unit as `PORT`.
    pub port: u16,

    /// Extra environment variables. `PORT` is always overridden by `port`.
    pub env: BTreeMap<String, String>,
}

impl UnitConfig {
    /// Create a config for `program` listening on [`DEFAULT_UNIT_PORT`].
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            port: DEFAULT_UNIT_PORT,
            env: BTreeMap::new(),
        }
    }

    /// Set the listening port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Append an argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add an extra environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The full environment handed to the unit, with `PORT` derived from `port`.
    #[must_use]
    pub fn environment(&self) -> BTreeMap<String, String> {
        let mut env = self.env.clone();
        env.insert(PORT_ENV.to_owned(), self.port.to_string());
        env
    }
}
