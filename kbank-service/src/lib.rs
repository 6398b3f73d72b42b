//! Backing HTTP service run inside a Kbank execution unit.
//!
//! Serves a root and a health endpoint on the port given by `PORT` and exits
//! as soon as it receives `SIGTERM` or `SIGINT`.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod routes;
pub mod server;
pub mod signal;

pub use config::{ConfigError, ServiceConfig};
pub use error::ServiceError;
pub use lifecycle::ServiceState;
pub use server::BackingServer;
pub use signal::{ShutdownSignal, ShutdownSignals};
