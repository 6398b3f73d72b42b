//! Execution unit lifecycle and request forwarding for the Kbank edge.
//!
//! Resolves a binding to an isolated backing process, starting it on first
//! use, and relays requests to it unchanged.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
mod client;
pub mod config;
pub mod error;
pub mod forward;
pub mod handle;
pub mod message;
pub mod process;
pub mod resolver;

pub use backend::UnitBackend;
pub use config::{UnitConfig, DEFAULT_UNIT_PORT, PORT_ENV};
pub use error::ExecutorError;
pub use forward::{Forward, UnitForwarder};
pub use handle::UnitHandle;
pub use message::{ProxyRequest, ProxyResponse};
pub use process::ProcessBackend;
pub use resolver::{derive_unit_id, Resolve, UnitResolver};
