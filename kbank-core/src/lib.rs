//! Core types for the Kbank edge.
//!
//! Defines the identifiers shared by the edge router, the execution unit
//! resolver and the backing service, plus the declared transaction record.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod id;
pub mod transaction;

pub use error::CoreError;
pub use id::{Binding, UnitId};
pub use transaction::{Currency, Transaction};
