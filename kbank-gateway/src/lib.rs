//! HTTP edge router for the Kbank bank container.
//!
//! Accepts `GET` and `POST` on every path and relays each request, untouched,
//! to the execution unit resolved for the configured binding.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod routes;
