//! Handle to a running execution unit process.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use kbank_core::{Binding, UnitId};

/// A handle to a running execution unit.
///
/// Dropping this handle kills the unit process (`kill_on_drop`). Call
/// [`UnitBackend::terminate`](crate::UnitBackend::terminate) to stop it and
/// wait for the exit.
#[derive(Debug)]
#[non_exhaustive]
pub struct UnitHandle {
    /// Identity derived from the binding.
    pub id: UnitId,

    /// The binding this unit serves.
    pub binding: Binding,

    /// Address the unit accepts HTTP connections on.
    pub addr: SocketAddr,

    /// The unit child process.
    pub process: tokio::process::Child,

    /// Timestamp when the unit was started.
    pub created_at: DateTime<Utc>,
}

impl UnitHandle {
    /// Create a new unit handle.
    #[must_use]
    pub fn new(
        id: UnitId,
        binding: Binding,
        addr: SocketAddr,
        process: tokio::process::Child,
    ) -> Self {
        Self {
            id,
            binding,
            addr,
            process,
            created_at: Utc::now(),
        }
    }
}
