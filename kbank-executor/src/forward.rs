//! Forwarding capability handed out by the resolver.

use std::net::SocketAddr;

use async_trait::async_trait;
use kbank_core::UnitId;

use crate::{client, ExecutorError, ProxyRequest, ProxyResponse};

/// Relays a request to one resolved execution unit.
#[async_trait]
pub trait Forward: Send + Sync {
    /// Send `request` to the unit and return its response unmodified.
    ///
    /// # Errors
    /// Returns [`ExecutorError::ForwardFailed`] if the unit cannot be reached
    /// or the exchange breaks off.
    async fn forward(&self, request: ProxyRequest) -> Result<ProxyResponse, ExecutorError>;
}

/// Forwarder bound to a unit's HTTP address.
///
/// No timeout is applied: a unit that never answers stalls the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitForwarder {
    unit_id: UnitId,
    addr: SocketAddr,
}

impl UnitForwarder {
    /// Create a forwarder for the unit `unit_id` listening on `addr`.
    #[must_use]
    pub fn new(unit_id: UnitId, addr: SocketAddr) -> Self {
        Self { unit_id, addr }
    }

    /// The unit this forwarder is bound to.
    #[must_use]
    pub fn unit_id(&self) -> UnitId {
        self.unit_id
    }

    /// The unit's address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

#[async_trait]
impl Forward for UnitForwarder {
    async fn forward(&self, request: ProxyRequest) -> Result<ProxyResponse, ExecutorError> {
        tracing::debug!(
            unit_id = %self.unit_id,
            method = %request.method,
            target = request.path_and_query(),
            "forwarding request"
        );
        client::send(self.addr, request)
            .await
            .map_err(|reason| ExecutorError::ForwardFailed {
                unit_id: self.unit_id,
                reason,
            })
    }
}
