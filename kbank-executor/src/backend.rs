//! Execution unit backend abstraction trait.
//!
//! Allows swapping the local process runtime for a container or sandbox
//! runtime without changing the resolution logic.

use async_trait::async_trait;
use kbank_core::Binding;

use crate::{ExecutorError, UnitConfig, UnitHandle};

/// Runtime that starts and stops execution units.
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Cancel Safety
/// `spawn` is cancel safe: a unit whose start is abandoned is killed when its
/// process handle drops.
#[async_trait]
pub trait UnitBackend: Send + Sync {
    /// Start a unit for `binding` and wait until it accepts connections.
    ///
    /// # Errors
    /// Returns [`ExecutorError::BinaryNotFound`] if the program does not exist.
    /// Returns [`ExecutorError::SpawnFailed`] if the process cannot be started
    /// or does not become ready.
    async fn spawn(&self, config: &UnitConfig, binding: &Binding)
        -> Result<UnitHandle, ExecutorError>;

    /// Stop a running unit and clean up its resources.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Io`] if the process cannot be killed.
    async fn terminate(&self, handle: UnitHandle) -> Result<(), ExecutorError>;

    /// Check whether the backend can start the given unit.
    ///
    /// # Errors
    /// Returns [`ExecutorError::BinaryNotFound`] if the program is missing.
    async fn health_check(&self, config: &UnitConfig) -> Result<(), ExecutorError>;
}
