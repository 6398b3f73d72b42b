//! Error types for the executor crate.

use std::path::PathBuf;

use kbank_core::{Binding, UnitId};

/// Errors that can occur while resolving, running or forwarding to a unit.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// Unit program not found at the configured path or in `PATH`.
    #[error("unit program not found at {path}")]
    BinaryNotFound { path: PathBuf },

    /// Unit process failed to start or never became ready.
    #[error("unit spawn failed: {0}")]
    SpawnFailed(String),

    /// No unit configuration is registered for the binding.
    #[error("unknown binding: {0}")]
    UnknownBinding(Binding),

    /// Unit is not running.
    #[error("unit not found: {0}")]
    UnitNotFound(UnitId),

    /// Relaying a request to a unit failed.
    #[error("forward to unit {unit_id} failed: {reason}")]
    ForwardFailed { unit_id: UnitId, reason: String },

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
