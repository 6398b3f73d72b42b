//! Error types for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Errors that can occur while relaying a request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// Resolving the unit or forwarding to it failed.
    #[error("executor error: {0}")]
    Executor(#[from] kbank_executor::ExecutorError),

    /// The inbound request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(String),

    /// The unit's response could not be turned into an HTTP response.
    #[error("invalid unit response: {0}")]
    Response(String),
}

impl IntoResponse for GatewayError {
    /// No retry, no structured body: every failure is the plain default 500.
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "relay failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
