//! Axum route handlers for the backing service.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

/// Body of both informational endpoints.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

/// Build the backing service router.
pub fn create_router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

/// `GET /`: identity of the service.
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, Json(MessageBody { message: "Kbank main" }))
}

/// `GET /health`: liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(MessageBody { message: "Kbank health" }))
}
