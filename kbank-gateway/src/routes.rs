//! Axum router for the Kbank edge.
//!
//! Every `GET` and `POST`, on any path, is relayed verbatim to the execution
//! unit resolved for the configured binding.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    response::Response,
    routing::get,
    Router,
};
use kbank_core::Binding;
use kbank_executor::{ProxyRequest, ProxyResponse, Resolve};
use tower_http::trace::TraceLayer;

use crate::error::GatewayError;

// ── Shared state ─────────────────────────────────────────────────────────────

/// State shared by all relay handlers.
#[derive(Clone)]
pub struct AppState {
    /// Resolves the binding to a forwarder on every request.
    pub resolver: Arc<dyn Resolve>,
    /// The binding all traffic is sent to.
    pub binding: Binding,
}

impl AppState {
    /// Create state relaying to `binding` through `resolver`.
    pub fn new(resolver: Arc<dyn Resolve>, binding: Binding) -> Self {
        Self { resolver, binding }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the edge router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(relay).post(relay))
        .route("/{*path}", get(relay).post(relay))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET|POST /*`: resolve the unit and relay the request to it.
///
/// Exactly one resolution and one forward happen per request. The unit's
/// status, headers and body are returned as-is.
///
/// The body is buffered up to [`MAX_BODY_BYTES`]; a larger body fails before
/// the unit is resolved.
///
/// # Errors
/// Returns [`GatewayError`] if the body cannot be read, the binding cannot be
/// resolved, or forwarding fails. Nothing is retried.
pub async fn relay(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, GatewayError> {
    let request = into_proxy_request(request).await?;
    let forwarder = state.resolver.resolve(&state.binding).await?;
    let response = forwarder.forward(request).await?;
    from_proxy_response(response)
}

// ── Conversions ───────────────────────────────────────────────────────────────

/// Largest request body buffered for relay, matching axum's default body limit.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

async fn into_proxy_request(request: Request) -> Result<ProxyRequest, GatewayError> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::Body(e.to_string()))?;
    Ok(ProxyRequest::new(parts.method, parts.uri)
        .with_headers(parts.headers)
        .with_body(body))
}

fn from_proxy_response(response: ProxyResponse) -> Result<Response, GatewayError> {
    let mut builder = axum::http::Response::builder().status(response.status);
    if let Some(headers) = builder.headers_mut() {
        *headers = response.headers;
    }
    builder
        .body(Body::from(response.body))
        .map_err(|e| GatewayError::Response(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::http::{HeaderValue, Method, StatusCode};
    use kbank_executor::{ExecutorError, Forward};
    use tower::ServiceExt;

    use super::*;

    /// Records every call and answers with a fixed response.
    #[derive(Default)]
    struct Recorder {
        resolves: AtomicUsize,
        forwards: AtomicUsize,
        seen: Mutex<Vec<ProxyRequest>>,
        fail_resolve: bool,
    }

    struct RecordingForwarder(Arc<Recorder>);

    #[async_trait]
    impl Forward for RecordingForwarder {
        async fn forward(&self, request: ProxyRequest) -> Result<ProxyResponse, ExecutorError> {
            self.0.forwards.fetch_add(1, Ordering::SeqCst);
            let body = request.body.clone();
            match self.0.seen.lock() {
                Ok(mut seen) => seen.push(request),
                Err(e) => panic!("recorder poisoned: {e}"),
            }
            let mut headers = axum::http::HeaderMap::new();
            headers.insert("x-unit", HeaderValue::from_static("kbank"));
            headers.append("set-cookie", HeaderValue::from_static("a=1"));
            headers.append("set-cookie", HeaderValue::from_static("b=2"));
            Ok(ProxyResponse::new(StatusCode::CREATED, body).with_headers(headers))
        }
    }

    struct RecordingResolver(Arc<Recorder>);

    #[async_trait]
    impl Resolve for RecordingResolver {
        async fn resolve(&self, binding: &Binding) -> Result<Arc<dyn Forward>, ExecutorError> {
            self.0.resolves.fetch_add(1, Ordering::SeqCst);
            if self.0.fail_resolve {
                return Err(ExecutorError::UnknownBinding(binding.clone()));
            }
            Ok(Arc::new(RecordingForwarder(Arc::clone(&self.0))))
        }
    }

    fn app(recorder: &Arc<Recorder>) -> Router {
        let binding = match Binding::new("KBANK_CONTAINER") {
            Ok(b) => b,
            Err(e) => panic!("valid binding: {e}"),
        };
        create_router(AppState::new(
            Arc::new(RecordingResolver(Arc::clone(recorder))),
            binding,
        ))
    }

    async fn send(app: Router, req: axum::http::Request<Body>) -> Response {
        match app.oneshot(req).await {
            Ok(r) => r,
            Err(e) => panic!("handler error: {e}"),
        }
    }

    fn request(method: Method, uri: &str, body: &'static [u8]) -> axum::http::Request<Body> {
        match axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header("x-client", "bot")
            .header("content-type", "application/json")
            .body(Body::from(body))
        {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        }
    }

    #[tokio::test]
    async fn relay_resolves_and_forwards_exactly_once_per_request() {
        for (method, uri) in [
            (Method::GET, "/"),
            (Method::GET, "/health"),
            (Method::POST, "/transactions"),
            (Method::POST, "/a/b/c?d=e"),
        ] {
            let recorder = Arc::new(Recorder::default());
            let resp = send(app(&recorder), request(method.clone(), uri, b"{}")).await;
            assert_eq!(resp.status(), StatusCode::CREATED, "{method} {uri} must be relayed");
            assert_eq!(recorder.resolves.load(Ordering::SeqCst), 1, "{method} {uri}: one resolve");
            assert_eq!(recorder.forwards.load(Ordering::SeqCst), 1, "{method} {uri}: one forward");
        }
    }

    #[tokio::test]
    async fn relay_passes_request_through_unchanged() {
        let recorder = Arc::new(Recorder::default());
        let body: &'static [u8] = br#"{"amount":120.5,"title":"Lunch"}"#;
        let resp = send(app(&recorder), request(Method::POST, "/tx/new?src=line", body)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let seen = match recorder.seen.lock() {
            Ok(seen) => seen.clone(),
            Err(e) => panic!("recorder poisoned: {e}"),
        };
        assert_eq!(seen.len(), 1);
        let forwarded = &seen[0];
        assert_eq!(forwarded.method, Method::POST);
        assert_eq!(forwarded.path_and_query(), "/tx/new?src=line");
        assert_eq!(forwarded.headers["x-client"], "bot");
        assert_eq!(forwarded.headers["content-type"], "application/json");
        assert_eq!(&forwarded.body[..], body);
    }

    #[tokio::test]
    async fn relay_returns_unit_response_unchanged() {
        let recorder = Arc::new(Recorder::default());
        let resp = send(app(&recorder), request(Method::POST, "/echo", b"ping")).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()["x-unit"], "kbank");
        let cookies: Vec<_> = resp.headers().get_all("set-cookie").iter().collect();
        assert_eq!(cookies, ["a=1", "b=2"], "repeated response headers must survive");
        let bytes = match axum::body::to_bytes(resp.into_body(), 1024).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        assert_eq!(&bytes[..], b"ping");
    }

    #[tokio::test]
    async fn relay_rejects_other_methods() {
        let recorder = Arc::new(Recorder::default());
        let resp = send(app(&recorder), request(Method::DELETE, "/transactions/1", b"")).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(recorder.resolves.load(Ordering::SeqCst), 0, "nothing must be resolved");
    }

    #[tokio::test]
    async fn relay_resolution_failure_is_500_without_forward() {
        let recorder = Arc::new(Recorder { fail_resolve: true, ..Recorder::default() });
        let resp = send(app(&recorder), request(Method::GET, "/", b"")).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(recorder.resolves.load(Ordering::SeqCst), 1, "no retry on failure");
        assert_eq!(recorder.forwards.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn relay_oversized_body_fails_before_resolve() {
        let recorder = Arc::new(Recorder::default());
        let req = match axum::http::Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .body(Body::from(vec![0u8; MAX_BODY_BYTES + 1]))
        {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let resp = send(app(&recorder), req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(recorder.resolves.load(Ordering::SeqCst), 0, "no unit for a rejected body");
    }

    #[tokio::test]
    async fn relay_accepts_body_at_limit() {
        let recorder = Arc::new(Recorder::default());
        let req = match axum::http::Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .body(Body::from(vec![7u8; MAX_BODY_BYTES]))
        {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let resp = send(app(&recorder), req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(recorder.forwards.load(Ordering::SeqCst), 1);
    }

    proptest::proptest! {
        #[test]
        fn proptest_relay_preserves_body_and_header(
            body in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..2048usize),
            header in "[ -~]{0,64}",
        ) {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => panic!("runtime: {e}"),
            };
            let recorder = Arc::new(Recorder::default());
            let req = match axum::http::Request::builder()
                .method(Method::POST)
                .uri("/blob")
                .header("x-memo", header.as_str())
                .body(Body::from(body.clone()))
            {
                Ok(r) => r,
                Err(e) => panic!("failed to build request: {e}"),
            };
            let resp = runtime.block_on(send(app(&recorder), req));
            proptest::prop_assert_eq!(resp.status(), StatusCode::CREATED);

            let seen = match recorder.seen.lock() {
                Ok(seen) => seen.clone(),
                Err(e) => panic!("recorder poisoned: {e}"),
            };
            proptest::prop_assert_eq!(&seen[0].body[..], &body[..]);
            proptest::prop_assert_eq!(seen[0].headers["x-memo"].as_bytes(), header.as_bytes());
        }
    }
}
