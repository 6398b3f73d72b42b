//! Framework-independent request and response values relayed to units.

use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::{Method, StatusCode, Uri};

/// An inbound request as relayed to an execution unit.
///
/// The body is opaque: it is never parsed or rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ProxyRequest {
    /// HTTP method.
    pub method: Method,
    /// Origin-form target (path and query).
    pub uri: Uri,
    /// Request headers, in their original order.
    pub headers: HeaderMap,
    /// Raw request body.
    pub body: Bytes,
}

impl ProxyRequest {
    /// Create a request with no headers and an empty body.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Replace the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// The path and query to send on the wire, `/` when the URI has no path.
    #[must_use]
    pub fn path_and_query(&self) -> &str {
        self.uri.path_and_query().map_or("/", |pq| pq.as_str())
    }
}

/// A unit's response, relayed back to the client unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ProxyResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers, in their original order.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Bytes,
}

impl ProxyResponse {
    /// Create a response with no headers.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Replace the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}
