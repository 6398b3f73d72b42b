//! Minimal HTTP/1.1 client used to relay requests into a unit.
//!
//! One connection per request: a unit is addressed by socket address rather
//! than by URL, and the request must reach it byte-for-byte, so this talks to
//! hyper's connection API directly instead of going through a pooled client.

use std::net::SocketAddr;

use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderValue, HOST};
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::{ProxyRequest, ProxyResponse};

/// Send `request` to the unit listening on `addr` and buffer its response.
///
/// Method, target, headers and body are sent as given. A `Host` header is
/// added only when the request carries none.
///
/// # Errors
/// Returns a description of the connection, handshake or transfer failure.
pub(crate) async fn send(addr: SocketAddr, request: ProxyRequest) -> Result<ProxyResponse, String> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| format!("connect to {addr}: {e}"))?;

    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| format!("HTTP handshake: {e}"))?;

    // Drive the connection in the background.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!(%addr, "unit connection closed: {e}");
        }
    });

    let mut builder = Request::builder()
        .method(request.method.clone())
        .uri(request.path_and_query());

    let ProxyRequest { headers: request_headers, body: request_body, .. } = request;

    if let Some(headers) = builder.headers_mut() {
        headers.extend(request_headers);
        if !headers.contains_key(HOST) {
            let host = HeaderValue::from_str(&addr.to_string())
                .map_err(|e| format!("host header for {addr}: {e}"))?;
            headers.insert(HOST, host);
        }
    }

    let req = builder
        .body(Full::new(request_body))
        .map_err(|e| format!("build request: {e}"))?;

    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| format!("send request: {e}"))?;

    let (parts, body) = resp.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|e| format!("read response body: {e}"))?
        .to_bytes();

    Ok(ProxyResponse::new(parts.status, body).with_headers(parts.headers))
}
