//! Speed-test Backend Handlers
//!
//! Endpoints driven by the browser speed test: client IP echo, an upload
//! sink, a random download payload and the final result report.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Query, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{stream, StreamExt};

use crate::application::dto::request::{BackendQuery, GarbageQuery, TelemetryRequest};
use crate::application::dto::response::{ClientIpResponse, StatusResponse};
use crate::presentation::http::extractors::AppJson;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Size of the pre-generated random chunk served by `/backend/garbage`.
pub const GARBAGE_CHUNK_SIZE: usize = 1024 * 1024;

const NO_CACHE: &str = "no-store, no-cache, must-revalidate, max-age=0, s-maxage=0";

/// Headers consulted for the client address, most trusted first.
const CLIENT_IP_HEADERS: [&str; 3] = ["client-ip", "x-real-ip", "x-forwarded-for"];

fn no_cache_headers(headers: &mut HeaderMap) {
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
}

fn permissive_cors_headers(headers: &mut HeaderMap, allow_headers: bool) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST"),
    );
    if allow_headers {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Encoding, Content-Type"),
        );
    }
}

/// Best guess at the client address: proxy headers first, then the peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    });

    let ip = forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "0.0.0.0".to_owned());

    ip.replace("::ffff:", "")
}

/// Echo the client's address
pub async fn get_ip(Query(query): Query<BackendQuery>, request: Request) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer);

    let mut response = Json(ClientIpResponse::new(ip)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    no_cache_headers(headers);
    if query.cors.is_some() {
        permissive_cors_headers(headers, false);
    }
    response
}

/// Accept and discard an upload
pub async fn empty(Query(query): Query<BackendQuery>, body: Body) -> Response {
    let mut received = 0usize;
    let mut chunks = body.into_data_stream();
    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(bytes) => received += bytes.len(),
            Err(e) => {
                tracing::trace!(error = %e, received, "Upload aborted by client");
                break;
            }
        }
    }
    tracing::trace!(received, "Upload drained");

    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    no_cache_headers(headers);
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    if query.cors.is_some() {
        permissive_cors_headers(headers, true);
    }
    response
}

/// Stream `ckSize` copies of the random chunk
pub async fn garbage(State(state): State<AppState>, Query(query): Query<GarbageQuery>) -> Response {
    let chunks = query.chunks();
    let chunk: Bytes = state.garbage.clone();
    let total = chunk.len() * chunks;

    let body = Body::from_stream(stream::iter(
        std::iter::repeat(chunk)
            .take(chunks)
            .map(Ok::<_, Infallible>),
    ));

    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=random.dat"),
    );
    headers.insert(
        "content-description",
        HeaderValue::from_static("File Transfer"),
    );
    headers.insert(
        "content-transfer-encoding",
        HeaderValue::from_static("binary"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(total));
    no_cache_headers(headers);
    if query.cors.is_some() {
        permissive_cors_headers(headers, false);
    }
    response
}

/// Accept the final result report of a browser speed test
pub async fn telemetry(
    AppJson(body): AppJson<TelemetryRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let report = body
        .parse()
        .ok_or_else(|| AppError::BadRequest("Invalid data format".into()))?;

    tracing::info!(
        download = report.download,
        upload = report.upload,
        ping = report.ping,
        jitter = report.jitter,
        "Telemetry received"
    );

    Ok(Json(StatusResponse { status: "success" }))
}
