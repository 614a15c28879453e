//! Upstream Relay Handler
//!
//! Forwards every inbound request to the configured upstream host: method
//! and body pass through, request headers are filtered to a fixed
//! allow-list with oversized values truncated, and the upstream
//! status/headers/body are relayed back. The body is fully buffered on
//! both legs, so the hop-by-hop `transfer-encoding` header is dropped from
//! upstream responses. Failures surface as a JSON error body: 502 when the
//! upstream call fails, 500 when the inbound request cannot be read.

use crate::state::AppState;
use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

/// Request headers forwarded to the upstream; everything else is dropped.
const ALLOWED_REQUEST_HEADERS: [&str; 7] = [
    "content-type",
    "content-length",
    "accept",
    "accept-encoding",
    "accept-language",
    "user-agent",
    "authorization",
];

/// Individual header values longer than this are truncated.
const MAX_HEADER_VALUE_LEN: usize = 1024;

#[derive(Debug, thiserror::Error)]
enum RelayError {
    #[error("Failed to read request body: {0}")]
    Body(#[from] axum::Error),
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl RelayError {
    fn status(&self) -> StatusCode {
        match self {
            RelayError::Body(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Fallback handler: relays the request to the upstream.
pub async fn relay(State(state): State<AppState>, request: Request) -> Response {
    match forward(&state, request).await {
        Ok(response) => response,
        Err(relay_error) => {
            error!(%relay_error, "Relay failed");
            error_response(relay_error.status(), &relay_error.to_string())
        }
    }
}

async fn forward(state: &AppState, request: Request) -> Result<Response, RelayError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", state.upstream_base_url, path_and_query);

    let headers = filter_request_headers(&parts.headers);
    let body = axum::body::to_bytes(body, usize::MAX).await?;
    debug!(method = %parts.method, %url, body_len = body.len(), "Relaying request");

    let upstream = state
        .http
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    // The relayed body is re-buffered, so any upstream chunked framing no
    // longer applies.
    response_headers.remove(header::TRANSFER_ENCODING);
    let body = upstream.bytes().await?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}

/// Keeps only allow-listed request headers, truncating oversized values.
fn filter_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for (name, value) in headers {
        if !ALLOWED_REQUEST_HEADERS.contains(&name.as_str()) {
            continue;
        }
        let bytes = value.as_bytes();
        if bytes.len() > MAX_HEADER_VALUE_LEN {
            // Header values are valid per byte, so any prefix stays valid.
            if let Ok(truncated) = HeaderValue::from_bytes(&bytes[..MAX_HEADER_VALUE_LEN]) {
                filtered.append(name, truncated);
            }
        } else {
            filtered.append(name, value.clone());
        }
    }
    filtered
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderName;

    #[test]
    fn only_allow_listed_headers_survive() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer token"));
        headers.insert(header::HOST, HeaderValue::from_static("proxy.example.com"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=abc"));
        headers.insert(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("10.0.0.1"),
        );

        let filtered = filter_request_headers(&headers);
        assert_eq!(filtered.len(), 2);
        assert_eq!(
            filtered.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(filtered.get(header::AUTHORIZATION).unwrap(), "Bearer token");
        assert!(filtered.get(header::HOST).is_none());
        assert!(filtered.get(header::COOKIE).is_none());
    }

    #[test]
    fn oversized_header_values_are_truncated() {
        let long_value = "a".repeat(MAX_HEADER_VALUE_LEN + 100);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&long_value).unwrap(),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));

        let filtered = filter_request_headers(&headers);
        assert_eq!(
            filtered.get(header::AUTHORIZATION).unwrap().as_bytes().len(),
            MAX_HEADER_VALUE_LEN
        );
        // Values at or under the limit pass through untouched.
        assert_eq!(filtered.get(header::ACCEPT).unwrap(), "*/*");
    }

    #[tokio::test]
    async fn error_response_carries_a_json_message() {
        let response = error_response(StatusCode::BAD_GATEWAY, "Upstream request failed");
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["message"], "Upstream request failed");
    }

    #[tokio::test]
    async fn unreachable_upstream_becomes_bad_gateway() {
        // Port 1 is never listening; the request fails at connect time.
        let state = AppState::new(reqwest::Client::new(), "http://127.0.0.1:1");
        let request = Request::builder()
            .method("POST")
            .uri("/api/run")
            .body(Body::from("{}"))
            .unwrap();

        let response = relay(State(state), request).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
