//! Request forwarding to the backend chat service.
//!
//! One POST, three outcomes: the backend's JSON passed through verbatim
//! on success, the backend's status wrapped in an error envelope on a
//! non-success answer, and a 500 envelope when the backend cannot be
//! reached at all.

use axum::{
    Json,
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, error};

use crate::models::ErrorResponse;

/// Forward one chat message body to the backend chat endpoint.
///
/// `body` must already be the canonical `{"message"}` JSON; the caller
/// validates and re-encodes the inbound request before this point.
pub async fn forward_chat(client: &Client, upstream_url: &str, body: Bytes) -> Response {
    debug!("Forwarding chat message to {upstream_url}");

    let response = match client
        .post(upstream_url)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            error!("Failed to connect to backend server: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::unreachable(e.to_string())),
            )
                .into_response();
        }
    };

    let status = response.status();

    if !status.is_success() {
        error!("Backend server returned status: {status}");
        return (
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(ErrorResponse::backend_status(status.as_u16())),
        )
            .into_response();
    }

    // Pass the backend's JSON through verbatim.
    match response.bytes().await {
        Ok(body_bytes) => Response::builder()
            .status(StatusCode::OK)
            .header("content-type", "application/json")
            .body(Body::from(body_bytes))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            error!("Failed to read backend response: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::unreachable(e.to_string())),
            )
                .into_response()
        }
    }
}
