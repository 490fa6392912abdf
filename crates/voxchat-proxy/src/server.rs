//! Axum HTTP server for the same-origin chat proxy.
//!
//! The `serve()` function runs the proxy using a pre-bound `TcpListener`
//! until its cancellation token is triggered.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use reqwest::Client;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::forward::forward_chat;
use crate::models::{ChatProxyRequest, ErrorResponse};

/// Shared application state for the proxy server.
#[derive(Clone)]
struct AppState {
    /// HTTP client for forwarding requests to the backend.
    client: Client,
    /// Base address of the backend chat service.
    backend_base: String,
}

/// Build the proxy router against a backend base address.
///
/// Exposed so tests can drive the router in-process with `tower::oneshot`.
///
/// # Errors
///
/// Returns an error if the forwarding HTTP client cannot be constructed.
pub fn app(backend_base: impl Into<String>) -> anyhow::Result<Router> {
    let client = Client::builder().pool_max_idle_per_host(10).build()?;

    let state = AppState {
        client,
        backend_base: backend_base.into(),
    };

    Ok(Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat))
        .with_state(state))
}

/// Start the proxy server with a pre-bound listener.
///
/// # Arguments
///
/// * `listener` - Pre-bound TCP listener
/// * `backend_base` - Base address of the backend chat service
/// * `cancel` - Cancellation token for graceful shutdown
///
/// # Errors
///
/// Returns an error if the server fails to start or crashes.
pub async fn serve(
    listener: TcpListener,
    backend_base: String,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Chat proxy starting on {addr}");
    info!("Forwarding to backend at {backend_base}");

    let app = app(backend_base)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Chat proxy shut down");
    Ok(())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

/// Handle a chat message - validate, re-encode, and proxy to the backend.
async fn chat(State(state): State<AppState>, body: Bytes) -> Response {
    debug!("POST /api/chat");

    let request: ChatProxyRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            error!("Failed to parse request: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(e.to_string())),
            )
                .into_response();
        }
    };

    info!(chars = request.message.len(), "Processing chat message");

    // Re-encode the canonical single-field body for the backend.
    let upstream_body = match serde_json::to_vec(&request) {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            error!("Failed to encode upstream body: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::bad_request(e.to_string())),
            )
                .into_response();
        }
    };

    let upstream_url = format!("{}/chat", state.backend_base.trim_end_matches('/'));
    forward_chat(&state.client, &upstream_url, upstream_body).await
}
