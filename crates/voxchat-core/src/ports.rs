//! Port definitions — the trait seams adapter crates implement.
//!
//! # Design Rules
//!
//! - Ports carry transport-agnostic types only (no reqwest/axum shapes).
//! - Error taxonomies live next to the trait they belong to, so callers
//!   can match on failure classes without knowing the transport.

use async_trait::async_trait;
use thiserror::Error;

// ── Chat gateway ───────────────────────────────────────────────────

/// Failures a chat gateway call can produce.
///
/// The three classes are deliberately distinct: callers handle a backend
/// that answered with an error differently from a backend they could not
/// reach at all, or one that answered with garbage.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The chat endpoint answered with a non-success HTTP status.
    #[error("Chat endpoint returned status {code}")]
    Status {
        /// HTTP status code of the response.
        code: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The chat endpoint could not be reached (connect failure, reset,
    /// timeout).
    #[error("Chat endpoint unreachable: {0}")]
    Network(String),

    /// The response arrived but was not parseable as the expected reply
    /// shape.
    #[error("Malformed chat reply: {0}")]
    Malformed(String),
}

/// Stateless pass-through to the backend chat service.
///
/// Implemented by `HttpChatGateway` in `voxchat-gateway`. Consumed by the
/// session manager in `voxchat-voice`.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send one user message and return the assistant reply text.
    ///
    /// Input is assumed non-empty: blank messages are rejected at the
    /// session manager boundary before this port is invoked.
    async fn send(&self, message: &str) -> Result<String, GatewayError>;
}
