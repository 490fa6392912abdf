//! Wire shapes for the chat proxy endpoint.
//!
//! The proxy speaks the backend's contract on both sides: `{"message"}`
//! in, backend JSON out. Only failures get a shape of their own.

use serde::{Deserialize, Serialize};

/// Inbound request to `/api/chat`.
///
/// Unknown extra fields are dropped on re-encoding; the backend only ever
/// sees the canonical single-field body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatProxyRequest {
    /// The user-authored message text.
    pub message: String,
}

/// Error envelope returned on every failure path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable failure description.
    pub error: String,

    /// Underlying cause, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// The backend answered with a non-success status.
    #[must_use]
    pub fn backend_status(code: u16) -> Self {
        Self {
            error: format!("Backend server error: {code}"),
            details: None,
        }
    }

    /// The backend could not be reached.
    #[must_use]
    pub fn unreachable(details: impl Into<String>) -> Self {
        Self {
            error: "Failed to connect to backend server".to_string(),
            details: Some(details.into()),
        }
    }

    /// The inbound request body was not valid.
    #[must_use]
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self {
            error: "Failed to process request".to_string(),
            details: Some(details.into()),
        }
    }
}
