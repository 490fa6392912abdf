//! HTTP implementation of the [`ChatGateway`] port.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use voxchat_core::{ChatGateway, GatewayError, Settings};

/// Request body posted to the chat endpoint.
#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Reply body expected from the chat endpoint.
#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

/// Stateless HTTP client for the chat proxy endpoint.
pub struct HttpChatGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChatGateway {
    /// Create a gateway posting to `endpoint`, with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Network`] if the HTTP client cannot be
    /// constructed.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a gateway from application settings.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Network`] if the HTTP client cannot be
    /// constructed.
    pub fn from_settings(settings: &Settings) -> Result<Self, GatewayError> {
        Self::new(
            settings.effective_chat_endpoint(),
            Duration::from_secs(settings.effective_gateway_timeout_secs()),
        )
    }

    /// The endpoint this gateway posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn send(&self, message: &str) -> Result<String, GatewayError> {
        debug!(endpoint = %self.endpoint, chars = message.len(), "posting chat message");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "chat request failed");
                GatewayError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "chat endpoint error");
            return Err(GatewayError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let reply: ChatReply = response.json().await.map_err(|e| {
            error!(error = %e, "failed to parse chat reply");
            GatewayError::Malformed(e.to_string())
        })?;

        debug!(chars = reply.response.len(), "chat reply received");
        Ok(reply.response)
    }
}
