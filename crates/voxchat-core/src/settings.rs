//! Settings domain types and validation.
//!
//! Pure domain types with no infrastructure dependencies. Loading from
//! the environment happens in the CLI bootstrap; this module only knows
//! shapes, defaults, and validity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default port for the same-origin chat proxy server.
pub const DEFAULT_PROXY_PORT: u16 = 3000;

/// Default base address of the backend chat service.
pub const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:5000";

/// Default chat endpoint the gateway client talks to.
pub const DEFAULT_CHAT_ENDPOINT: &str = "http://localhost:3000/api/chat";

/// Default timeout for one gateway request, in seconds.
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;

/// Application settings structure.
///
/// All fields are optional to support partial overrides and graceful
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Port the proxy server listens on.
    pub proxy_port: Option<u16>,

    /// Base address of the backend chat service the proxy forwards to.
    pub backend_base_url: Option<String>,

    /// Chat endpoint the gateway client posts messages to.
    pub chat_endpoint: Option<String>,

    /// Timeout for one gateway request, in seconds.
    pub gateway_timeout_secs: Option<u64>,

    /// Whether assistant replies are spoken automatically.
    pub auto_speak: Option<bool>,

    /// Synthesis rate multiplier (1.0 = neutral).
    pub speech_rate: Option<f32>,

    /// Synthesis pitch (1.0 = neutral).
    pub speech_pitch: Option<f32>,

    /// Synthesis volume (1.0 = full).
    pub speech_volume: Option<f32>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            proxy_port: Some(DEFAULT_PROXY_PORT),
            backend_base_url: Some(DEFAULT_BACKEND_BASE_URL.to_string()),
            chat_endpoint: Some(DEFAULT_CHAT_ENDPOINT.to_string()),
            gateway_timeout_secs: Some(DEFAULT_GATEWAY_TIMEOUT_SECS),
            auto_speak: Some(true),
            speech_rate: Some(1.0),
            speech_pitch: Some(1.0),
            speech_volume: Some(1.0),
        }
    }

    /// Get the effective proxy port (with default fallback).
    #[must_use]
    pub const fn effective_proxy_port(&self) -> u16 {
        match self.proxy_port {
            Some(port) => port,
            None => DEFAULT_PROXY_PORT,
        }
    }

    /// Get the effective backend base address (with default fallback).
    #[must_use]
    pub fn effective_backend_base_url(&self) -> String {
        self.backend_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BACKEND_BASE_URL.to_string())
    }

    /// Get the effective chat endpoint (with default fallback).
    #[must_use]
    pub fn effective_chat_endpoint(&self) -> String {
        self.chat_endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_CHAT_ENDPOINT.to_string())
    }

    /// Get the effective gateway timeout (with default fallback).
    #[must_use]
    pub const fn effective_gateway_timeout_secs(&self) -> u64 {
        match self.gateway_timeout_secs {
            Some(secs) => secs,
            None => DEFAULT_GATEWAY_TIMEOUT_SECS,
        }
    }

    /// Whether assistant replies are spoken automatically (default true).
    #[must_use]
    pub const fn effective_auto_speak(&self) -> bool {
        match self.auto_speak {
            Some(enabled) => enabled,
            None => true,
        }
    }
}

/// Settings validation errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The proxy port is zero.
    #[error("Proxy port must be non-zero")]
    InvalidProxyPort,

    /// A URL setting is empty or not HTTP.
    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl {
        /// Which setting failed.
        field: &'static str,
        /// The offending value.
        value: String,
    },

    /// The gateway timeout is outside 1–600 seconds.
    #[error("Gateway timeout must be between 1 and 600 seconds, got {0}")]
    InvalidTimeout(u64),

    /// A speech parameter is out of range.
    #[error("Speech {field} out of range: {value}")]
    InvalidSpeechParameter {
        /// Which parameter failed (rate, pitch, volume).
        field: &'static str,
        /// The offending value.
        value: f32,
    },
}

/// Validate a settings object, checking every populated field.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if settings.proxy_port == Some(0) {
        return Err(SettingsError::InvalidProxyPort);
    }

    for (field, value) in [
        ("backend_base_url", &settings.backend_base_url),
        ("chat_endpoint", &settings.chat_endpoint),
    ] {
        if let Some(url) = value
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            return Err(SettingsError::InvalidUrl { field, value: url.clone() });
        }
    }

    if let Some(secs) = settings.gateway_timeout_secs
        && !(1..=600).contains(&secs)
    {
        return Err(SettingsError::InvalidTimeout(secs));
    }

    for (field, value, lo, hi) in [
        ("rate", settings.speech_rate, 0.1_f32, 10.0_f32),
        ("pitch", settings.speech_pitch, 0.0, 2.0),
        ("volume", settings.speech_volume, 0.0, 1.0),
    ] {
        if let Some(v) = value
            && !(lo..=hi).contains(&v)
        {
            return Err(SettingsError::InvalidSpeechParameter { field, value: v });
        }
    }

    Ok(())
}
