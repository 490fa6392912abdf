//! CLI bootstrap - the composition root.
//!
//! This module is the only place where infrastructure is wired together
//! for the CLI: logging, environment-derived settings, and (per handler)
//! the concrete gateway and speech backends.

use std::env;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use voxchat_core::{Settings, validate_settings};

/// Initialize logging.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug over
/// info.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load settings from defaults and `VOXCHAT_*` environment variables.
///
/// # Errors
///
/// Returns an error when a variable fails to parse or the resulting
/// settings fail validation.
pub fn load_settings() -> Result<Settings> {
    let mut settings = Settings::with_defaults();

    if let Ok(port) = env::var("VOXCHAT_PROXY_PORT") {
        settings.proxy_port = Some(port.parse().context("invalid VOXCHAT_PROXY_PORT")?);
    }
    if let Ok(url) = env::var("VOXCHAT_BACKEND_URL") {
        settings.backend_base_url = Some(url);
    }
    if let Ok(endpoint) = env::var("VOXCHAT_CHAT_ENDPOINT") {
        settings.chat_endpoint = Some(endpoint);
    }
    if let Ok(secs) = env::var("VOXCHAT_GATEWAY_TIMEOUT_SECS") {
        settings.gateway_timeout_secs =
            Some(secs.parse().context("invalid VOXCHAT_GATEWAY_TIMEOUT_SECS")?);
    }
    if let Ok(auto) = env::var("VOXCHAT_AUTO_SPEAK") {
        settings.auto_speak = Some(auto.parse().context("invalid VOXCHAT_AUTO_SPEAK")?);
    }

    validate_settings(&settings)?;
    Ok(settings)
}
