//! Serve command handler.
//!
//! Runs the chat proxy on a local port until Ctrl+C.

use anyhow::Result;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use voxchat_core::Settings;

/// Execute the serve command.
///
/// # Arguments
///
/// * `settings` - Loaded application settings
/// * `port` - Optional listen port override
/// * `backend` - Optional backend base address override
pub async fn execute(settings: &Settings, port: Option<u16>, backend: Option<String>) -> Result<()> {
    let port = port.unwrap_or_else(|| settings.effective_proxy_port());
    let backend_base = backend.unwrap_or_else(|| settings.effective_backend_base_url());

    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    println!("Chat proxy listening on http://127.0.0.1:{port}/api/chat");
    println!("Forwarding to backend at {backend_base}");
    println!("Press Ctrl+C to stop.");

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for shutdown signal");
            return;
        }
        shutdown.cancel();
    });

    voxchat_proxy::serve(listener, backend_base, cancel).await
}
