//! Main commands enum.

use clap::Subcommand;

/// Available commands for the voxchat tool.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the same-origin chat proxy server
    Serve {
        /// Port to listen on (overrides VOXCHAT_PROXY_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Backend chat service base address (overrides VOXCHAT_BACKEND_URL)
        #[arg(short, long)]
        backend: Option<String>,
    },

    /// Start an interactive chat session against a running proxy
    Chat {
        /// Chat endpoint to post messages to (overrides VOXCHAT_CHAT_ENDPOINT)
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Do not request speech synthesis for replies
        #[arg(long)]
        no_speak: bool,
    },
}
