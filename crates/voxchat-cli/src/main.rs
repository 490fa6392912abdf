//! CLI entry point - the composition root.
//!
//! Logging and settings are initialised here; command dispatch routes to
//! handlers, which wire up the concrete gateway and speech backends.

use clap::Parser;

use voxchat_cli::{Cli, Commands, handlers, init_tracing, load_settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    let settings = load_settings()?;

    // Dispatch to appropriate handler
    let Some(command) = cli.command else {
        // No command provided - show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve { port, backend } => {
            handlers::serve::execute(&settings, port, backend).await?;
        }
        Commands::Chat { endpoint, no_speak } => {
            handlers::chat::execute(&settings, endpoint, no_speak).await?;
        }
    }

    Ok(())
}
