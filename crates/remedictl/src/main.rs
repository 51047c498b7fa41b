mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate => commands::validate::execute(&cli.file),
        Commands::Classify { query, threshold } => {
            commands::classify::execute(&cli.file, &query, threshold).await
        }
        Commands::Chat { kb, timeout } => commands::chat::execute(&cli.file, kb, timeout).await,
    }
}
