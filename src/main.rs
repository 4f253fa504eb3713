use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stakeboard::application::{Cli, CommandExecutor};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    // Priority: CLI args > config file > defaults
    let config = cli.resolve_config().context("Failed to resolve configuration")?;
    info!("🔗 Using RPC {}", config.rpc.url);

    let mut executor = CommandExecutor::new(config).context("Failed to set up contract clients")?;
    executor.execute(cli.command).await?;
    Ok(())
}
