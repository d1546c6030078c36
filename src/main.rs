use clap::Parser;

use cdp_support_agent::cli::{self, Cli, Command};
use cdp_support_agent::config::AppConfig;
use cdp_support_agent::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let cli = Cli::parse();

    match cli.command {
        Command::Ingest(args) => cli::ingest::run(args, &config).await,
        Command::Chat(args) => cli::chat::run(args, &config).await,
    }
}
