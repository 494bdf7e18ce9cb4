// CLI binary entry point for mp3-tagger
//
// This is the main entry point for the mp3-tagger command-line tool.

mod cli;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Config;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Library logging goes through `log`, bridged into the subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli::commands::run(&config).with_context(|| format!("{} command failed", command_name(&config)))
}

fn command_name(config: &Config) -> &'static str {
    match config.command {
        cli::Commands::Read { .. } => "read",
        cli::Commands::Set { .. } => "set",
        cli::Commands::Clear { .. } => "clear",
        cli::Commands::Detect { .. } => "detect",
        cli::Commands::Info { .. } => "info",
    }
}
