mod cli;

use clap::Parser;
use cli::config::{AppConfig, CliArgs};
use cli::telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    init_telemetry(config.log_format)?;

    if cfg!(debug_assertions) {
        tracing::debug!("Starting idgen with full config: {:#?}", config);
    }

    cli::run(config)
}
