pub mod command;
pub mod config;
pub mod telemetry;

use std::{io, sync::Arc};

use idgen::{
    AtomicSnowflakeGenerator, EPOCH, Generator, LockSnowflakeGenerator, MonotonicClock, Node,
};

use config::{AppConfig, Command, Strategy};

/// Runs the configured subcommand, writing results to stdout.
pub fn run(config: AppConfig) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    match &config.command {
        Command::Generate { count, format } => {
            idgen::set_default(build_generator(&config)?)?;
            tracing::info!(
                node_id = config.node_id.get(),
                strategy = ?config.strategy,
                count = *count,
                "generating IDs"
            );
            command::generate(&mut out, *count, *format, || Ok(idgen::generate()?))
        }
        Command::Decode { id, format } => command::decode(&mut out, id, *format),
    }
}

fn build_generator(config: &AppConfig) -> anyhow::Result<Arc<dyn Generator>> {
    let clock = MonotonicClock::try_with_epoch(EPOCH)?;
    let generator: Arc<dyn Generator> = match config.strategy {
        Strategy::Lock => Arc::new(Node::from_generator(LockSnowflakeGenerator::new(
            config.node_id,
            clock,
        ))),
        Strategy::Atomic => Arc::new(Node::from_generator(AtomicSnowflakeGenerator::new(
            config.node_id,
            clock,
        ))),
    };
    Ok(generator)
}
