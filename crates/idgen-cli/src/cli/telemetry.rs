//! Log setup for the `idgen` binary.
//!
//! Logs always go to stderr so that stdout carries only IDs. The filter comes
//! from `RUST_LOG` and defaults to `info`; `RUST_LOG=idgen=trace` shows every
//! generator poll.

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt::time::ChronoLocal, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use super::config::LogFormat;

pub fn init_telemetry(format: LogFormat) -> anyhow::Result<()> {
    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_target(false)
            .with_timer(ChronoLocal::rfc_3339())
            .with_file(true)
            .pretty()
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_ids(true)
            .with_timer(ChronoLocal::rfc_3339())
            .json()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .try_init()?;

    Ok(())
}
