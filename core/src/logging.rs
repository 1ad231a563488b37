//! tracing setup for the binaries.
//!
//! Logs go to stderr so stdout stays free for command output. The level is
//! controlled through `RUST_LOG`; without it the pipeline logs at INFO and
//! everything else at WARN.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "pokedex_core=info,pokedex=info,mock_server=info,warn";

pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
