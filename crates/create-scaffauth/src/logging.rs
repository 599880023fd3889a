//! Tracing subscriber initialisation.
//!
//! Only the binary installs a subscriber; `scaffauth-core` only emits events.
//! `--debug` selects DEBUG, otherwise WARN. `RUST_LOG` overrides both.

use std::io::IsTerminal as _;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber writing to stderr
pub fn init_logging(debug: bool) -> anyhow::Result<()> {
    let level = level(debug);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("create_scaffauth={level},scaffauth_core={level}"))
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))
}

fn level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "warn"
    }
}
