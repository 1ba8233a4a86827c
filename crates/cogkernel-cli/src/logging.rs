//! Stderr logging for the CLI

use std::io;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` directives with `default` added on top.
pub fn log_filter(default: Level) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(default.into())
}

/// Plain-text subscriber on stderr so stdout stays clean for results.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(Level::WARN))
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();
}
