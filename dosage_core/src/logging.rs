//! Logging infrastructure for medfmt.
//!
//! Logs go to stderr so formatted output on stdout stays clean for piping.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging at the default level (warn)
pub fn init() {
    init_with_level("warn")
}

/// Map a repeated `-v` count to a log level
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize logging from a `-v` count
pub fn init_for_verbosity(verbosity: u8) {
    init_with_level(level_for_verbosity(verbosity))
}

/// Initialize logging with a specific default level
///
/// RUST_LOG still takes precedence when set.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
