use std::io::{self, IsTerminal};
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the logging system with JSON formatting and environment-based
/// filtering (defaults to "info" when RUST_LOG is not set).
///
/// Diagnostics go to stderr; stdout is reserved for report and digest output.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .json()
        .flatten_event(true)
        .init();
}

/// Whether digest output is going to an interactive viewer.
pub fn stdout_is_interactive() -> bool {
    io::stdout().is_terminal()
}
