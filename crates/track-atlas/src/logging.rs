//! Logging initialisation for the command-line application

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a `fmt` subscriber filtered by `RUST_LOG`
///
/// If RUST_LOG is not set, default to `info`, or `debug` when `verbose` is set.
pub fn setup_logging(verbose: bool) {
    if std::env::var("RUST_LOG").is_err() {
        let default = if verbose {
            "debug"
        } else {
            "info"
        };
        // Safety: single-threaded at startup
        unsafe {
            std::env::set_var("RUST_LOG", default);
        }
    }

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::debug!(
        "Logging initialized ({} {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
}
