//! Logging setup.
//!
//! Logs go to stderr so tables on stdout can be piped or redirected cleanly.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Environment variable holding a `tracing` filter (e.g. `phi_fit=debug`).
pub const LOG_ENV: &str = "PHIFIT_LOG";

/// Default filter for a `-v` count when `PHIFIT_LOG` is unset.
pub fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(verbose: u8) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(env_filter)
        .try_init();
}
