//! Log output for the command-line tool
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary. `RUST_LOG` wins over the `--verbose` default.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "uptimerobot_client=debug,uptimerobot=debug"
    } else {
        "warn"
    }
}

/// Installs a stderr subscriber; does nothing if one is already set
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
