//! Logging initialization for terrapool hosts.
//!
//! The library itself only emits `tracing` events; embedding applications
//! that already own a subscriber can ignore this module. For tools and
//! tests, [`init_logging`] installs a console subscriber configurable via
//! the `RUST_LOG` environment variable.

use tracing_subscriber::EnvFilter;

/// Install a console `tracing` subscriber.
///
/// `default_filter` applies when `RUST_LOG` is unset, e.g. `"terrapool=debug"`.
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
