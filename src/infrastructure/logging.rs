//! Logging initialization
//!
//! Console logging via tracing-subscriber with an env-filter. Library code
//! only emits `tracing` events; binaries and tests opt in to a subscriber.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize console logging. `RUST_LOG` overrides the default filter.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
