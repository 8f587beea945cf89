//! Logging initialisation for pill-grid.
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`). Per-frame
//! traces are available with `RUST_LOG=pill_grid=trace`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
