use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_level`. Calling this more than once is a
/// no-op, so tests and binaries can both call it.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok();
}
