//! Operator-facing logging.
//!
//! Every workflow message (auto-selections, skipped apps, env file updates)
//! goes through `tracing` to stderr, so stdout stays free for listing output.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` if set. Otherwise defaults to `vlink=info`, or
/// `vlink=debug` when `verbose` is true.
///
/// # Example
/// ```bash
/// RUST_LOG=vlink=trace vlink link
/// ```
pub fn init(verbose: bool) {
    let default = if verbose { "vlink=debug" } else { "vlink=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .init();
}
