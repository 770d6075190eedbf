//! Console logging setup for the `densemm` binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a `tracing` subscriber that honours `RUST_LOG`.
///
/// Defaults to `info` for the densemm crates and `warn` for everything else.
/// Calling it again after a subscriber is installed does nothing.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,dm_bench=info,dm_parallel=info,dm_tensor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
