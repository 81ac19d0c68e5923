//! Tracing setup for binaries embedding this crate.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[cfg(debug_assertions)]
const MAX_LEVEL: tracing::Level = tracing::Level::DEBUG;
#[cfg(not(debug_assertions))]
const MAX_LEVEL: tracing::Level = tracing::Level::INFO;

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`.
///
/// sled's own logging is silenced. Fails if a global subscriber is already set.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::builder()
        .with_default_directive(MAX_LEVEL.into())
        .from_env_lossy()
        .add_directive("sled=off".parse()?);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()?;
    Ok(())
}
