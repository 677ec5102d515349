//! Diagnostic logging setup.

use crate::error::{Error, Result};

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn,zipmirror=info";

/// Install a `tracing` subscriber writing to stderr.
///
/// Standard output is left to the progress bars and the pipeline messages.
pub fn init_logging() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Internal(format!("failed to initialize logging: {}", e)))?;

    tracing::debug!("logging initialized");
    Ok(())
}
