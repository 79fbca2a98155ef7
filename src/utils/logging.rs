//! Structured logging bootstrap.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! the embedding process's call. This helper wires up the usual console
//! subscriber with `RUST_LOG`-style filtering for hosts (and tests) that do
//! not bring their own.

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a console subscriber honoring `RUST_LOG`, defaulting to `info`.
///
/// # Errors
/// Returns an error when a global subscriber is already installed.
pub fn init() -> Result<(), SetGlobalDefaultError> {
    init_with_filter("info")
}

/// Install a console subscriber with an explicit default filter directive.
///
/// # Errors
/// Returns an error when a global subscriber is already installed.
pub fn init_with_filter(default_directive: &str) -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}
