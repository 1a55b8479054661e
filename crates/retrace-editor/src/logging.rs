//! `tracing` subscriber setup for binaries and demos.
//!
//! Library code only emits events; installing a subscriber is left to the
//! application. [`init`] installs a formatted subscriber filtered by
//! `RUST_LOG`, falling back to the given directive.

use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber. `default_filter` (e.g. `"warn"` or
/// `"retrace_editor=debug"`) applies when `RUST_LOG` is unset or invalid.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(true)
        .try_init()
        .is_ok()
}
