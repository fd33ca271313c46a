//! Development-time tracing for debugging the simulator.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: Dev diagnostics via `RUST_LOG`, output to stderr.
//!   Not part of any execution result.
//!
//! - **Execution trace (`sim/trace`)**: The product audit trail of a session.
//!   Always recorded, unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber for development logging.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format. Panics if a global subscriber is already
/// installed; use [`try_init`] when that is possible.
///
/// # Example
/// ```bash
/// RUST_LOG=lab=debug cargo test -p lab
/// ```
pub fn init() {
    if let Err(err) = try_init() {
        panic!("install tracing subscriber: {err}");
    }
}

/// Like [`init`], but reports an already-installed subscriber as an error.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()
}
