//! Diagnostic tracing for the `laie` binary.
//!
//! Tracing output is for operators only. The audit trail and message
//! transcript carried in each run's result are written regardless of the
//! filter configured here.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "warn,laie=debug";

/// Install the global subscriber: `RUST_LOG` when set, otherwise `warn`
/// (crate-level `debug` with `verbose`). Compact lines on stderr.
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second call (tests, embedding callers) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
