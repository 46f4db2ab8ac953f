// ── Logging ───────────────────────────────────────────────────────────────────
//
// Both binaries log through `tracing`.  The subscriber honours `RUST_LOG`
// and otherwise shows warnings and errors only.  Release GUI builds have no
// console, so the output goes nowhere there.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.  Call once, first thing in `main`.
pub fn init() {
    let filter = EnvFilter::from_default_env().add_directive(Level::WARN.into());
    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
