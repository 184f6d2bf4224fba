//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Applied when RUST_LOG is unset. sqlx logs every statement at info.
const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn,reqwest=warn";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    // JSON lines for collectors; LOG_FORMAT=pretty for a local terminal.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("pretty") => {
            let _ = builder.pretty().try_init();
        }
        _ => {
            let _ = builder.json().try_init();
        }
    }
}
