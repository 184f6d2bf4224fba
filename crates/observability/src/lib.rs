//! Process-wide logging setup shared by the API server and the seed binary.

/// Install the tracing subscriber. Calling it again is a no-op.
pub fn init() {
    tracing::init();
}

/// Subscriber construction (filter defaults, output format).
pub mod tracing;
