//! Process-wide logging setup for the catalog service.

pub mod tracing;

/// Install the JSON tracing subscriber. Later calls are no-ops.
pub fn init() {
    tracing::init();
}
