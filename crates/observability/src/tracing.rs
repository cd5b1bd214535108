//! JSON log output filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or unparseable: service crates and HTTP
/// request spans at `info`, dependencies at `warn`.
pub const DEFAULT_FILTER: &str = "warn,storefront_api=info,storefront_infra=info,tower_http=info";

/// Build the level filter from raw `RUST_LOG` directives.
pub fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init() {
    let rust_log = std::env::var("RUST_LOG").ok();

    // one JSON object per event, tagged with the enclosing request/store span
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref()))
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_target(false)
        .try_init();
}
