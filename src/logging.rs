//! Tracing setup for applications embedding the client core.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for an embedding application.
///
/// Honors `RUST_LOG`; set `LOG_FORMAT=json` for structured output. Calling
/// this more than once is a no-op.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,forum_flow=debug"));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let result = if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    // Already initialized by the host application; leave its subscriber alone.
    drop(result);
}
