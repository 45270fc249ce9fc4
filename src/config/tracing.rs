use tracing_forest::ForestLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` takes precedence over `fallback`.
pub fn init(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(ForestLayer::default())
        .init();
}
