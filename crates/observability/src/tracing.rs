//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops). Output is
/// JSON unless `LOG_FORMAT=plain` asks for a human-readable stream; the
/// filter comes from `RUST_LOG` either way.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let plain = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("plain"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = if plain {
        builder.try_init()
    } else {
        builder.json().try_init()
    };
}
