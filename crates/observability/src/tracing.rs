//! Tracing/logging initialization.
//!
//! The engine crates only emit `tracing` events; a host calls one of the
//! init functions once at startup to turn them into structured JSON logs.

use tracing_subscriber::EnvFilter;

/// Initialize tracing with `RUST_LOG` directives, defaulting to `info`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with_default("info");
}

/// Initialize tracing with the given fallback directives when `RUST_LOG` is
/// unset. JSON output with timestamps; targets are omitted.
pub fn init_with_default(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_with_default("debug");
        init();
    }
}
