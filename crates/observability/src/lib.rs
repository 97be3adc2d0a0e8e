//! Tracing/logging setup shared by gatekeeper binaries.

/// Subscriber initialization (filters, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, ObservabilityConfig};

/// Initialize process-wide logging with the defaults (JSON, `info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(&ObservabilityConfig::default());
}

/// Initialize process-wide logging with explicit settings.
pub fn init_with(config: &ObservabilityConfig) {
    tracing::init_with(config);
}
