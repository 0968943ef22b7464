//! Tracing/logging setup shared by warden binaries and tests.

/// Initialize process-wide tracing with JSON output and `RUST_LOG` filtering.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    self::tracing::init_with(&self::tracing::ObservabilityConfig::default());
}

/// Tracing configuration (filters, formatting).
pub mod tracing;

pub use self::tracing::{init_with, LogFormat, ObservabilityConfig};
