//! Integration testing library for the pipeline configuration model.
//!
//! Provides shared document fixtures and logging setup for the end-to-end
//! scenarios under `tests/`.

pub mod fixtures;

/// Install a test-friendly tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
