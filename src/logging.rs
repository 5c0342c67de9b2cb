//! Logging setup.
//!
//! Log output goes to stderr so it never mixes with protocol responses on
//! stdout. The level is taken from `RUST_LOG` (default `info`), e.g.
//! `RUST_LOG=flotsam::session=debug`.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber for the binaries.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Test subscriber at `debug`. Safe to call from every test.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
