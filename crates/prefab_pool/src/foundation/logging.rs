//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Honors `RUST_LOG` the same way `env_logger` always does. Panics if a
/// logger was already installed; use [`try_init`] when that can happen.
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system unless a logger is already installed
///
/// Returns `true` when this call installed the logger.
pub fn try_init() -> bool {
    env_logger::try_init().is_ok()
}

/// Initialize logging for unit tests
///
/// Output goes through the test harness capture so it only shows up for
/// failing tests. Safe to call from every test.
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
