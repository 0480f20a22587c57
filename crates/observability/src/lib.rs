//! Process-wide logging setup shared by every binary embedding the ledger.

pub mod subscriber;

pub use subscriber::{LogConfig, LogFormat};

/// Initialize process-wide tracing with the default configuration.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    subscriber::init(&LogConfig::default());
}
