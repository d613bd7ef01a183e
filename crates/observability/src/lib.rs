//! Process-wide tracing setup shared by the service binary and its tests.

/// Initialize structured logging.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filter, output format).
pub mod tracing;
