//! Error types for the monitor crate.

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors raised while constructing monitoring components.
///
/// Runtime operations (admitting a request, appending a log entry) never
/// fail; only nonsensical configuration is rejected up front.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A limit was configured as zero.
    #[error("invalid monitor configuration: {field} must be greater than zero")]
    ZeroLimit {
        /// Name of the offending setting.
        field: &'static str,
    },
}
