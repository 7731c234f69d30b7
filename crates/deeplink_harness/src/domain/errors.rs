//! Domain-specific errors.

use thiserror::Error;

/// Distinguished failure conditions raised by the convergence driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A bounded wait expired before the expected element appeared.
    #[error("timed out after {millis}ms waiting for {what}")]
    Timeout { what: String, millis: u64 },

    /// The pasted fixture never appeared after the paste gesture. Distinct
    /// from a generic timeout: the transfer mechanism itself broke.
    #[error("can't paste html content: {file_name:?} never appeared")]
    ContentInjection { file_name: String },

    /// A gesture was dispatched at an element the remote application
    /// cannot resolve.
    #[error("element not found: {query}")]
    ElementNotFound { query: String },
}
