//! High-level error types
//!
//! Every failure is fatal to the current operation: the driver never
//! retries or recovers internally.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] magprobe_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] magprobe_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] magprobe_types::Error),

    /// No response within the bound
    #[error("No response received within {ms} ms")]
    Timeout {
        ms: u64,
    },

    /// Method-call response tag was not the operation-OK status
    #[error("Probe did not report OK on method call (response tag 0x{tag:02X})")]
    UnexpectedStatus {
        tag: u8,
    },

    /// Function-call response tag did not echo the request tag
    #[error("Response tag mismatch: sent 0x{expected:02X}, received 0x{actual:02X}")]
    TagMismatch {
        expected: u8,
        actual: u8,
    },

    /// Function-call response shorter than the expected result;
    /// responses may grow in future firmware but never shrink
    #[error("Response too short: expected at least {expected} bytes, got {actual}")]
    ShortResponse {
        expected: usize,
        actual: usize,
    },
}
