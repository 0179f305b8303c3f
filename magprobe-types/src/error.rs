//! Error types for magprobe-types

/// Result type alias for type conversions
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Track data byte outside the symbol range of its track
    #[error(
        "Invalid character 0x{byte:02X} at position {position}: \
         not between 0x{min:02X} and 0x{max:02X}"
    )]
    InvalidSymbol {
        byte: u8,
        /// 1-based position in the supplied track data
        position: usize,
        min: u8,
        max: u8,
    },

    /// Track number outside 1..=3
    #[error("Invalid track number: {0} (valid: 1, 2, 3)")]
    InvalidTrack(u8),

    /// Version payload shorter than the four version fields
    #[error("Version payload too short: expected {expected} bytes, got {actual}")]
    VersionTooShort {
        expected: usize,
        actual: usize,
    },
}
