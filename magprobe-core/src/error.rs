//! Error types for magprobe-core

/// Result type alias for core protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Escaping made the frame longer than the transport can carry
    #[error("Encoded frame too long: {size} bytes (max: {max} bytes)")]
    FrameTooLong {
        size: usize,
        max: usize,
    },

    /// Checksum verification failed
    #[error("Checksum mismatch: computed 0x{computed:04X}, received 0x{received:04X}")]
    ChecksumMismatch {
        computed: u16,
        received: u16,
    },

    /// An escape marker was followed by a byte that is not a control
    /// character and not a literal escape marker
    #[error("Invalid escape sequence: DLE followed by 0x{0:02X}")]
    InvalidEscape(u8),

    /// A start-of-frame sequence arrived while a frame was being parsed
    #[error("Unexpected start of frame while mid-frame (protocol desynchronization)")]
    UnexpectedStart,

    /// A data byte arrived after the checksum, where only the
    /// end-of-frame sequence is valid
    #[error("Trailing byte 0x{0:02X} after checksum, expected end of frame")]
    TrailingByte(u8),

    /// The parse outcome was not a complete frame
    #[error("Incomplete frame: stream ended while {0}")]
    Incomplete(&'static str),

    /// Unknown response tag value
    #[error("Unknown response tag: 0x{0:02X}")]
    UnknownTag(u8),
}
