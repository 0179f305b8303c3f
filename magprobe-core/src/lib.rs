//! # magprobe-core
//!
//! Core protocol implementation for the magnetic-stripe swipe probe.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure, escaping and encoding
//! - Byte-level response parser state machine
//! - Checksum calculation
//! - Command and response tag definitions
//! - Protocol constants

pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod parser;

pub use command::{CommandTag, ResponseTag};
pub use error::{Error, Result};
pub use frame::Frame;
pub use parser::{FrameParser, Status};

/// Escape marker (DLE)
pub const DLE: u8 = 0x10;

/// Start-of-frame marker, valid only after a DLE (STX)
pub const STX: u8 = 0x02;

/// End-of-frame marker, valid only after a DLE (ETX)
pub const ETX: u8 = 0x03;

/// Maximum size of an escaped, delimited frame on the wire
pub const MAX_ENCODED_FRAME: usize = 256;

/// Receive buffer capacity; responses from the probe are always short
pub const MAX_RESPONSE_PAYLOAD: usize = 256;
