//! Byte-level response parser state machine
//!
//! Decodes the escaped byte stream coming back from the probe into a
//! (tag, payload, checksum) triple. De-escaping happens before the state
//! dispatch: a one-bit flag remembers whether the previous raw byte was a
//! DLE, and the classified byte (control or literal) is then fed to the
//! state machine.
//!
//! One parser instance is owned per logical connection and fed by the
//! caller; there is no shared or global parse state.

use bytes::Bytes;
use std::fmt;
use tracing::trace;

use crate::{
    checksum,
    error::{Error, Result},
    DLE, ETX, MAX_RESPONSE_PAYLOAD, STX,
};

/// Parse progress after consuming a byte or a chunk
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    /// More bytes are needed
    Busy,

    /// A complete, structurally valid frame is ready
    Done,
}

/// Parser states, in frame order
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    /// Ignoring noise until a DLE STX arrives
    SearchStart,
    /// Next data byte is the tag
    Tag,
    /// Next data byte is the high half of the length
    LenHigh,
    /// Next data byte is the low half of the length
    LenLow,
    /// Filling the payload buffer
    Data,
    /// Next data byte is the high half of the checksum
    CrcHigh,
    /// Next data byte is the low half of the checksum
    CrcLow,
    /// Everything read; only DLE ETX is valid now
    End,
}

/// Incremental frame parser
///
/// # Examples
///
/// ```
/// use magprobe_core::{Frame, FrameParser, Status};
///
/// let wire = Frame::new(0xD1, vec![0x21]).encode().unwrap();
///
/// let mut parser = FrameParser::new();
/// assert_eq!(parser.feed(&wire).unwrap(), Status::Done);
/// assert_eq!(parser.tag(), 0xD1);
/// assert_eq!(parser.payload().as_ref(), &[0x21]);
/// assert!(parser.checksum_ok());
/// ```
pub struct FrameParser {
    state: State,
    /// True iff the previous raw byte was a DLE awaiting classification
    dle_escape: bool,
    tag: u8,
    length: u16,
    buf: Vec<u8>,
    /// Count of payload bytes consumed, including dropped overflow bytes
    fill: u16,
    received_checksum: u16,
}

impl FrameParser {
    /// Create a parser in its initial search-for-start state
    pub fn new() -> Self {
        Self {
            state: State::SearchStart,
            dle_escape: false,
            tag: 0,
            length: 0,
            buf: Vec::new(),
            fill: 0,
            received_checksum: 0,
        }
    }

    /// Consume one raw byte from the stream
    ///
    /// Returns [`Status::Busy`] while the frame is incomplete and
    /// [`Status::Done`] when the terminating DLE ETX was recognized.
    ///
    /// # Errors
    ///
    /// Any framing violation (bad escape sequence, DLE STX while
    /// mid-frame, trailing data after the checksum) is returned as an
    /// error and the parser resets itself to the search-for-start state.
    pub fn step(&mut self, byte: u8) -> Result<Status> {
        // De-escape before the state dispatch, so the state machine only
        // ever sees classified data bytes.
        if self.dle_escape {
            self.dle_escape = false;
            match byte {
                STX => {
                    // A new frame may only begin while searching for one.
                    if self.state != State::SearchStart {
                        self.resync();
                        return Err(Error::UnexpectedStart);
                    }
                    self.begin_frame();
                    return Ok(Status::Busy);
                }
                ETX => {
                    trace!(tag = self.tag, len = self.length, "Frame complete");
                    self.state = State::SearchStart;
                    return Ok(Status::Done);
                }
                DLE => {
                    // Escaped literal DLE: falls through as ordinary data.
                }
                other => {
                    self.resync();
                    return Err(Error::InvalidEscape(other));
                }
            }
        } else if byte == DLE {
            self.dle_escape = true;
            return Ok(Status::Busy);
        }

        self.data_byte(byte)
    }

    /// Feed a whole received chunk
    ///
    /// Applies [`step`](Self::step) per byte and stops at the first
    /// complete frame or the first error; remaining bytes of the chunk
    /// are not consumed past that point. Each call reads exactly one
    /// bounded transport segment, so one frame per chunk is the norm.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Status> {
        for &byte in chunk {
            if self.step(byte)? == Status::Done {
                return Ok(Status::Done);
            }
        }
        Ok(Status::Busy)
    }

    /// Tag of the last parsed frame
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Payload length declared by the last parsed frame
    ///
    /// May exceed [`payload`](Self::payload)`.len()` when overflow bytes
    /// were dropped.
    pub fn declared_len(&self) -> u16 {
        self.length
    }

    /// Stored payload of the last parsed frame
    pub fn payload(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buf)
    }

    /// Checksum transmitted with the last parsed frame
    pub fn received_checksum(&self) -> u16 {
        self.received_checksum
    }

    /// Checksum recomputed over the stored tag, length and payload
    ///
    /// The transmitted value is never trusted on its own; validation is
    /// always an independent recomputation.
    pub fn computed_checksum(&self) -> u16 {
        let len = self.length;
        let mut crc = checksum::init();
        crc = checksum::add(crc, self.tag);
        crc = checksum::add(crc, (len >> 8) as u8);
        crc = checksum::add(crc, (len & 0xFF) as u8);
        for &b in &self.buf {
            crc = checksum::add(crc, b);
        }
        crc
    }

    /// Compare the recomputed checksum with the transmitted one
    pub fn checksum_ok(&self) -> bool {
        self.computed_checksum() == self.received_checksum
    }

    /// Discard any in-progress frame and return to the search state
    ///
    /// Used by the call layer after a failed exchange, so a partial
    /// response cannot bleed into the next call.
    pub fn reset(&mut self) {
        self.resync();
    }

    /// Reset after a framing violation; the in-progress frame is invalid
    fn resync(&mut self) {
        self.state = State::SearchStart;
        self.dle_escape = false;
    }

    fn begin_frame(&mut self) {
        self.state = State::Tag;
        self.tag = 0;
        self.length = 0;
        self.buf.clear();
        self.fill = 0;
        self.received_checksum = 0;
    }

    /// Dispatch an ordinary (de-escaped) data byte to the current state
    fn data_byte(&mut self, byte: u8) -> Result<Status> {
        match self.state {
            State::SearchStart => {
                // Noise between frames is tolerated, not an error.
            }
            State::Tag => {
                self.tag = byte;
                self.state = State::LenHigh;
            }
            State::LenHigh => {
                self.length = (byte as u16) << 8;
                self.state = State::LenLow;
            }
            State::LenLow => {
                self.length |= byte as u16;
                if self.length > 0 {
                    self.fill = 0;
                    self.state = State::Data;
                } else {
                    self.state = State::CrcHigh;
                }
            }
            State::Data => {
                // Bytes beyond capacity are counted but dropped. The
                // receive buffer exceeds any legitimate response, so this
                // is an accepted lossy policy rather than an error.
                if (self.fill as usize) < MAX_RESPONSE_PAYLOAD {
                    self.buf.push(byte);
                }
                self.fill += 1;
                if self.fill >= self.length {
                    self.state = State::CrcHigh;
                }
            }
            State::CrcHigh => {
                self.received_checksum = (byte as u16) << 8;
                self.state = State::CrcLow;
            }
            State::CrcLow => {
                self.received_checksum |= byte as u16;
                self.state = State::End;
            }
            State::End => {
                self.resync();
                return Err(Error::TrailingByte(byte));
            }
        }
        Ok(Status::Busy)
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameParser")
            .field("state", &self.state)
            .field("dle_escape", &self.dle_escape)
            .field("tag", &format!("0x{:02X}", self.tag))
            .field("length", &self.length)
            .field("fill", &self.fill)
            .finish()
    }
}
