//! Protocol frame structure and encoding
//!
//! A frame carries one tagged, length-prefixed, checksummed message.

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    checksum,
    error::{Error, Result},
    DLE, ETX, MAX_ENCODED_FRAME, STX,
};

/// One protocol frame
///
/// # Wire format
///
/// ```text
/// ┌─────────┬──────────────┬──────────────┬──────────────┬──────────────┬─────────┐
/// │ DLE STX │ TAG          │ LEN_HI LEN_LO│ PAYLOAD...   │ CRC_HI CRC_LO│ DLE ETX │
/// │ (plain) │ (escaped)    │ (escaped)    │ (escaped)    │ (escaped)    │ (plain) │
/// └─────────┴──────────────┴──────────────┴──────────────┴──────────────┴─────────┘
/// ```
///
/// Length and checksum are big-endian. The checksum covers
/// `TAG LEN_HI LEN_LO PAYLOAD` before escaping. Any byte in an escaped
/// position whose value equals [`DLE`] is preceded by one extra `DLE`
/// (byte-stuffing); the two delimiter sequences are written unescaped and
/// appear exactly once each.
///
/// # Examples
///
/// ```
/// use magprobe_core::Frame;
///
/// let frame = Frame::new(0xD1, vec![0x21]);
/// let wire = frame.encode().unwrap();
/// assert_eq!(&wire[..2], &[0x10, 0x02]);
/// assert_eq!(&wire[wire.len() - 2..], &[0x10, 0x03]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command or response tag
    pub tag: u8,

    /// Frame payload (command-specific data)
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame
    pub fn new(tag: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            tag,
            payload: payload.into(),
        }
    }

    /// Create a frame with an empty payload
    pub fn empty(tag: u8) -> Self {
        Self {
            tag,
            payload: Bytes::new(),
        }
    }

    /// Checksum over tag, length and payload
    pub fn checksum(&self) -> u16 {
        checksum::over(self.tag, &self.payload)
    }

    /// Encode the frame into its escaped, delimited wire form
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameTooLong`] when the escaped frame would exceed
    /// [`MAX_ENCODED_FRAME`] bytes. That is a caller error (payload too
    /// large for the channel), not a transient fault.
    pub fn encode(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(self.payload.len() * 2 + 12);

        buf.put_u8(DLE);
        buf.put_u8(STX);

        let len = self.payload.len() as u16;
        put_escaped(&mut buf, self.tag);
        put_escaped(&mut buf, (len >> 8) as u8);
        put_escaped(&mut buf, (len & 0xFF) as u8);
        for &b in self.payload.iter() {
            put_escaped(&mut buf, b);
        }

        let crc = self.checksum();
        put_escaped(&mut buf, (crc >> 8) as u8);
        put_escaped(&mut buf, (crc & 0xFF) as u8);

        buf.put_u8(DLE);
        buf.put_u8(ETX);

        if buf.len() > MAX_ENCODED_FRAME {
            return Err(Error::FrameTooLong {
                size: buf.len(),
                max: MAX_ENCODED_FRAME,
            });
        }

        Ok(buf)
    }
}

/// Append one byte, doubling it if it collides with the escape marker
fn put_escaped(buf: &mut BytesMut, byte: u8) {
    if byte == DLE {
        buf.put_u8(DLE);
    }
    buf.put_u8(byte);
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("tag", &format!("0x{:02X}", self.tag))
            .field("checksum", &format!("0x{:04X}", self.checksum()))
            .field("payload", &hex::encode(&self.payload))
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame[0x{:02X}](len={})", self.tag, self.payload.len())
    }
}
