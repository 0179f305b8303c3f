//! Track descriptors and symbol re-encoding
//!
//! Magstripe cards do not use 8 bits per character. Track 1 uses 7 bits
//! per symbol (6 data bits plus parity); valid input characters lie in
//! [0x20, 0x5F] and the symbol value is the character minus 0x20, so a
//! capital 'A' (0x41) goes on the wire as 0x21. Tracks 2 and 3 use 5 bits
//! per symbol (4 data bits plus parity); valid characters lie in
//! [0x30, 0x3F] and the symbol value is the character minus 0x30.
//!
//! The subtraction is part of the wire contract and happens before
//! transmission; an out-of-range byte rejects the whole command without
//! sending anything.

use std::fmt;

use crate::error::{Error, Result};

/// One of the three magnetic-stripe tracks
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Track {
    One,
    Two,
    Three,
}

impl Track {
    /// All tracks, in card order
    pub const ALL: [Track; 3] = [Track::One, Track::Two, Track::Three];

    /// 1-based track number, as used in command tag arithmetic
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Inclusive range of valid input characters for this track
    pub fn symbol_range(self) -> (u8, u8) {
        match self {
            Self::One => (0x20, 0x5F),
            Self::Two | Self::Three => (0x30, 0x3F),
        }
    }

    /// Value subtracted from an input character to obtain its symbol
    pub fn symbol_offset(self) -> u8 {
        self.symbol_range().0
    }

    /// Re-encode input characters into device symbol values
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSymbol`] for the first byte outside this
    /// track's character range; nothing is transmitted in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use magprobe_types::Track;
    ///
    /// assert_eq!(Track::One.encode_symbols(b"A").unwrap(), vec![0x21]);
    /// assert_eq!(Track::Two.encode_symbols(b"5").unwrap(), vec![0x05]);
    /// assert!(Track::One.encode_symbols(&[0x19]).is_err());
    /// ```
    pub fn encode_symbols(self, data: &[u8]) -> Result<Vec<u8>> {
        let (min, max) = self.symbol_range();
        let mut encoded = Vec::with_capacity(data.len());
        for (i, &byte) in data.iter().enumerate() {
            if byte < min || byte > max {
                return Err(Error::InvalidSymbol {
                    byte,
                    position: i + 1,
                    min,
                    max,
                });
            }
            encoded.push(byte - min);
        }
        Ok(encoded)
    }
}

impl TryFrom<u8> for Track {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(Error::InvalidTrack(other)),
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track {}", self.number())
    }
}
