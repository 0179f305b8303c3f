//! Firmware version result structure

use std::fmt;

use crate::error::{Error, Result};

/// Bootloader and firmware version of the probe
///
/// Decoded from the 4-byte payload of the software-version query.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub bootloader_major: u8,
    pub bootloader_minor: u8,
    pub firmware_major: u8,
    pub firmware_minor: u8,
}

impl FirmwareVersion {
    /// Size of the wire structure
    pub const SIZE: usize = 4;
}

impl TryFrom<&[u8]> for FirmwareVersion {
    type Error = Error;

    /// Decode from a response payload; extra trailing bytes are ignored
    /// (responses may grow in future firmware, never shrink)
    fn try_from(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(Error::VersionTooShort {
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bootloader_major: bytes[0],
            bootloader_minor: bytes[1],
            firmware_major: bytes[2],
            firmware_minor: bytes[3],
        })
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "firmware {}.{} bootloader {}.{}",
            self.firmware_major, self.firmware_minor, self.bootloader_major, self.bootloader_minor
        )
    }
}
