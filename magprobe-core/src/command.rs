//! Command and response tag definitions
//!
//! Fixed byte values from the probe firmware contract. Per-track commands
//! are computed as a base tag plus the 1-based track number.

use std::fmt;

use crate::error::{Error, Result};

/// Base tag for per-track data commands; add the 1-based track number
pub const DATA_BASE: u8 = 0xD0;

/// Base tag for per-track configuration commands; add the 1-based track number
pub const CONFIG_BASE: u8 = 0xC0;

/// Base tag for error status responses
pub const STATUS_ERROR_BASE: u8 = 0xE0;

/// Base tag for unsolicited event responses
pub const EVENT_BASE: u8 = 0x30;

/// Command tags (host to probe)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandTag {
    /// Reset track data and track settings to their default values
    DefaultConfiguration = 0xDC,

    /// Data for track 1
    Data1 = 0xD1,
    /// Data for track 2
    Data2 = 0xD2,
    /// Data for track 3
    Data3 = 0xD3,

    /// Configuration for track 1
    Config1 = 0xC1,
    /// Configuration for track 2
    Config2 = 0xC2,
    /// Configuration for track 3
    Config3 = 0xC3,

    /// Arm the trigger: enter go-mode
    TriggerArm = 0x7A,
    /// Disarm the trigger: enter stop-mode
    TriggerDisarm = 0x7D,
    /// Select the trigger mode
    TriggerMode = 0x73,

    /// Retrieve the firmware and bootloader version
    SoftwareVersion = 0x5E,
    /// Reboot to bootloader
    StartBootloader = 0x5B,
}

impl CommandTag {
    /// Data command for the given 1-based track number
    ///
    /// # Panics
    ///
    /// Panics if `track_number` is not 1, 2 or 3. Callers hold a validated
    /// track descriptor, so this is an internal invariant.
    pub fn track_data(track_number: u8) -> Self {
        match track_number {
            1 => Self::Data1,
            2 => Self::Data2,
            3 => Self::Data3,
            _ => unreachable!("track number out of range: {track_number}"),
        }
    }

    /// Configuration command for the given 1-based track number
    ///
    /// # Panics
    ///
    /// Panics if `track_number` is not 1, 2 or 3.
    pub fn track_config(track_number: u8) -> Self {
        match track_number {
            1 => Self::Config1,
            2 => Self::Config2,
            3 => Self::Config3,
            _ => unreachable!("track number out of range: {track_number}"),
        }
    }

    /// Tag name as it appears in the firmware documentation
    pub fn name(self) -> &'static str {
        match self {
            Self::DefaultConfiguration => "DEFAULT_CONFIGURATION",
            Self::Data1 => "DATA_TRACK1",
            Self::Data2 => "DATA_TRACK2",
            Self::Data3 => "DATA_TRACK3",
            Self::Config1 => "CONFIG_TRACK1",
            Self::Config2 => "CONFIG_TRACK2",
            Self::Config3 => "CONFIG_TRACK3",
            Self::TriggerArm => "TRIGGER_ARM",
            Self::TriggerDisarm => "TRIGGER_DISARM",
            Self::TriggerMode => "TRIGGER_MODE",
            Self::SoftwareVersion => "SOFTWARE_VERSION",
            Self::StartBootloader => "START_BOOTLOADER",
        }
    }
}

impl From<CommandTag> for u8 {
    fn from(tag: CommandTag) -> u8 {
        tag as u8
    }
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

/// Response tags (probe to host)
///
/// Function-call responses reuse the command tag of the request instead,
/// so this enum only covers status and event responses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseTag {
    /// Generic confirmation for a successful method call
    OperationOk = 0x00,

    /// Command tag not understood by the firmware
    ErrorIllegalCommand = 0xE1,
    /// Payload length not accepted
    ErrorSize = 0xE5,
    /// Probe-side framing error
    ErrorParsing = 0xE9,
    /// Probe-side checksum mismatch
    ErrorChecksum = 0xEC,

    /// A card swipe was executed
    EventSwiped = 0x35,
}

impl ResponseTag {
    /// Check if this is an error status from the probe
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::ErrorIllegalCommand | Self::ErrorSize | Self::ErrorParsing | Self::ErrorChecksum
        )
    }

    /// Tag name as it appears in the firmware documentation
    pub fn name(self) -> &'static str {
        match self {
            Self::OperationOk => "OPERATION_OK",
            Self::ErrorIllegalCommand => "ERROR_ILLEGAL_COMMAND",
            Self::ErrorSize => "ERROR_SIZE",
            Self::ErrorParsing => "ERROR_PARSING",
            Self::ErrorChecksum => "ERROR_CHECKSUM",
            Self::EventSwiped => "EVENT_SWIPED",
        }
    }
}

impl From<ResponseTag> for u8 {
    fn from(tag: ResponseTag) -> u8 {
        tag as u8
    }
}

impl TryFrom<u8> for ResponseTag {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Self::OperationOk),
            0xE1 => Ok(Self::ErrorIllegalCommand),
            0xE5 => Ok(Self::ErrorSize),
            0xE9 => Ok(Self::ErrorParsing),
            0xEC => Ok(Self::ErrorChecksum),
            0x35 => Ok(Self::EventSwiped),
            _ => Err(Error::UnknownTag(value)),
        }
    }
}

impl fmt::Display for ResponseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_data_tags() {
        assert_eq!(u8::from(CommandTag::track_data(1)), 0xD1);
        assert_eq!(u8::from(CommandTag::track_data(2)), 0xD2);
        assert_eq!(u8::from(CommandTag::track_data(3)), 0xD3);
    }

    #[test]
    fn test_track_config_tags() {
        assert_eq!(u8::from(CommandTag::track_config(1)), 0xC1);
        assert_eq!(u8::from(CommandTag::track_config(3)), 0xC3);
    }

    #[test]
    fn test_response_tag_conversion() {
        assert_eq!(ResponseTag::try_from(0x00).unwrap(), ResponseTag::OperationOk);
        assert_eq!(ResponseTag::try_from(0xEC).unwrap(), ResponseTag::ErrorChecksum);
        assert!(ResponseTag::try_from(0x77).is_err());
    }

    #[test]
    fn test_response_tag_is_error() {
        assert!(ResponseTag::ErrorParsing.is_error());
        assert!(!ResponseTag::OperationOk.is_error());
        assert!(!ResponseTag::EventSwiped.is_error());
    }
}
