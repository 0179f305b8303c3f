//! Trigger and track configuration structures

use std::fmt;

/// Swipe trigger mode
///
/// Only [`Immediately`](TriggerMode::Immediately) is implemented by
/// current hardware; the other values are part of the wire contract but
/// the probe will reject them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum TriggerMode {
    /// Swipe immediately on each arm command while data is loaded; the
    /// probe returns to stop-mode right after the swipe
    Immediately = 0x01,

    /// Swipe once on detect after arming (not supported in hardware)
    Single = 0x05,

    /// Swipe on every detect after arming until disarmed (not supported
    /// in hardware)
    Auto = 0x0A,
}

impl From<TriggerMode> for u8 {
    fn from(mode: TriggerMode) -> u8 {
        mode as u8
    }
}

/// How the probe produces a track's LRC
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum LrcGeneration {
    /// The probe computes the LRC itself
    Auto = 0x0A,

    /// The LRC value is supplied by the caller
    Manual = 0x03,
}

impl From<LrcGeneration> for u8 {
    fn from(mode: LrcGeneration) -> u8 {
        mode as u8
    }
}

/// Per-track configuration
///
/// Serializes to the fixed 8-byte structure the firmware expects. The
/// half-bit-time and pre/post-run-zero fields of that structure are
/// deprecated and always sent as zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TrackConfig {
    /// LRC generation mode
    pub lrc_generation: LrcGeneration,

    /// LRC value used when generation is [`LrcGeneration::Manual`].
    /// Setting the most significant bit inverts the parity bit the probe
    /// sends with it.
    pub manual_lrc: u8,
}

impl TrackConfig {
    /// Size of the wire structure
    pub const SIZE: usize = 8;

    /// Manual LRC configuration with the given value
    pub fn manual(lrc: u8) -> Self {
        Self {
            lrc_generation: LrcGeneration::Manual,
            manual_lrc: lrc,
        }
    }

    /// Serialize to the 8-byte wire structure
    ///
    /// Layout: `[lrc_mode, 0, 0, 0, 0, 0, 0, manual_lrc]` - the six zero
    /// bytes are the deprecated fields.
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0] = self.lrc_generation.into();
        bytes[7] = self.manual_lrc;
        bytes
    }
}

impl Default for TrackConfig {
    /// Probe default: automatic LRC generation
    fn default() -> Self {
        Self {
            lrc_generation: LrcGeneration::Auto,
            manual_lrc: 0,
        }
    }
}

impl fmt::Display for TrackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lrc_generation {
            LrcGeneration::Auto => write!(f, "TrackConfig[lrc=auto]"),
            LrcGeneration::Manual => {
                write!(f, "TrackConfig[lrc=manual 0x{:02X}]", self.manual_lrc)
            }
        }
    }
}
