//! Protocol constants

/// USB vendor id of the probe
pub const PROBE_VID: u16 = 0x2B2F;

/// USB product id of the probe
pub const PROBE_PID: u16 = 0x0001;

/// Default response timeout (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Number of short reads used to drain stale bytes before a send
pub const DRAIN_ATTEMPTS: usize = 5;

/// Timeout of a single drain read (milliseconds)
pub const DRAIN_TIMEOUT_MS: u64 = 1;

/// Track data limits enforced by the probe firmware
pub mod track_limits {
    /// Maximum symbols on track 1 (7 bits per symbol, 210 bpi)
    pub const TRACK1_MAX_SYMBOLS: usize = 85;

    /// Maximum symbols on tracks 2 and 3 (5 bits per symbol)
    pub const TRACK23_MAX_SYMBOLS: usize = 120;
}
