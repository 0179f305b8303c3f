//! # magprobe
//!
//! Driver for a USB-attached probe that emulates a magnetic-stripe card
//! swipe.
//!
//! ## Features
//!
//! - Escaped, checksummed frame protocol with an incremental parser
//! - Synchronous request/response calls, one in flight at a time
//! - Typed commands: track data, trigger control, track configuration,
//!   firmware version
//! - Channel abstraction, so the USB layer stays pluggable and calls are
//!   testable against an in-memory probe
//!
//! ## Quick Start
//!
//! ```no_run
//! use magprobe::Probe;
//! use magprobe_transport::MemChannel;
//! use magprobe_types::Track;
//!
//! #[tokio::main]
//! async fn main() -> magprobe::Result<()> {
//!     let mut probe = Probe::new(MemChannel::new());
//!
//!     probe.reset_to_defaults().await?;
//!     let version = probe.firmware_version().await?;
//!     println!("{}", version);
//!
//!     probe.swipe(b"%TEST?", b";12=9?", b"").await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod probe;

// Re-exports
pub use error::{Error, Result};
pub use probe::Probe;

// Re-export protocol types
pub use magprobe_core::{CommandTag, Frame, FrameParser, ResponseTag};
pub use magprobe_transport::Channel;
pub use magprobe_types::{FirmwareVersion, Track, TrackConfig, TriggerMode};
