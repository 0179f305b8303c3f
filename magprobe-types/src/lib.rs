//! Type definitions for magprobe

pub mod config;
pub mod error;
pub mod track;
pub mod version;

pub use config::{LrcGeneration, TrackConfig, TriggerMode};
pub use error::{Error, Result};
pub use track::Track;
pub use version::FirmwareVersion;
