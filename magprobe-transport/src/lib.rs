//! Transport layer for the probe protocol
//!
//! The probe is reached through an opaque duplex byte channel; opening
//! and enumerating the underlying device is outside this crate. What it
//! does own is the [`Channel`] abstraction, the segmentation of encoded
//! frames into fixed-size HID reports, and an in-memory channel used by
//! tests and demos.

pub mod error;
pub mod mem;
pub mod report;

pub use error::{Error, Result};
pub use mem::MemChannel;
pub use report::{into_reports, REPORT_DATA_SIZE, REPORT_SIZE};

use async_trait::async_trait;
use bytes::BytesMut;
use std::time::Duration;

/// Duplex byte channel to the probe
///
/// Writes block until the segment is accepted; reads block up to the
/// given timeout and fail with [`Error::ReadTimeout`] when nothing
/// arrives. One call is in flight at a time by construction: every
/// operation takes `&mut self`.
#[async_trait]
pub trait Channel: Send {
    /// Send one transport segment
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive one transport segment within the timeout
    async fn receive(&mut self, timeout: Duration) -> Result<BytesMut>;

    /// Human-readable identification of the endpoint, for logging
    fn description(&self) -> String;
}
