//! High-level probe driver
//!
//! Implements the synchronous request/response call protocol on top of a
//! [`Channel`]: one command in flight at a time, one bounded read per
//! command, every deviation fatal to the current operation.

use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use magprobe_core::{
    constants::{DEFAULT_TIMEOUT_MS, DRAIN_ATTEMPTS, DRAIN_TIMEOUT_MS},
    CommandTag, Frame, FrameParser, ResponseTag, Status,
};
use magprobe_transport::{into_reports, Channel};
use magprobe_types::{FirmwareVersion, Track, TrackConfig, TriggerMode};

use crate::error::{Error, Result};

/// Driver for one magnetic-stripe probe
///
/// Owns the channel and the response parser exclusively; the `&mut self`
/// receivers keep calls strictly one at a time.
///
/// # Examples
///
/// ```no_run
/// use magprobe::Probe;
/// use magprobe_transport::MemChannel;
/// use magprobe_types::{Track, TriggerMode};
///
/// #[tokio::main]
/// async fn main() -> magprobe::Result<()> {
///     let mut probe = Probe::new(MemChannel::new());
///
///     probe.reset_to_defaults().await?;
///     probe.set_track_data(Track::One, b"%TEST?").await?;
///     probe.set_trigger_mode(TriggerMode::Immediately).await?;
///     probe.arm().await?;
///     Ok(())
/// }
/// ```
pub struct Probe<C: Channel> {
    channel: C,
    parser: FrameParser,
    timeout: Duration,
}

impl<C: Channel> Probe<C> {
    /// Create a driver over an open channel
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            parser: FrameParser::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Set the response timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Access the underlying channel
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Give the channel back, consuming the driver
    pub fn into_channel(self) -> C {
        self.channel
    }

    // Call layer

    /// Send a command whose only expected response is the generic
    /// operation-OK confirmation
    pub async fn method_call(&mut self, tag: CommandTag, payload: &[u8]) -> Result<()> {
        self.send_command(tag, payload).await?;
        self.read_response().await?;

        let response_tag = self.parser.tag();
        if response_tag != ResponseTag::OperationOk.into() {
            return Err(Error::UnexpectedStatus { tag: response_tag });
        }

        debug!(command = %tag, "Method call OK");
        Ok(())
    }

    /// Send a command that returns a typed result
    ///
    /// The response must echo the request tag and carry at least
    /// `expected_len` payload bytes. Longer responses are allowed and
    /// truncated to `expected_len` (firmware may append fields in future
    /// revisions); shorter ones are an error.
    pub async fn function_call(
        &mut self,
        tag: CommandTag,
        payload: &[u8],
        expected_len: usize,
    ) -> Result<Bytes> {
        self.send_command(tag, payload).await?;
        self.read_response().await?;

        let response_tag = self.parser.tag();
        if response_tag != tag.into() {
            return Err(Error::TagMismatch {
                expected: tag.into(),
                actual: response_tag,
            });
        }

        let result = self.parser.payload();
        if result.len() < expected_len {
            return Err(Error::ShortResponse {
                expected: expected_len,
                actual: result.len(),
            });
        }

        debug!(command = %tag, len = result.len(), "Function call OK");
        Ok(result.slice(..expected_len))
    }

    /// Encode and transmit one command frame
    async fn send_command(&mut self, tag: CommandTag, payload: &[u8]) -> Result<()> {
        self.drain_stale().await;

        let frame = Frame::new(u8::from(tag), Bytes::copy_from_slice(payload));
        trace!(frame = ?frame, "Sending");
        let wire = frame.encode()?;

        for report in into_reports(&wire) {
            self.channel.send(&report).await?;
        }
        Ok(())
    }

    /// Read one transport segment and parse it into a validated frame
    ///
    /// On success the parsed frame is readable from `self.parser`.
    async fn read_response(&mut self) -> Result<()> {
        let chunk = match self.channel.receive(self.timeout).await {
            Ok(chunk) => chunk,
            Err(magprobe_transport::Error::ReadTimeout) => {
                self.parser.reset();
                return Err(Error::Timeout {
                    ms: self.timeout.as_millis() as u64,
                });
            }
            Err(e) => {
                self.parser.reset();
                return Err(e.into());
            }
        };

        trace!(len = chunk.len(), bytes = ?&chunk[..chunk.len().min(16)], "Received");

        match self.parser.feed(&chunk) {
            Ok(Status::Done) => {}
            Ok(Status::Busy) => {
                // The whole segment arrived yet no frame completed.
                self.parser.reset();
                return Err(magprobe_core::Error::Incomplete("reading response").into());
            }
            Err(e) => return Err(e.into()),
        }

        if !self.parser.checksum_ok() {
            return Err(magprobe_core::Error::ChecksumMismatch {
                computed: self.parser.computed_checksum(),
                received: self.parser.received_checksum(),
            }
            .into());
        }

        Ok(())
    }

    /// Best-effort drain of stale bytes left on the channel
    ///
    /// Some host environments keep unread bytes across close and reopen;
    /// without this the next read could return a stale prior response.
    /// Bounded and advisory: it stops at the first empty read and never
    /// fails the call.
    async fn drain_stale(&mut self) {
        let drain_timeout = Duration::from_millis(DRAIN_TIMEOUT_MS);
        for _ in 0..DRAIN_ATTEMPTS {
            match self.channel.receive(drain_timeout).await {
                Ok(stale) => {
                    warn!(len = stale.len(), "Drained stale bytes from channel");
                }
                Err(_) => return,
            }
        }
    }

    // Command encoder

    /// Reset track data and track settings to their defaults
    pub async fn reset_to_defaults(&mut self) -> Result<()> {
        self.method_call(CommandTag::DefaultConfiguration, &[]).await
    }

    /// Query the bootloader and firmware version
    pub async fn firmware_version(&mut self) -> Result<FirmwareVersion> {
        let payload = self
            .function_call(CommandTag::SoftwareVersion, &[], FirmwareVersion::SIZE)
            .await?;
        Ok(FirmwareVersion::try_from(payload.as_ref())?)
    }

    /// Load track data, re-encoding input characters into device symbols
    ///
    /// Any byte outside the track's character range rejects the command
    /// before anything is transmitted. An empty slice is valid: the probe
    /// sends nothing on that track, not even leading zeros.
    pub async fn set_track_data(&mut self, track: Track, data: &[u8]) -> Result<()> {
        let symbols = track.encode_symbols(data)?;
        self.method_call(CommandTag::track_data(track.number()), &symbols)
            .await
    }

    /// Load raw symbol values without re-encoding
    ///
    /// The probe computes parity over the whole byte and then ignores the
    /// upper bits, so setting the most significant bit of a symbol
    /// inverts the parity bit it is sent with.
    pub async fn set_track_data_raw(&mut self, track: Track, symbols: &[u8]) -> Result<()> {
        self.method_call(CommandTag::track_data(track.number()), symbols)
            .await
    }

    /// Select the trigger mode
    pub async fn set_trigger_mode(&mut self, mode: TriggerMode) -> Result<()> {
        self.method_call(CommandTag::TriggerMode, &[mode.into()]).await
    }

    /// Arm the trigger; with [`TriggerMode::Immediately`] this fires the
    /// swipe at once and the probe returns to stop-mode
    pub async fn arm(&mut self) -> Result<()> {
        self.method_call(CommandTag::TriggerArm, &[]).await
    }

    /// Disarm the trigger; unused with [`TriggerMode::Immediately`]
    pub async fn disarm(&mut self) -> Result<()> {
        self.method_call(CommandTag::TriggerDisarm, &[]).await
    }

    /// Send a track configuration
    pub async fn set_track_config(&mut self, track: Track, config: TrackConfig) -> Result<()> {
        self.method_call(CommandTag::track_config(track.number()), &config.to_bytes())
            .await
    }

    /// Override the LRC for one track with a manual value
    pub async fn set_manual_lrc(&mut self, track: Track, lrc: u8) -> Result<()> {
        self.set_track_config(track, TrackConfig::manual(lrc)).await
    }

    /// Put one track's configuration back to its default
    pub async fn set_track_config_default(&mut self, track: Track) -> Result<()> {
        self.set_track_config(track, TrackConfig::default()).await
    }

    /// Reboot the probe into its bootloader
    pub async fn start_bootloader(&mut self) -> Result<()> {
        self.method_call(CommandTag::StartBootloader, &[]).await
    }

    /// Load all three tracks and fire a swipe
    ///
    /// Convenience wrapper over the individual commands: track data,
    /// immediate trigger mode, arm.
    pub async fn swipe(&mut self, track1: &[u8], track2: &[u8], track3: &[u8]) -> Result<()> {
        self.set_track_data(Track::One, track1).await?;
        self.set_track_data(Track::Two, track2).await?;
        self.set_track_data(Track::Three, track3).await?;
        self.set_trigger_mode(TriggerMode::Immediately).await?;
        self.arm().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magprobe_core::{DLE, ETX, STX};
    use magprobe_transport::{MemChannel, REPORT_SIZE};
    use pretty_assertions::assert_eq;

    /// Encoded operation-OK status frame
    fn ok_reply() -> Vec<u8> {
        Frame::empty(ResponseTag::OperationOk.into())
            .encode()
            .unwrap()
            .to_vec()
    }

    /// Encoded function-call echo reply
    fn echo_reply(tag: CommandTag, payload: &[u8]) -> Vec<u8> {
        Frame::new(u8::from(tag), payload.to_vec())
            .encode()
            .unwrap()
            .to_vec()
    }

    fn probe_with_replies(replies: &[Vec<u8>]) -> Probe<MemChannel> {
        let mut channel = MemChannel::new();
        for reply in replies {
            channel.push_reply(reply.clone());
        }
        Probe::new(channel)
    }

    #[tokio::test]
    async fn test_method_call_ok() {
        let mut probe = probe_with_replies(&[ok_reply()]);
        probe.reset_to_defaults().await.unwrap();

        let sent = probe.channel().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].len(), REPORT_SIZE);
        // report id, then the frame head
        assert_eq!(&sent[0][..5], &[0x00, DLE, STX, 0xDC, 0x00]);
    }

    #[tokio::test]
    async fn test_method_call_error_status() {
        let reply = Frame::empty(ResponseTag::ErrorIllegalCommand.into())
            .encode()
            .unwrap()
            .to_vec();
        let mut probe = probe_with_replies(&[reply]);

        let result = probe.reset_to_defaults().await;
        assert!(matches!(result, Err(Error::UnexpectedStatus { tag: 0xE1 })));
    }

    #[tokio::test]
    async fn test_method_call_checksum_mismatch() {
        // Valid framing, deliberately wrong checksum bytes.
        let reply = vec![DLE, STX, 0x00, 0x00, 0x00, 0x12, 0x34, DLE, ETX];
        let mut probe = probe_with_replies(&[reply]);

        let result = probe.reset_to_defaults().await;
        assert!(matches!(
            result,
            Err(Error::Core(magprobe_core::Error::ChecksumMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn test_method_call_timeout() {
        let mut probe = probe_with_replies(&[]);
        let result = probe.arm().await;
        assert!(matches!(result, Err(Error::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_method_call_garbage_response() {
        // A read that delivers bytes but never a complete frame.
        let mut probe = probe_with_replies(&[vec![0x41, 0x42, 0x43]]);
        let result = probe.arm().await;
        assert!(matches!(
            result,
            Err(Error::Core(magprobe_core::Error::Incomplete(_)))
        ));
    }

    #[tokio::test]
    async fn test_function_call_echo_tag() {
        let reply = echo_reply(CommandTag::SoftwareVersion, &[1, 2, 3, 4]);
        let mut probe = probe_with_replies(&[reply]);

        let version = probe.firmware_version().await.unwrap();
        assert_eq!(version.bootloader_major, 1);
        assert_eq!(version.firmware_major, 3);
    }

    #[tokio::test]
    async fn test_function_call_tag_mismatch() {
        // OK status where the echoed tag is required.
        let mut probe = probe_with_replies(&[ok_reply()]);

        let result = probe.firmware_version().await;
        assert!(matches!(
            result,
            Err(Error::TagMismatch { expected: 0x5E, actual: 0x00 })
        ));
    }

    #[tokio::test]
    async fn test_function_call_short_response() {
        let reply = echo_reply(CommandTag::SoftwareVersion, &[1, 2]);
        let mut probe = probe_with_replies(&[reply]);

        let result = probe.firmware_version().await;
        assert!(matches!(
            result,
            Err(Error::ShortResponse { expected: 4, actual: 2 })
        ));
    }

    #[tokio::test]
    async fn test_function_call_long_response_truncated() {
        let reply = echo_reply(CommandTag::SoftwareVersion, &[1, 2, 3, 4, 5, 6]);
        let mut probe = probe_with_replies(&[reply]);

        // The two extra bytes are ignored, not an error.
        let version = probe.firmware_version().await.unwrap();
        assert_eq!(version.firmware_minor, 4);
    }

    #[tokio::test]
    async fn test_track_data_symbol_encoding_on_wire() {
        let mut probe = probe_with_replies(&[ok_reply()]);
        probe.set_track_data(Track::One, b"A").await.unwrap();

        let sent = probe.channel().sent();
        // report id, DLE STX, tag 0xD1, length 1, symbol 0x21
        assert_eq!(&sent[0][..7], &[0x00, DLE, STX, 0xD1, 0x00, 0x01, 0x21]);
    }

    #[tokio::test]
    async fn test_track_data_rejected_before_send() {
        let mut probe = probe_with_replies(&[ok_reply()]);

        let result = probe.set_track_data(Track::One, &[0x19]).await;
        assert!(matches!(result, Err(Error::Types(_))));
        // Validation failed before transmission.
        assert!(probe.channel().sent().is_empty());
    }

    #[tokio::test]
    async fn test_track2_symbol_encoding() {
        let mut probe = probe_with_replies(&[ok_reply()]);
        probe.set_track_data(Track::Two, &[0x35]).await.unwrap();

        let sent = probe.channel().sent();
        assert_eq!(&sent[0][..7], &[0x00, DLE, STX, 0xD2, 0x00, 0x01, 0x05]);
    }

    #[tokio::test]
    async fn test_trigger_mode_payload() {
        let mut probe = probe_with_replies(&[ok_reply()]);
        probe.set_trigger_mode(TriggerMode::Immediately).await.unwrap();

        let sent = probe.channel().sent();
        assert_eq!(&sent[0][..7], &[0x00, DLE, STX, 0x73, 0x00, 0x01, 0x01]);
    }

    #[tokio::test]
    async fn test_track_config_wire_structure() {
        let mut probe = probe_with_replies(&[ok_reply()]);
        probe.set_manual_lrc(Track::Three, 0x8B).await.unwrap();

        let sent = probe.channel().sent();
        // tag 0xC3, length 8, [manual mode, six zeros, lrc]
        assert_eq!(
            &sent[0][..14],
            &[0x00, DLE, STX, 0xC3, 0x00, 0x08, 0x03, 0, 0, 0, 0, 0, 0, 0x8B]
        );
    }

    #[tokio::test]
    async fn test_long_command_spans_reports() {
        // 100 symbols encode into a frame longer than one 64-byte segment.
        let data = vec![b'0'; 100];
        let mut probe = probe_with_replies(&[ok_reply()]);
        probe.set_track_data(Track::Two, &data).await.unwrap();

        let sent = probe.channel().sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0][0], 0x00);
        assert_eq!(sent[1][0], 0x00);
    }

    #[tokio::test]
    async fn test_stale_bytes_drained_before_send() {
        let mut channel = MemChannel::new();
        channel.push_stale(vec![0xDE, 0xAD]);
        channel.push_stale(vec![0xBE, 0xEF]);
        channel.push_reply(ok_reply());

        let mut probe = Probe::new(channel);
        probe.reset_to_defaults().await.unwrap();
    }

    #[tokio::test]
    async fn test_swipe_sequence() {
        // Five method calls: three tracks, trigger mode, arm.
        let replies = vec![ok_reply(); 5];
        let mut probe = probe_with_replies(&replies);

        probe.swipe(b"%TEST?", b";12=9?", b"").await.unwrap();

        let sent = probe.channel().sent();
        assert_eq!(sent.len(), 5);
        assert_eq!(sent[0][3], 0xD1);
        assert_eq!(sent[1][3], 0xD2);
        assert_eq!(sent[2][3], 0xD3);
        assert_eq!(sent[3][3], 0x73);
        assert_eq!(sent[4][3], 0x7A);
    }

    #[tokio::test]
    async fn test_recovery_to_clean_parser_after_timeout() {
        let mut channel = MemChannel::new();
        // First exchange: a partial frame, then silence on the next read.
        channel.push_reply(vec![DLE, STX, 0x00, 0x00]);
        channel.push_reply(ok_reply());

        let mut probe = Probe::new(channel);
        assert!(probe.arm().await.is_err());

        // Second call parses a fresh frame from a clean state.
        probe.disarm().await.unwrap();
    }
}
