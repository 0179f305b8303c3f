//! In-memory channel
//!
//! Simulates a probe endpoint for tests and demos: stale bytes are
//! readable at any time (they model unread data left over from a prior
//! run), scripted replies become readable only after a send, the way a
//! real probe only answers after a command. Every sent segment is
//! recorded for inspection.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tracing::trace;

use crate::{error::*, Channel};

/// Scripted in-memory channel
///
/// # Examples
///
/// ```
/// use magprobe_transport::MemChannel;
///
/// let mut channel = MemChannel::new();
/// channel.push_reply(vec![0x01, 0x02]);
/// channel.push_stale(vec![0xFF]);
/// ```
#[derive(Default)]
pub struct MemChannel {
    /// Bytes readable immediately, before any send
    stale: VecDeque<Vec<u8>>,
    /// Replies released one per completed command exchange
    replies: VecDeque<Vec<u8>>,
    /// True after a send until the pending reply is consumed
    awaiting_reply: bool,
    /// Every segment passed to `send`, in order
    sent: Vec<Vec<u8>>,
    closed: bool,
}

impl MemChannel {
    /// Create an empty channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply segment, released after the next send
    pub fn push_reply(&mut self, reply: impl Into<Vec<u8>>) {
        self.replies.push_back(reply.into());
    }

    /// Queue stale bytes, readable before any send
    pub fn push_stale(&mut self, stale: impl Into<Vec<u8>>) {
        self.stale.push_back(stale.into());
    }

    /// Segments sent so far
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// All sent bytes joined into one stream
    pub fn sent_bytes(&self) -> Vec<u8> {
        self.sent.iter().flatten().copied().collect()
    }

    /// Simulate the device going away
    pub fn close(&mut self) {
        self.closed = true;
    }
}

#[async_trait]
impl Channel for MemChannel {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        trace!(len = data.len(), "MemChannel send");
        self.sent.push(data.to_vec());
        self.awaiting_reply = true;
        Ok(())
    }

    async fn receive(&mut self, timeout: Duration) -> Result<BytesMut> {
        if self.closed {
            return Err(Error::Closed);
        }

        if let Some(stale) = self.stale.pop_front() {
            trace!(len = stale.len(), "MemChannel receive (stale)");
            return Ok(BytesMut::from(&stale[..]));
        }

        if self.awaiting_reply {
            if let Some(reply) = self.replies.pop_front() {
                self.awaiting_reply = false;
                trace!(len = reply.len(), "MemChannel receive (reply)");
                return Ok(BytesMut::from(&reply[..]));
            }
        }

        // Nothing to deliver: wait out the bound like a blocking read.
        tokio::time::sleep(timeout).await;
        Err(Error::ReadTimeout)
    }

    fn description(&self) -> String {
        "mem".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const T: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn test_reply_only_after_send() {
        let mut channel = MemChannel::new();
        channel.push_reply(vec![0xAA]);

        // No send yet: the reply is held back.
        assert!(matches!(channel.receive(T).await, Err(Error::ReadTimeout)));

        channel.send(&[0x01]).await.unwrap();
        let reply = channel.receive(T).await.unwrap();
        assert_eq!(reply.as_ref(), &[0xAA]);

        // Consumed; further reads time out again.
        assert!(matches!(channel.receive(T).await, Err(Error::ReadTimeout)));
    }

    #[tokio::test]
    async fn test_stale_bytes_first() {
        let mut channel = MemChannel::new();
        channel.push_stale(vec![0xFF, 0xFE]);
        channel.push_reply(vec![0xAA]);
        channel.send(&[0x01]).await.unwrap();

        assert_eq!(channel.receive(T).await.unwrap().as_ref(), &[0xFF, 0xFE]);
        assert_eq!(channel.receive(T).await.unwrap().as_ref(), &[0xAA]);
    }

    #[tokio::test]
    async fn test_sent_recording() {
        let mut channel = MemChannel::new();
        channel.send(&[0x01, 0x02]).await.unwrap();
        channel.send(&[0x03]).await.unwrap();

        assert_eq!(channel.sent().len(), 2);
        assert_eq!(channel.sent_bytes(), vec![0x01, 0x02, 0x03]);
    }

    #[tokio::test]
    async fn test_closed_channel() {
        let mut channel = MemChannel::new();
        channel.close();
        assert!(matches!(channel.send(&[0x01]).await, Err(Error::Closed)));
        assert!(matches!(channel.receive(T).await, Err(Error::Closed)));
    }
}
