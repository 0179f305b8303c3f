//! Full swipe sequence against a scripted in-memory probe
//!
//! Mirrors the exchange a real probe sees: reset, version query, track
//! data for all three tracks, trigger mode, arm.

use magprobe::{CommandTag, Frame, Probe, ResponseTag};
use magprobe_transport::MemChannel;

fn ok_reply() -> Vec<u8> {
    Frame::empty(ResponseTag::OperationOk.into())
        .encode()
        .expect("status frame fits")
        .to_vec()
}

#[tokio::main]
async fn main() -> magprobe::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut channel = MemChannel::new();
    // reset
    channel.push_reply(ok_reply());
    // firmware version: echoed tag, four version bytes
    channel.push_reply(
        Frame::new(u8::from(CommandTag::SoftwareVersion), vec![1, 0, 2, 4])
            .encode()
            .expect("version frame fits")
            .to_vec(),
    );
    // three tracks, trigger mode, arm
    for _ in 0..5 {
        channel.push_reply(ok_reply());
    }

    let mut probe = Probe::new(channel);

    probe.reset_to_defaults().await?;

    let version = probe.firmware_version().await?;
    println!("Probe {}", version);

    println!("Swiping card...");
    probe
        .swipe(b"%B1234567890123445^DOE/JOHN?", b";1234567890123445=990112009999?", b"")
        .await?;

    let track1_command = probe.channel().sent()[2].clone();
    println!(
        "Track 1 command on the wire: {:02X?}...",
        &track1_command[..16]
    );

    println!("Done!");
    Ok(())
}
