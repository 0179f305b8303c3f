//! Query the firmware version from a scripted probe

use magprobe::{CommandTag, Frame, Probe};
use magprobe_transport::MemChannel;

#[tokio::main]
async fn main() -> magprobe::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let mut channel = MemChannel::new();
    channel.push_reply(
        Frame::new(u8::from(CommandTag::SoftwareVersion), vec![1, 0, 3, 7])
            .encode()
            .expect("version frame fits")
            .to_vec(),
    );

    let mut probe = Probe::new(channel);
    let version = probe.firmware_version().await?;

    println!("{}", version);
    Ok(())
}
