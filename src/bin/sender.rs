//! Audio Sender Application
//!
//! Mixes configured test tones and packetizes the result into RTP packets,
//! one mixer read per packet tick. Packets go to a sink thread that counts
//! them.

use anyhow::{anyhow, bail, Result};
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lan_audio_packetizer::{
    audio::{source_handle, BufferPool, Frame, Mixer, Packetizer, Sample, ToneSource},
    codec::PcmEncoder,
    config::AppConfig,
    packet::{ChannelWriter, ComposingWriter, PacketPool, RtpComposer},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting audio packetizer sender");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            AppConfig::load(&path)?
        }
        None => AppConfig::default(),
    };

    let sample_pool: BufferPool<Sample> = BufferPool::new(
        config.pools.sample_buffer_size,
        config.pools.sample_buffer_count,
    );
    let mut mixer = Mixer::new(&sample_pool);
    if !mixer.valid() {
        bail!("mixer: can't allocate temporary buffer");
    }

    let num_channels = config.packetizer.num_channels();
    for tone in &config.sender.tones {
        mixer.add(source_handle(ToneSource::new(
            tone.frequency,
            tone.amplitude,
            config.packetizer.sample_rate,
            num_channels,
        )));
        tracing::info!("Added tone {} Hz at {:.2}", tone.frequency, tone.amplitude);
    }

    let (channel_writer, rx) = ChannelWriter::bounded(config.sender.queue_capacity);
    let mut packetizer = Packetizer::with_random_state(
        ComposingWriter::new(channel_writer),
        RtpComposer::new(),
        PcmEncoder::new(config.packetizer.channels),
        PacketPool::new(config.pools.packet_count),
        BufferPool::new(config.pools.buffer_size, config.pools.buffer_count),
        &config.packetizer,
    )?;

    tracing::info!(
        "Packetizer initialized: ssrc={:#010x} {}Hz, {} channels, {} samples/packet, {} byte payload",
        packetizer.source_id(),
        config.packetizer.sample_rate,
        num_channels,
        packetizer.samples_per_packet(),
        packetizer.payload_size()
    );

    let sink = std::thread::Builder::new()
        .name("packet-sink".into())
        .spawn(move || {
            let mut packets = 0u64;
            let mut bytes = 0u64;
            for packet in rx.iter() {
                packets += 1;
                bytes += packet.data().len() as u64;
            }
            (packets, bytes)
        })?;

    // One mixer read per packet keeps the packetizer closed between ticks
    let frame_len = packetizer.samples_per_packet() * num_channels;
    if frame_len > sample_pool.buffer_size() {
        bail!(
            "sample buffers hold {} samples, a packet needs {}",
            sample_pool.buffer_size(),
            frame_len
        );
    }
    let mut frame_buf: Vec<Sample> = vec![0.0; frame_len];

    // Tick at the real duration of a packet so the RTP clock tracks wall time
    let mut ticker = tokio::time::interval(config.packetizer.packet_duration());
    let deadline = Instant::now() + Duration::from_secs(config.sender.run_seconds);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    tracing::info!("Starting main loop - press Ctrl+C to stop");

    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                break;
            }
        }
        if Instant::now() >= deadline {
            break;
        }

        let mut frame = Frame::new(&mut frame_buf);
        mixer.read(&mut frame);
        packetizer.write(&frame);
        ticks += 1;

        // Periodic stats logging
        if ticks % 1000 == 0 {
            let stats = packetizer.stats();
            tracing::info!(
                "Stats: {} packets sent, {} samples written, {} samples dropped",
                stats.packets_sent,
                stats.samples_written,
                stats.samples_dropped
            );
        }
    }

    packetizer.flush();
    let stats = packetizer.stats().clone();
    let dropped = packetizer.writer().inner().dropped();
    drop(packetizer);

    let (packets, bytes) = sink
        .join()
        .map_err(|_| anyhow!("packet sink thread panicked"))?;

    tracing::info!(
        "Done: {} packets sent ({} padded), {} received by sink, {:.1} KB, {} dropped by writer",
        stats.packets_sent,
        stats.padded_packets,
        packets,
        bytes as f64 / 1024.0,
        dropped
    );

    Ok(())
}
