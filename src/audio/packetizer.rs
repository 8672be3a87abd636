//! Frame to packet segmentation
//!
//! The packetizer slices a continuous interleaved stream into packets of
//! `samples_per_packet` samples each. Every dispatched packet has the same
//! payload size; a short final packet is padded, but its timestamp delta is
//! the number of samples it really carries.
//!
//! Nothing here blocks or retries. When a packet can't be opened because a
//! pool is exhausted, the rest of the current `write` is dropped.

use rand::Rng;

use super::buffer::BufferPool;
use super::frame::Frame;
use crate::codec::Encoder;
use crate::config::PacketizerConfig;
use crate::error::{fatal, ConfigError, ContractViolation};
use crate::packet::{
    ChannelMask, Composer, Packet, PacketFlags, PacketPool, PacketWriter, PayloadType, Seqnum,
    SourceId, Timestamp,
};

/// Packetizer statistics
#[derive(Debug, Clone, Default)]
pub struct PacketizerStats {
    pub packets_sent: u64,
    pub padded_packets: u64,
    /// Samples per channel encoded into packets
    pub samples_written: u64,
    /// Samples per channel discarded after a failed packet allocation
    pub samples_dropped: u64,
    pub allocation_failures: u64,
}

/// Turns a mixed stream into fixed-size RTP packets
pub struct Packetizer<W, C, E> {
    writer: W,
    composer: C,
    encoder: E,
    packet_pool: PacketPool,
    buffer_pool: BufferPool<u8>,

    channels: ChannelMask,
    num_channels: usize,
    samples_per_packet: usize,
    payload_type: PayloadType,
    payload_size: usize,

    /// Open packet, owned until dispatch
    packet: Option<Packet>,
    packet_pos: usize,

    source: SourceId,
    seqnum: Seqnum,
    timestamp: Timestamp,

    stats: PacketizerStats,
}

impl<W, C, E> Packetizer<W, C, E>
where
    W: PacketWriter,
    C: Composer,
    E: Encoder,
{
    /// Create a packetizer.
    ///
    /// Fails when the config is invalid or a full packet doesn't fit the
    /// buffers of `buffer_pool`.
    ///
    /// Source id, first sequence number and first timestamp are drawn from
    /// `rng` over their full ranges, so independent streams sharing a
    /// transport don't collide.
    pub fn new<R: Rng + ?Sized>(
        writer: W,
        composer: C,
        encoder: E,
        packet_pool: PacketPool,
        buffer_pool: BufferPool<u8>,
        config: &PacketizerConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let num_channels = config.num_channels();
        let samples_per_packet = config.samples_per_packet();
        let payload_size = encoder.payload_size(samples_per_packet);

        let packet_size = composer.packet_size(payload_size);
        if packet_size > buffer_pool.buffer_size() {
            return Err(ConfigError::PacketBuffer {
                needed: packet_size,
                capacity: buffer_pool.buffer_size(),
            });
        }

        tracing::debug!(
            "packetizer: initializing: n_channels={} samples_per_packet={} payload_size={}",
            num_channels,
            samples_per_packet,
            payload_size
        );

        Ok(Self {
            writer,
            composer,
            encoder,
            packet_pool,
            buffer_pool,
            channels: config.channels,
            num_channels,
            samples_per_packet,
            payload_type: config.payload_type,
            payload_size,
            packet: None,
            packet_pos: 0,
            source: rng.gen(),
            seqnum: rng.gen(),
            timestamp: rng.gen(),
            stats: PacketizerStats::default(),
        })
    }

    /// Create a packetizer seeded from the thread-local generator
    pub fn with_random_state(
        writer: W,
        composer: C,
        encoder: E,
        packet_pool: PacketPool,
        buffer_pool: BufferPool<u8>,
        config: &PacketizerConfig,
    ) -> Result<Self, ConfigError> {
        Self::new(
            writer,
            composer,
            encoder,
            packet_pool,
            buffer_pool,
            config,
            &mut rand::thread_rng(),
        )
    }

    /// Packetize an interleaved frame.
    pub fn write(&mut self, frame: &Frame<'_>) {
        if frame.len() % self.num_channels != 0 {
            fatal(ContractViolation::FrameSize {
                size: frame.len(),
                channels: self.num_channels,
            });
        }

        let mut samples = frame.samples();

        while !samples.is_empty() {
            let mut packet = match self.packet.take() {
                Some(packet) => packet,
                None => match self.begin_packet() {
                    Some(packet) => packet,
                    None => {
                        self.stats.samples_dropped += (samples.len() / self.num_channels) as u64;
                        return;
                    }
                },
            };

            let room = self.samples_per_packet - self.packet_pos;
            let available = samples.len() / self.num_channels;
            let written =
                self.encoder
                    .write_samples(&mut packet, self.packet_pos, samples, self.channels);

            if written == 0 || written > room.min(available) {
                fatal(ContractViolation::EncoderWrite {
                    room: room.min(available),
                    written,
                });
            }

            self.packet_pos += written;
            self.stats.samples_written += written as u64;
            samples = &samples[written * self.num_channels..];

            if self.packet_pos == self.samples_per_packet {
                self.end_packet(packet);
            } else {
                self.packet = Some(packet);
            }
        }
    }

    /// Dispatch the partially filled packet, if any.
    pub fn flush(&mut self) {
        if let Some(packet) = self.packet.take() {
            self.end_packet(packet);
        }
    }

    pub fn source_id(&self) -> SourceId {
        self.source
    }

    /// Sequence number of the next packet to be opened
    pub fn next_seqnum(&self) -> Seqnum {
        self.seqnum
    }

    /// Timestamp of the next packet to be opened
    pub fn next_timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Samples per channel in a full packet
    pub fn samples_per_packet(&self) -> usize {
        self.samples_per_packet
    }

    /// Fixed payload size of every dispatched packet, padding included
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Whether a partially filled packet is pending
    pub fn has_pending(&self) -> bool {
        self.packet.is_some()
    }

    /// Get statistics
    pub fn stats(&self) -> &PacketizerStats {
        &self.stats
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    fn begin_packet(&mut self) -> Option<Packet> {
        let mut packet = self.create_packet()?;

        let Some(rtp) = packet.rtp_mut() else {
            fatal(ContractViolation::NonRtpPacket);
        };

        rtp.source = self.source;
        rtp.seqnum = self.seqnum;
        rtp.timestamp = self.timestamp;
        rtp.payload_type = self.payload_type;

        Some(packet)
    }

    fn end_packet(&mut self, mut packet: Packet) {
        if self.packet_pos < self.samples_per_packet {
            self.pad_packet(&mut packet);
        }

        self.writer.write(packet);
        self.stats.packets_sent += 1;

        self.seqnum = self.seqnum.wrapping_add(1);
        self.timestamp = self.timestamp.wrapping_add(self.packet_pos as Timestamp);

        self.packet_pos = 0;
    }

    fn pad_packet(&mut self, packet: &mut Packet) {
        let actual_payload_size = self.encoder.payload_size(self.packet_pos);
        if actual_payload_size > self.payload_size {
            fatal(ContractViolation::PayloadOverflow {
                expected: self.payload_size,
                actual: actual_payload_size,
            });
        }

        if actual_payload_size == self.payload_size {
            return;
        }

        if let Err(reason) = self
            .composer
            .pad(packet, self.payload_size - actual_payload_size)
        {
            fatal(ContractViolation::Padding {
                expected: self.payload_size,
                actual: actual_payload_size,
                reason,
            });
        }

        self.stats.padded_packets += 1;
    }

    fn create_packet(&mut self) -> Option<Packet> {
        let mut packet = match self.packet_pool.allocate() {
            Ok(packet) => packet,
            Err(e) => {
                tracing::error!("packetizer: can't allocate packet: {}", e);
                self.stats.allocation_failures += 1;
                return None;
            }
        };

        packet.add_flags(PacketFlags::AUDIO);

        let data = match self.buffer_pool.allocate() {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("packetizer: can't allocate buffer: {}", e);
                self.stats.allocation_failures += 1;
                return None;
            }
        };

        if let Err(e) = self.composer.prepare(&mut packet, data, self.payload_size) {
            tracing::error!("packetizer: can't prepare packet: {}", e);
            self.stats.allocation_failures += 1;
            return None;
        }

        Some(packet)
    }
}
