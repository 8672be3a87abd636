//! L16 PCM encoder
//!
//! Signed 16-bit big-endian interleaved samples, the RTP `L16` format.

use bytes::BufMut;

use super::encoder::{Encoder, EncoderStats};
use crate::audio::sample::{clamp_sample, Sample};
use crate::error::{fatal, ContractViolation};
use crate::packet::{num_channels, ChannelMask, Packet};

/// Bytes per encoded sample
pub const PCM_SAMPLE_SIZE: usize = 2;

/// L16 encoder for a fixed channel layout
pub struct PcmEncoder {
    channels: ChannelMask,
    num_channels: usize,
    stats: EncoderStats,
}

impl PcmEncoder {
    pub fn new(channels: ChannelMask) -> Self {
        Self {
            channels,
            num_channels: num_channels(channels),
            stats: EncoderStats::default(),
        }
    }

    pub fn channels(&self) -> ChannelMask {
        self.channels
    }

    /// Get statistics
    pub fn stats(&self) -> &EncoderStats {
        &self.stats
    }
}

impl Encoder for PcmEncoder {
    fn payload_size(&self, samples_per_channel: usize) -> usize {
        samples_per_channel * self.num_channels * PCM_SAMPLE_SIZE
    }

    fn write_samples(
        &mut self,
        packet: &mut Packet,
        offset: usize,
        samples: &[Sample],
        channels: ChannelMask,
    ) -> usize {
        if channels != self.channels {
            fatal(ContractViolation::ChannelMask {
                expected: self.channels,
                actual: channels,
            });
        }

        let frame_bytes = self.num_channels * PCM_SAMPLE_SIZE;
        let payload = packet.payload_mut();
        let room = (payload.len() / frame_bytes).saturating_sub(offset);
        let count = room.min(samples.len() / self.num_channels);
        if count == 0 {
            return 0;
        }

        let mut out = &mut payload[offset * frame_bytes..(offset + count) * frame_bytes];
        for &s in &samples[..count * self.num_channels] {
            out.put_i16(sample_to_i16(s));
        }

        self.stats.samples_encoded += count as u64;
        self.stats.bytes_produced += (count * frame_bytes) as u64;
        count
    }
}

fn sample_to_i16(s: Sample) -> i16 {
    (clamp_sample(s) * i16::MAX as Sample).round() as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::BufferPool;
    use crate::packet::{Composer, PacketPool, RtpComposer, CHANNEL_MASK_MONO, CHANNEL_MASK_STEREO};

    fn packet_with_payload(payload_size: usize) -> Packet {
        let packets = PacketPool::new(1);
        let bytes = BufferPool::new(128, 1);
        let mut packet = packets.allocate().unwrap();
        RtpComposer
            .prepare(&mut packet, bytes.allocate().unwrap(), payload_size)
            .unwrap();
        packet
    }

    #[test]
    fn test_payload_size() {
        assert_eq!(PcmEncoder::new(CHANNEL_MASK_STEREO).payload_size(10), 40);
        assert_eq!(PcmEncoder::new(CHANNEL_MASK_MONO).payload_size(10), 20);
    }

    #[test]
    fn test_write_samples_big_endian() {
        let mut encoder = PcmEncoder::new(CHANNEL_MASK_STEREO);
        let mut packet = packet_with_payload(encoder.payload_size(2));

        let n = encoder.write_samples(&mut packet, 0, &[1.0, -1.0, 0.0, 2.0], CHANNEL_MASK_STEREO);
        assert_eq!(n, 2);
        assert_eq!(packet.payload(), &[0x7f, 0xff, 0x80, 0x01, 0x00, 0x00, 0x7f, 0xff]);
        assert_eq!(encoder.stats().bytes_produced, 8);
    }

    #[test]
    fn test_write_samples_stops_at_room() {
        let mut encoder = PcmEncoder::new(CHANNEL_MASK_MONO);
        let mut packet = packet_with_payload(encoder.payload_size(4));

        assert_eq!(encoder.write_samples(&mut packet, 0, &[0.5; 3], CHANNEL_MASK_MONO), 3);
        assert_eq!(encoder.write_samples(&mut packet, 3, &[0.5; 3], CHANNEL_MASK_MONO), 1);
        assert_eq!(encoder.write_samples(&mut packet, 4, &[0.5; 3], CHANNEL_MASK_MONO), 0);
        assert_eq!(encoder.stats().samples_encoded, 4);
    }

    #[test]
    #[should_panic(expected = "doesn't match encoder mask")]
    fn test_channel_mask_mismatch_is_fatal() {
        let mut encoder = PcmEncoder::new(CHANNEL_MASK_STEREO);
        let mut packet = packet_with_payload(8);
        encoder.write_samples(&mut packet, 0, &[0.0; 2], CHANNEL_MASK_MONO);
    }
}
