//! Sample encoder capability

use crate::audio::sample::Sample;
use crate::packet::{ChannelMask, Packet};

/// Converts raw samples into packet payload bytes
pub trait Encoder {
    /// Payload bytes needed for `samples_per_channel` samples of every channel
    fn payload_size(&self, samples_per_channel: usize) -> usize;

    /// Encode interleaved `samples` into `packet` starting at per-channel
    /// sample `offset`.
    ///
    /// Writes as many samples as fit in the packet payload and returns the
    /// number written, per channel.
    fn write_samples(
        &mut self,
        packet: &mut Packet,
        offset: usize,
        samples: &[Sample],
        channels: ChannelMask,
    ) -> usize;
}

/// Encoder statistics
#[derive(Debug, Clone, Default)]
pub struct EncoderStats {
    pub samples_encoded: u64,
    pub bytes_produced: u64,
}
