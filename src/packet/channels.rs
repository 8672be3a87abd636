//! Channel masks and sample-clock conversions

use std::time::Duration;

/// Bitmask of channels present in a stream, bit 0 = left, bit 1 = right, ...
pub type ChannelMask = u32;

/// Mono channel mask
pub const CHANNEL_MASK_MONO: ChannelMask = 0x1;

/// Stereo channel mask
pub const CHANNEL_MASK_STEREO: ChannelMask = 0x3;

/// Get number of channels in a mask
pub fn num_channels(mask: ChannelMask) -> usize {
    mask.count_ones() as usize
}

/// Convert a duration to a sample count at `sample_rate`, rounded to nearest
pub fn timestamp_from_duration(duration: Duration, sample_rate: u32) -> u64 {
    let nanos = duration.as_nanos() * sample_rate as u128;
    ((nanos + 500_000_000) / 1_000_000_000) as u64
}

/// Convert a sample count at `sample_rate` back to a duration
pub fn timestamp_to_duration(samples: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    let nanos = samples as u128 * 1_000_000_000 / sample_rate as u128;
    Duration::from_nanos(nanos as u64)
}
