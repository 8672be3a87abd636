//! Configuration
//!
//! Loaded from TOML; every section and field has a default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::*;
use crate::error::{ConfigError, Result};
use crate::packet::channels::{
    num_channels, timestamp_from_duration, timestamp_to_duration, ChannelMask,
};
use crate::packet::types::{PayloadType, MAX_PAYLOAD_TYPE};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub packetizer: PacketizerConfig,
    pub pools: PoolConfig,
    pub sender: SenderConfig,
}

impl AppConfig {
    /// Read and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&text)?)
    }

    pub fn from_toml_str(text: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.packetizer.validate()?;
        self.pools.validate()
    }
}

/// Stream layout and packet cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketizerConfig {
    /// Channel bitmask
    pub channels: ChannelMask,
    /// Target packet duration in milliseconds
    pub packet_length_ms: f64,
    pub sample_rate: u32,
    /// RTP payload type, 7 bits
    pub payload_type: PayloadType,
}

impl Default for PacketizerConfig {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNEL_MASK,
            packet_length_ms: DEFAULT_PACKET_LENGTH_MS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            payload_type: DEFAULT_PAYLOAD_TYPE,
        }
    }
}

impl PacketizerConfig {
    pub fn num_channels(&self) -> usize {
        num_channels(self.channels)
    }

    pub fn packet_length(&self) -> Duration {
        Duration::from_secs_f64(self.packet_length_ms.max(0.0) / 1000.0)
    }

    /// Samples per channel in one full packet
    pub fn samples_per_packet(&self) -> usize {
        timestamp_from_duration(self.packet_length(), self.sample_rate) as usize
    }

    /// Wall-clock length of one full packet.
    ///
    /// Differs from `packet_length` when the packet length isn't a whole
    /// number of samples.
    pub fn packet_duration(&self) -> Duration {
        timestamp_to_duration(self.samples_per_packet() as u64, self.sample_rate)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.num_channels() == 0 {
            return Err(ConfigError::NoChannels);
        }
        if self.samples_per_packet() == 0 {
            return Err(ConfigError::EmptyPacket {
                length_ms: self.packet_length_ms,
                sample_rate: self.sample_rate,
            });
        }
        if self.payload_type > MAX_PAYLOAD_TYPE {
            return Err(ConfigError::PayloadType(self.payload_type));
        }
        Ok(())
    }
}

/// Pool sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum live packets
    pub packet_count: usize,
    /// Maximum live byte buffers
    pub buffer_count: usize,
    /// Capacity of each byte buffer
    pub buffer_size: usize,
    /// Maximum live sample buffers
    pub sample_buffer_count: usize,
    /// Capacity of each sample buffer, in samples
    pub sample_buffer_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            packet_count: DEFAULT_POOL_PACKETS,
            buffer_count: DEFAULT_POOL_PACKETS,
            buffer_size: DEFAULT_PACKET_BUFFER_SIZE,
            sample_buffer_count: DEFAULT_SAMPLE_BUFFERS,
            sample_buffer_size: DEFAULT_SAMPLE_BUFFER_SIZE,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.packet_count == 0 || self.buffer_count == 0 || self.sample_buffer_count == 0 {
            return Err(ConfigError::Pool("pool counts must be non-zero".into()));
        }
        if self.buffer_size == 0 || self.sample_buffer_size == 0 {
            return Err(ConfigError::Pool("buffer sizes must be non-zero".into()));
        }
        Ok(())
    }
}

/// Demo sender settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Tones mixed into the stream
    pub tones: Vec<ToneConfig>,
    /// How long to run, in seconds
    pub run_seconds: u64,
    /// Packets buffered between packetizer and consumer
    pub queue_capacity: usize,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            tones: vec![
                ToneConfig {
                    frequency: 440.0,
                    amplitude: 0.4,
                },
                ToneConfig {
                    frequency: 660.0,
                    amplitude: 0.4,
                },
            ],
            run_seconds: 5,
            queue_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneConfig {
    pub frequency: f32,
    pub amplitude: f32,
}
