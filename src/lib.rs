//! # LAN Audio Packetizer
//!
//! Real-time mixing of many audio sources into one stream, sliced into
//! fixed-size RTP packets.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────┐ ┌──────────┐ ┌──────────┐
//! │ Source 0 │ │ Source 1 │ │ Source N │      (audio::source)
//! └────┬─────┘ └────┬─────┘ └────┬─────┘
//!      │            │            │
//!      ▼            ▼            ▼
//! ┌─────────────────────────────────────┐
//! │  Mixer (audio::mixer)               │  saturating sum, one frame/tick
//! └─────────────────┬───────────────────┘
//!                   │ Frame
//!                   ▼
//! ┌─────────────────────────────────────┐   ┌───────────────────────────┐
//! │  Packetizer (audio::packetizer)     │◄──│ PacketPool / BufferPool   │
//! │  seqnum, timestamp, padding         │   │ Encoder (codec)           │
//! └─────────────────┬───────────────────┘   │ Composer (packet)         │
//!                   │ Packet                └───────────────────────────┘
//!                   ▼
//! ┌─────────────────────────────────────┐
//! │  PacketWriter (packet::writer)      │
//! └─────────────────────────────────────┘
//! ```
//!
//! Everything runs synchronously, one call per audio tick. Pool exhaustion
//! drops input; broken collaborator contracts abort (see [`error::fatal`]).

pub mod audio;
pub mod codec;
pub mod config;
pub mod error;
pub mod packet;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    use crate::packet::channels::{ChannelMask, CHANNEL_MASK_STEREO};
    use crate::packet::types::PayloadType;

    /// Default sample rate for audio processing
    pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

    /// Default channel mask (stereo)
    pub const DEFAULT_CHANNEL_MASK: ChannelMask = CHANNEL_MASK_STEREO;

    /// RTP payload type for L16 stereo at 44.1 kHz (RFC 3551)
    pub const DEFAULT_PAYLOAD_TYPE: PayloadType = 10;

    /// Default packet length in milliseconds
    pub const DEFAULT_PACKET_LENGTH_MS: f64 = 5.0;

    /// Packets and byte buffers in the default pools
    pub const DEFAULT_POOL_PACKETS: usize = 128;

    /// Byte buffer capacity, fits an MTU-sized packet
    pub const DEFAULT_PACKET_BUFFER_SIZE: usize = 1472; // MTU - IP/UDP headers

    /// Sample buffers in the default pool
    pub const DEFAULT_SAMPLE_BUFFERS: usize = 4;

    /// Sample buffer capacity (samples, all channels)
    pub const DEFAULT_SAMPLE_BUFFER_SIZE: usize = 8192;
}
