//! Error types for the mixing and packetization pipeline
//!
//! Two tiers exist. Ordinary [`Error`] values cover expected runtime
//! conditions such as pool exhaustion and bad configuration. A
//! [`ContractViolation`] means a collaborator broke its declared contract; it
//! is never returned, only raised through [`fatal`].

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Compose error: {0}")]
    Compose(#[from] ComposeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pool allocation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Pool exhausted ({0} in use)")]
    Exhausted(usize),

    #[error("Requested {requested} elements, buffer capacity is {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },
}

/// Wire-format composer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("Buffer too small: need {needed} bytes, capacity {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    #[error("Packet has no data attached")]
    NoData,

    #[error("Packet is not an RTP packet")]
    NotRtp,

    #[error("Packet already padded")]
    AlreadyPadded,

    #[error("Invalid padding size: {0}")]
    InvalidPadding(usize),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Channel mask is empty")]
    NoChannels,

    #[error("Packet length of {length_ms} ms at {sample_rate} Hz yields no samples")]
    EmptyPacket { length_ms: f64, sample_rate: u32 },

    #[error("Payload type {0} does not fit in 7 bits")]
    PayloadType(u8),

    #[error("Invalid pool configuration: {0}")]
    Pool(String),

    #[error("Packet buffers hold {capacity} bytes, a packet needs {needed}")]
    PacketBuffer { needed: usize, capacity: usize },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Broken collaborator contracts
///
/// Continuing after any of these would put corrupted audio on the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("mixer: source returned {actual} samples, expected {expected}")]
    SourceFrameSize { expected: usize, actual: usize },

    #[error("mixer: read from invalid mixer")]
    InvalidMixer,

    #[error("mixer: scratch buffer can't hold {requested} samples (capacity {capacity})")]
    ScratchCapacity { requested: usize, capacity: usize },

    #[error("packetizer: frame size {size} is not a multiple of {channels} channels")]
    FrameSize { size: usize, channels: usize },

    #[error("packetizer: encoder wrote {written} samples, room for {room}")]
    EncoderWrite { room: usize, written: usize },

    #[error("packetizer: unexpected non-rtp packet")]
    NonRtpPacket,

    #[error("packetizer: encoded size {actual} exceeds fixed payload size {expected}")]
    PayloadOverflow { expected: usize, actual: usize },

    #[error("packetizer: can't pad packet: orig_size={expected} actual_size={actual}: {reason}")]
    Padding {
        expected: usize,
        actual: usize,
        reason: ComposeError,
    },

    #[error("encoder: channel mask {actual:#x} doesn't match encoder mask {expected:#x}")]
    ChannelMask { expected: u32, actual: u32 },
}

/// Abort on a contract violation.
///
/// The release profile builds with `panic = "abort"`, so this terminates the
/// process. Callers must never catch the unwind in debug builds either.
#[cold]
#[track_caller]
pub fn fatal(violation: ContractViolation) -> ! {
    tracing::error!("contract violation: {}", violation);
    panic!("{}", violation)
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;
