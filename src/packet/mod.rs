//! Packet types and the collaborators around them
//!
//! Composers lay out bytes, pools bound allocations, writers take finished
//! packets away.

pub mod channels;
pub mod composer;
pub mod pool;
pub mod types;
pub mod writer;

pub use channels::{num_channels, ChannelMask, CHANNEL_MASK_MONO, CHANNEL_MASK_STEREO};
pub use composer::{Composer, RtpComposer, RTP_HEADER_SIZE};
pub use pool::PacketPool;
pub use types::{Packet, PacketFlags, PacketLayout, PayloadType, RtpHeader, Seqnum, SourceId, Timestamp};
pub use writer::{ChannelWriter, ComposingWriter, PacketWriter};
