//! Network packet: RTP header plus a pooled payload buffer

use std::fmt;

use super::pool::PacketLease;
use crate::audio::buffer::Buffer;

/// 32-bit stream source identifier (RTP SSRC)
pub type SourceId = u32;

/// 16-bit packet sequence number, wraps
pub type Seqnum = u16;

/// 32-bit sample clock, wraps
pub type Timestamp = u32;

/// 7-bit RTP payload type
pub type PayloadType = u8;

/// Largest payload type that fits the RTP header
pub const MAX_PAYLOAD_TYPE: PayloadType = 0x7f;

/// RTP header fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtpHeader {
    pub source: SourceId,
    pub seqnum: Seqnum,
    pub timestamp: Timestamp,
    pub payload_type: PayloadType,
    pub marker: bool,
}

/// Packet property flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketFlags(u32);

impl PacketFlags {
    /// Packet carries audio samples
    pub const AUDIO: PacketFlags = PacketFlags(1 << 0);
    /// Packet has an RTP header
    pub const RTP: PacketFlags = PacketFlags(1 << 1);
    /// Header fields were serialized into the buffer
    pub const COMPOSED: PacketFlags = PacketFlags(1 << 2);

    pub fn contains(self, other: PacketFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: PacketFlags) {
        self.0 |= other.0;
    }
}

/// Byte layout of the attached buffer: `[header | payload | padding]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketLayout {
    pub header_len: usize,
    pub payload_len: usize,
    pub padding_len: usize,
}

impl PacketLayout {
    /// Payload plus padding, the part after the header
    pub fn body_len(&self) -> usize {
        self.payload_len + self.padding_len
    }

    pub fn total_len(&self) -> usize {
        self.header_len + self.body_len()
    }
}

/// Packet leased from a [`PacketPool`](super::pool::PacketPool)
///
/// Returned to its pool when dropped.
pub struct Packet {
    flags: PacketFlags,
    rtp: Option<RtpHeader>,
    data: Option<Buffer<u8>>,
    layout: PacketLayout,
    _lease: PacketLease,
}

impl Packet {
    pub(crate) fn new(lease: PacketLease) -> Self {
        Self {
            flags: PacketFlags::default(),
            rtp: None,
            data: None,
            layout: PacketLayout::default(),
            _lease: lease,
        }
    }

    pub fn flags(&self) -> PacketFlags {
        self.flags
    }

    pub fn add_flags(&mut self, flags: PacketFlags) {
        self.flags.insert(flags);
    }

    pub fn rtp(&self) -> Option<&RtpHeader> {
        self.rtp.as_ref()
    }

    pub fn rtp_mut(&mut self) -> Option<&mut RtpHeader> {
        self.rtp.as_mut()
    }

    /// Attach an RTP header and mark the packet as RTP
    pub fn set_rtp(&mut self, header: RtpHeader) {
        self.rtp = Some(header);
        self.flags.insert(PacketFlags::RTP);
    }

    /// Attach a buffer. Its length must cover the layout.
    pub fn set_data(&mut self, data: Buffer<u8>, layout: PacketLayout) {
        debug_assert!(layout.total_len() <= data.len());
        self.data = Some(data);
        self.layout = layout;
    }

    pub fn set_layout(&mut self, layout: PacketLayout) {
        self.layout = layout;
    }

    pub fn layout(&self) -> PacketLayout {
        self.layout
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Wire bytes: header, payload and padding
    pub fn data(&self) -> &[u8] {
        match &self.data {
            Some(buf) => &buf[..self.layout.total_len()],
            None => &[],
        }
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        let total = self.layout.total_len();
        match &mut self.data {
            Some(buf) => &mut buf[..total],
            None => &mut [],
        }
    }

    /// Encoded audio bytes, padding excluded
    pub fn payload(&self) -> &[u8] {
        let l = self.layout;
        &self.data()[l.header_len..l.header_len + l.payload_len]
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        let l = self.layout;
        &mut self.data_mut()[l.header_len..l.header_len + l.payload_len]
    }

    /// Payload plus padding; fixed for every packet of a stream
    pub fn body_len(&self) -> usize {
        self.layout.body_len()
    }

    pub fn padding_len(&self) -> usize {
        self.layout.padding_len
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("flags", &self.flags)
            .field("rtp", &self.rtp)
            .field("layout", &self.layout)
            .finish()
    }
}
