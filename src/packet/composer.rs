//! Wire-format composer capability and the RTP implementation

use bytes::BufMut;

use super::types::{Packet, PacketFlags, PacketLayout, RtpHeader, MAX_PAYLOAD_TYPE};
use crate::audio::buffer::Buffer;
use crate::error::ComposeError;

/// Fixed RTP header size without CSRCs or extensions
pub const RTP_HEADER_SIZE: usize = 12;

/// RTP protocol version written to the header
pub const RTP_VERSION: u8 = 2;

/// Largest padding the trailing RTP count byte can describe
pub const MAX_PADDING: usize = 255;

/// Lays out packet bytes
pub trait Composer {
    /// Buffer bytes needed for a packet carrying `payload_size` bytes
    fn packet_size(&self, payload_size: usize) -> usize;

    /// Attach `buffer` to `packet` with room for a `payload_size` payload.
    fn prepare(
        &self,
        packet: &mut Packet,
        buffer: Buffer<u8>,
        payload_size: usize,
    ) -> Result<(), ComposeError>;

    /// Turn the last `padding_size` payload bytes into padding.
    ///
    /// The wire size of the packet is unchanged.
    fn pad(&self, packet: &mut Packet, padding_size: usize) -> Result<(), ComposeError>;
}

/// RFC 3550 fixed-header composer
#[derive(Debug, Default, Clone, Copy)]
pub struct RtpComposer;

impl RtpComposer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize header fields into the first bytes of the packet
    pub fn compose(&self, packet: &mut Packet) -> Result<(), ComposeError> {
        let header: RtpHeader = *packet.rtp().ok_or(ComposeError::NotRtp)?;
        if !packet.has_data() {
            return Err(ComposeError::NoData);
        }

        let padding = (1..=MAX_PADDING).contains(&packet.padding_len());
        let mut out: &mut [u8] = &mut packet.data_mut()[..RTP_HEADER_SIZE];

        let padding_bit = if padding { 0x20 } else { 0 };
        let marker_bit = if header.marker { 0x80 } else { 0 };

        out.put_u8((RTP_VERSION << 6) | padding_bit);
        out.put_u8(marker_bit | (header.payload_type & MAX_PAYLOAD_TYPE));
        out.put_u16(header.seqnum);
        out.put_u32(header.timestamp);
        out.put_u32(header.source);

        packet.add_flags(PacketFlags::COMPOSED);
        Ok(())
    }
}

impl Composer for RtpComposer {
    fn packet_size(&self, payload_size: usize) -> usize {
        RTP_HEADER_SIZE + payload_size
    }

    fn prepare(
        &self,
        packet: &mut Packet,
        mut buffer: Buffer<u8>,
        payload_size: usize,
    ) -> Result<(), ComposeError> {
        let needed = self.packet_size(payload_size);
        if buffer.resize(needed).is_err() {
            return Err(ComposeError::BufferTooSmall {
                needed,
                capacity: buffer.capacity(),
            });
        }

        packet.set_rtp(RtpHeader::default());
        packet.set_data(
            buffer,
            PacketLayout {
                header_len: RTP_HEADER_SIZE,
                payload_len: payload_size,
                padding_len: 0,
            },
        );
        Ok(())
    }

    /// Padding up to [`MAX_PADDING`] bytes is marked with the P bit and a
    /// trailing count. A longer tail is zero-filled but left unmarked, so
    /// receivers decode it as silence and the wire size still holds.
    fn pad(&self, packet: &mut Packet, padding_size: usize) -> Result<(), ComposeError> {
        if packet.rtp().is_none() {
            return Err(ComposeError::NotRtp);
        }
        if !packet.has_data() {
            return Err(ComposeError::NoData);
        }

        let mut layout = packet.layout();
        if layout.padding_len != 0 {
            return Err(ComposeError::AlreadyPadded);
        }
        if padding_size == 0 {
            return Ok(());
        }
        if padding_size > layout.payload_len {
            return Err(ComposeError::InvalidPadding(padding_size));
        }

        layout.payload_len -= padding_size;
        layout.padding_len = padding_size;
        packet.set_layout(layout);

        let data = packet.data_mut();
        let total = data.len();
        data[total - padding_size..].fill(0);
        if padding_size <= MAX_PADDING {
            data[total - 1] = padding_size as u8;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::BufferPool;
    use crate::packet::pool::PacketPool;

    fn prepared(payload_size: usize) -> Packet {
        let packets = PacketPool::new(4);
        let bytes = BufferPool::new(1024, 4);
        let mut packet = packets.allocate().unwrap();
        RtpComposer
            .prepare(&mut packet, bytes.allocate().unwrap(), payload_size)
            .unwrap();
        packet
    }

    #[test]
    fn test_prepare_layout() {
        let packet = prepared(40);
        assert!(packet.flags().contains(PacketFlags::RTP));
        assert_eq!(packet.data().len(), RTP_HEADER_SIZE + 40);
        assert_eq!(packet.payload().len(), 40);
        assert_eq!(packet.body_len(), 40);
    }

    #[test]
    fn test_prepare_buffer_too_small() {
        let packets = PacketPool::new(1);
        let bytes = BufferPool::new(16, 1);
        let mut packet = packets.allocate().unwrap();

        let err = RtpComposer
            .prepare(&mut packet, bytes.allocate().unwrap(), 8)
            .unwrap_err();
        assert_eq!(
            err,
            ComposeError::BufferTooSmall {
                needed: 20,
                capacity: 16
            }
        );
        assert_eq!(bytes.in_use(), 0);
    }

    #[test]
    fn test_pad_keeps_wire_size() {
        let mut packet = prepared(40);
        packet.payload_mut().fill(0x11);

        RtpComposer.pad(&mut packet, 20).unwrap();

        assert_eq!(packet.payload().len(), 20);
        assert_eq!(packet.padding_len(), 20);
        assert_eq!(packet.body_len(), 40);
        assert_eq!(packet.data().len(), RTP_HEADER_SIZE + 40);
        assert_eq!(*packet.data().last().unwrap(), 20);
        assert_eq!(packet.data()[RTP_HEADER_SIZE + 20], 0);

        assert_eq!(
            RtpComposer.pad(&mut packet, 4),
            Err(ComposeError::AlreadyPadded)
        );
    }

    #[test]
    fn test_pad_limits() {
        let mut packet = prepared(40);
        assert_eq!(RtpComposer.pad(&mut packet, 0), Ok(()));
        assert_eq!(packet.padding_len(), 0);
        assert_eq!(
            RtpComposer.pad(&mut packet, 41),
            Err(ComposeError::InvalidPadding(41))
        );
    }

    #[test]
    fn test_compose_header_bytes() {
        let mut packet = prepared(8);
        *packet.rtp_mut().unwrap() = RtpHeader {
            source: 0xdeadbeef,
            seqnum: 0x0102,
            timestamp: 0x0a0b0c0d,
            payload_type: 10,
            marker: true,
        };
        RtpComposer.pad(&mut packet, 2).unwrap();
        RtpComposer.compose(&mut packet).unwrap();

        assert!(packet.flags().contains(PacketFlags::COMPOSED));
        assert_eq!(
            &packet.data()[..RTP_HEADER_SIZE],
            &[0xa0, 0x8a, 0x01, 0x02, 0x0a, 0x0b, 0x0c, 0x0d, 0xde, 0xad, 0xbe, 0xef]
        );
    }

    #[test]
    fn test_long_padding_is_unmarked_silence() {
        let mut packet = prepared(884);
        packet.payload_mut().fill(0x11);
        *packet.rtp_mut().unwrap() = RtpHeader {
            payload_type: 10,
            ..RtpHeader::default()
        };

        RtpComposer.pad(&mut packet, 484).unwrap();
        RtpComposer.compose(&mut packet).unwrap();

        assert_eq!(packet.payload().len(), 400);
        assert_eq!(packet.padding_len(), 484);
        assert_eq!(packet.data().len(), RTP_HEADER_SIZE + 884);
        assert_eq!(packet.data()[0], 0x80);
        assert!(packet.data()[RTP_HEADER_SIZE + 400..].iter().all(|&b| b == 0));
        assert_eq!(packet.data()[RTP_HEADER_SIZE + 399], 0x11);
    }

    #[test]
    fn test_max_marked_padding() {
        let mut packet = prepared(300);
        RtpComposer.pad(&mut packet, MAX_PADDING).unwrap();
        RtpComposer.compose(&mut packet).unwrap();

        assert_eq!(packet.data()[0], 0xa0);
        assert_eq!(*packet.data().last().unwrap(), 0xff);
    }

    #[test]
    fn test_compose_requires_rtp() {
        let packets = PacketPool::new(1);
        let mut packet = packets.allocate().unwrap();
        assert_eq!(
            RtpComposer.compose(&mut packet),
            Err(ComposeError::NotRtp)
        );
    }
}
