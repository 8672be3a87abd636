//! Packet writer capability

use crossbeam_channel::{Receiver, Sender, TrySendError};

use super::composer::RtpComposer;
use super::types::Packet;

/// Accepts finished packets
///
/// Transport failures are the writer's own concern.
pub trait PacketWriter {
    fn write(&mut self, packet: Packet);
}

impl PacketWriter for Vec<Packet> {
    fn write(&mut self, packet: Packet) {
        self.push(packet);
    }
}

/// Hands packets to another thread over a bounded channel
///
/// Never blocks: when the channel is full the packet is dropped.
pub struct ChannelWriter {
    tx: Sender<Packet>,
    dropped: u64,
}

impl ChannelWriter {
    pub fn new(tx: Sender<Packet>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Create a writer and the receiving end of its channel
    pub fn bounded(capacity: usize) -> (Self, Receiver<Packet>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self::new(tx), rx)
    }

    /// Number of packets dropped because the channel was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl PacketWriter for ChannelWriter {
    fn write(&mut self, packet: Packet) {
        match self.tx.try_send(packet) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                tracing::warn!("writer: channel full, dropping packet");
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
                tracing::warn!("writer: receiver gone, dropping packet");
            }
        }
    }
}

/// Serializes RTP headers before forwarding to the inner writer
pub struct ComposingWriter<W> {
    inner: W,
    composer: RtpComposer,
}

impl<W: PacketWriter> ComposingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            composer: RtpComposer::new(),
        }
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }
}

impl<W: PacketWriter> PacketWriter for ComposingWriter<W> {
    fn write(&mut self, mut packet: Packet) {
        if let Err(e) = self.composer.compose(&mut packet) {
            tracing::warn!("writer: can't compose packet: {}", e);
            return;
        }
        self.inner.write(packet);
    }
}
