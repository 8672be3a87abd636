//! Bounded packet pool

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::types::Packet;
use crate::error::PoolError;

struct PacketPoolShared {
    max_packets: usize,
    in_use: AtomicUsize,
    exhausted_count: AtomicUsize,
}

/// Non-blocking allocator of packet containers
///
/// Bounds the number of live packets; a packet frees its slot on drop,
/// wherever it ends up.
#[derive(Clone)]
pub struct PacketPool {
    shared: Arc<PacketPoolShared>,
}

impl PacketPool {
    pub fn new(max_packets: usize) -> Self {
        Self {
            shared: Arc::new(PacketPoolShared {
                max_packets,
                in_use: AtomicUsize::new(0),
                exhausted_count: AtomicUsize::new(0),
            }),
        }
    }

    /// Lease an empty packet
    pub fn allocate(&self) -> Result<Packet, PoolError> {
        let shared = &self.shared;
        let reserved = shared
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < shared.max_packets).then_some(n + 1)
            });

        match reserved {
            Ok(_) => Ok(Packet::new(PacketLease(shared.clone()))),
            Err(in_use) => {
                shared.exhausted_count.fetch_add(1, Ordering::Relaxed);
                Err(PoolError::Exhausted(in_use))
            }
        }
    }

    pub fn max_packets(&self) -> usize {
        self.shared.max_packets
    }

    /// Number of live packets
    pub fn in_use(&self) -> usize {
        self.shared.in_use.load(Ordering::Acquire)
    }

    /// Number of failed allocations
    pub fn exhausted_count(&self) -> usize {
        self.shared.exhausted_count.load(Ordering::Relaxed)
    }
}

pub(crate) struct PacketLease(Arc<PacketPoolShared>);

impl Drop for PacketLease {
    fn drop(&mut self) {
        self.0.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}
