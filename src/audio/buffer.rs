//! Bounded pool of reusable sample and byte buffers
//!
//! Allocation never blocks: when every buffer is checked out the pool reports
//! [`PoolError::Exhausted`] and the caller decides what to drop. Buffers go
//! back to the free list when dropped.

use crossbeam::queue::ArrayQueue;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::PoolError;

struct PoolShared<T> {
    free: ArrayQueue<Vec<T>>,
    buffer_size: usize,
    max_buffers: usize,
    in_use: AtomicUsize,
    exhausted_count: AtomicUsize,
}

/// Thread-safe handle to a buffer pool
///
/// Cloning the handle shares the same pool.
pub struct BufferPool<T> {
    shared: Arc<PoolShared<T>>,
}

impl<T> Clone for BufferPool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone + Default> BufferPool<T> {
    /// Create a pool of at most `max_buffers` buffers of `buffer_size` elements
    pub fn new(buffer_size: usize, max_buffers: usize) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                free: ArrayQueue::new(max_buffers.max(1)),
                buffer_size,
                max_buffers,
                in_use: AtomicUsize::new(0),
                exhausted_count: AtomicUsize::new(0),
            }),
        }
    }

    /// Take a buffer from the pool.
    ///
    /// The returned buffer is empty; grow it with [`Buffer::resize`].
    pub fn allocate(&self) -> Result<Buffer<T>, PoolError> {
        let shared = &self.shared;
        let reserved = shared
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < shared.max_buffers).then_some(n + 1)
            });

        if let Err(in_use) = reserved {
            shared.exhausted_count.fetch_add(1, Ordering::Relaxed);
            return Err(PoolError::Exhausted(in_use));
        }

        let data = shared
            .free
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(shared.buffer_size));

        Ok(Buffer {
            data,
            capacity: shared.buffer_size,
            pool: Some(shared.clone()),
        })
    }
}

impl<T> BufferPool<T> {
    /// Capacity of every buffer handed out, in elements
    pub fn buffer_size(&self) -> usize {
        self.shared.buffer_size
    }

    /// Maximum number of buffers checked out at once
    pub fn max_buffers(&self) -> usize {
        self.shared.max_buffers
    }

    /// Number of buffers currently checked out
    pub fn in_use(&self) -> usize {
        self.shared.in_use.load(Ordering::Acquire)
    }

    /// Number of failed allocations
    pub fn exhausted_count(&self) -> usize {
        self.shared.exhausted_count.load(Ordering::Relaxed)
    }
}

/// Fixed-capacity buffer leased from a [`BufferPool`]
pub struct Buffer<T> {
    data: Vec<T>,
    capacity: usize,
    pool: Option<Arc<PoolShared<T>>>,
}

impl<T: Clone + Default> Buffer<T> {
    /// Resize in place. Never reallocates beyond the pool-provided capacity.
    pub fn resize(&mut self, len: usize) -> Result<(), PoolError> {
        if len > self.capacity {
            return Err(PoolError::CapacityExceeded {
                requested: len,
                capacity: self.capacity,
            });
        }
        self.data.resize(len, T::default());
        Ok(())
    }
}

impl<T> Buffer<T> {
    /// Maximum length this buffer may be resized to
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Deref for Buffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for Buffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Drop for Buffer<T> {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            let mut data = std::mem::take(&mut self.data);
            data.clear();
            // The free list is as large as the pool, so this only fails if
            // the pool was shrunk, which it can't be.
            let _ = pool.free.push(data);
            pool.in_use.fetch_sub(1, Ordering::AcqRel);
        }
    }
}
