//! Multi-source mixer
//!
//! Pulls one frame from every registered source and sums them with
//! saturation into the caller's frame.

use std::sync::Arc;

use super::buffer::{Buffer, BufferPool};
use super::frame::Frame;
use super::sample::{clamp_sample, Sample};
use super::source::SourceHandle;
use crate::error::{fatal, ContractViolation};

/// Sums frames from an ordered list of sources
///
/// `read`, `add` and `remove` all take `&mut self`, so registry changes can
/// never overlap a read on the same mixer. A mixer shared between threads
/// must sit behind an external lock such as `parking_lot::Mutex<Mixer>`.
pub struct Mixer {
    sources: Vec<SourceHandle>,
    /// Allocated once, resized in place per read
    scratch: Option<Buffer<Sample>>,
}

impl Mixer {
    /// Create a mixer, taking its scratch buffer from `pool`.
    ///
    /// Allocation failure leaves the mixer invalid; check [`Mixer::valid`].
    pub fn new(pool: &BufferPool<Sample>) -> Self {
        let scratch = match pool.allocate() {
            Ok(buf) => Some(buf),
            Err(e) => {
                tracing::error!("mixer: can't allocate temporary buffer: {}", e);
                None
            }
        };

        Self {
            sources: Vec::new(),
            scratch,
        }
    }

    /// Whether construction succeeded
    pub fn valid(&self) -> bool {
        self.scratch.is_some()
    }

    /// Register a source. Duplicates are not detected.
    pub fn add(&mut self, source: SourceHandle) {
        self.sources.push(source);
    }

    /// Unregister the first occurrence of `source`, if any
    pub fn remove(&mut self, source: &SourceHandle) {
        if let Some(pos) = self.sources.iter().position(|s| Arc::ptr_eq(s, source)) {
            self.sources.remove(pos);
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Fill `frame` with the saturated sum of one frame from every source.
    ///
    /// Samples are summed unclamped and saturated once, so the result does
    /// not depend on source order beyond float rounding.
    pub fn read(&mut self, frame: &mut Frame<'_>) {
        let Some(scratch) = self.scratch.as_mut() else {
            fatal(ContractViolation::InvalidMixer);
        };

        let out_len = frame.len();
        if out_len == 0 {
            return;
        }

        let out = frame.samples_mut();
        out.fill(0.0);

        if scratch.resize(out_len).is_err() {
            fatal(ContractViolation::ScratchCapacity {
                requested: out_len,
                capacity: scratch.capacity(),
            });
        }

        for source in &self.sources {
            let mut temp = Frame::new(&mut scratch[..out_len]);
            source.lock().read(&mut temp);

            if temp.len() != out_len {
                fatal(ContractViolation::SourceFrameSize {
                    expected: out_len,
                    actual: temp.len(),
                });
            }

            for (acc, &s) in out.iter_mut().zip(temp.samples()) {
                *acc += s;
            }
        }

        for s in out.iter_mut() {
            *s = clamp_sample(*s);
        }
    }
}
