//! Non-owning view over interleaved samples

use super::sample::Sample;

/// Interleaved audio samples for a fixed channel count
///
/// A frame borrows its storage. The active length starts at the full slice
/// and can only shrink, which is how a source reports that it produced fewer
/// samples than requested.
pub struct Frame<'a> {
    data: &'a mut [Sample],
    len: usize,
}

impl<'a> Frame<'a> {
    pub fn new(data: &'a mut [Sample]) -> Self {
        let len = data.len();
        Self { data, len }
    }

    /// Number of samples, all channels included
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn samples(&self) -> &[Sample] {
        &self.data[..self.len]
    }

    pub fn samples_mut(&mut self) -> &mut [Sample] {
        &mut self.data[..self.len]
    }

    /// Shorten the frame. Lengths above the current one are ignored.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }
}
