//! Audio sources feeding the mixer

use parking_lot::Mutex;
use std::f32::consts::TAU;
use std::sync::Arc;

use super::frame::Frame;
use super::sample::Sample;

/// Anything able to produce a frame on demand
///
/// `read` must fill the whole frame. Shortening it is a broken source and
/// aborts the mixer.
pub trait Source: Send {
    fn read(&mut self, frame: &mut Frame<'_>);
}

/// Shared handle to a registered source
///
/// Handles are compared by identity when removed from a mixer.
pub type SourceHandle = Arc<Mutex<dyn Source>>;

/// Wrap a source into a handle the mixer can hold
pub fn source_handle<S: Source + 'static>(source: S) -> SourceHandle {
    Arc::new(Mutex::new(source))
}

/// Sine tone generator, same signal on every channel
pub struct ToneSource {
    frequency: f32,
    amplitude: Sample,
    sample_rate: u32,
    channels: usize,
    phase: f32,
}

impl ToneSource {
    pub fn new(frequency: f32, amplitude: Sample, sample_rate: u32, channels: usize) -> Self {
        Self {
            frequency,
            amplitude,
            sample_rate,
            channels: channels.max(1),
            phase: 0.0,
        }
    }
}

impl Source for ToneSource {
    fn read(&mut self, frame: &mut Frame<'_>) {
        let step = TAU * self.frequency / self.sample_rate as f32;
        for chunk in frame.samples_mut().chunks_mut(self.channels) {
            let value = self.amplitude * self.phase.sin();
            chunk.fill(value);
            self.phase = (self.phase + step) % TAU;
        }
    }
}

/// Source that always produces silence
#[derive(Default)]
pub struct SilenceSource;

impl Source for SilenceSource {
    fn read(&mut self, frame: &mut Frame<'_>) {
        frame.samples_mut().fill(0.0);
    }
}
