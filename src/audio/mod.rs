//! Audio subsystem module

pub mod buffer;
pub mod frame;
pub mod mixer;
pub mod packetizer;
pub mod sample;
pub mod source;

pub use buffer::{Buffer, BufferPool};
pub use frame::Frame;
pub use mixer::Mixer;
pub use packetizer::{Packetizer, PacketizerStats};
pub use sample::{clamp_sample, Sample, SAMPLE_MAX, SAMPLE_MIN};
pub use source::{source_handle, SilenceSource, Source, SourceHandle, ToneSource};
