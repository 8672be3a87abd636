//! Sample encoders
//!
//! Encoders turn mixed samples into packet payload bytes. Payload size
//! depends only on the sample count, which keeps packets fixed-size.

pub mod encoder;
pub mod pcm;

pub use encoder::{Encoder, EncoderStats};
pub use pcm::PcmEncoder;
