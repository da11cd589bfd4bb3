//! Analysis module - incremental statistics driving the interval detector

mod ring_buffer;
mod statistics;

pub use ring_buffer::*;
pub use statistics::*;
