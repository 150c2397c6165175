//! Output traits
//!
//! These traits define the interface between the engine and whatever
//! consumes its sentences.

pub mod sink;

pub use sink::{NoopSink, SentenceSink, SerialSink};
