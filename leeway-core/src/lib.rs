//! Board-agnostic NMEA0183 ingestion logic
//!
//! This crate contains everything between the serial receiver and the
//! display that does not depend on specific hardware:
//!
//! - Sentence parsing with checksum and empty field policies
//! - Rewriting of legacy (non-compliant) sentences
//! - Bounded LIFO sentence buffer, plain and mutex-shared (the shared one
//!   is also a sink for handing sentences to another context)
//! - The polling engine tying framer, parser and buffer together
//! - Configuration type definitions
//! - Consumer traits

#![no_std]
#![deny(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod engine;
pub mod parser;
pub mod shared;
pub mod traits;
pub mod transform;

pub use buffer::{BufferError, SentenceBuffer, DEFAULT_CAPACITY};
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, EngineStats, IngestError};
pub use parser::{ChecksumMode, EmptyFieldPolicy, ParseError, SentenceParser};
pub use shared::SharedSentenceBuffer;
pub use traits::{NoopSink, SentenceSink, SerialSink};
pub use transform::{LegacyFilter, LegacyRule, Rewrite, TransformError, Transformer};
