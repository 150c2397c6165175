//! NMEA0183 wire protocol
//!
//! This crate holds the wire-level pieces of the Leeway engine: recovering
//! sentences from a raw serial byte stream, computing checksums, and the
//! owned [`Sentence`] value that moves through the rest of the pipeline.
//!
//! # Sentence Format
//!
//! ```text
//! ┌───────┬───────┬───┬─────────┬───┬─────────┬──────────┬──────┐
//! │ START │ TAG   │ , │ FIELD 1 │ , │ FIELD n │ *hh      │ CRLF │
//! │ $ ! ~ │ 5B    │   │         │   │         │ optional │ 2B   │
//! └───────┴───────┴───┴─────────┴───┴─────────┴──────────┴──────┘
//! ```
//!
//! A sentence is at most 82 bytes including the start delimiter and the
//! terminator, and carries at most 21 fields (the tag counts as field 0).
//! The checksum is the XOR of every character between the start delimiter
//! and the `*`. Older talkers (NMEA 1.5) omit it.

#![no_std]
#![deny(unsafe_code)]

pub mod checksum;
pub mod framer;
pub mod sentence;

pub use checksum::{checksum, format_checksum, parse_checksum, validate, ChecksumError};
pub use framer::{FrameError, Framer, FramerEvent, FramerState, RawSentence};
pub use sentence::{Field, Sentence, SentenceError, SentenceKind};

/// Maximum sentence length in bytes, start delimiter and CRLF included
pub const MAX_SENTENCE_LEN: usize = 82;

/// Maximum number of fields, tag included
///
/// Sized for MDA, the meteorological composite sentence.
pub const MAX_FIELDS: usize = 21;

/// Maximum length of a raw sentence held by the framer (CRLF is not stored)
pub const MAX_RAW_LEN: usize = MAX_SENTENCE_LEN - TERMINATOR.len();

/// Protocol line terminator
pub const TERMINATOR: &str = "\r\n";

/// Start delimiter for regular sentences
pub const START_NORMAL: u8 = b'$';

/// Start delimiter for AIS encapsulation sentences
pub const START_AIS: u8 = b'!';

/// Start delimiter reserved by NMEA
pub const START_RESERVED: u8 = b'~';

/// Field separator
pub const FIELD_SEPARATOR: char = ',';

/// Checksum marker
pub const CHECKSUM_MARKER: char = '*';

/// Returns true if `byte` opens a sentence
pub const fn is_start_delimiter(byte: u8) -> bool {
    matches!(byte, START_NORMAL | START_AIS | START_RESERVED)
}
