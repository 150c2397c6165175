//! Sentence framing for NMEA0183 byte streams
//!
//! The framer is fed one byte at a time and recovers sentence boundaries:
//! - START (`$`, `!`, `~`) resets the buffer and begins a sentence
//! - `*` switches to checksum digits (still stored)
//! - CR or LF completes the sentence, which is handed out without terminator
//!
//! Noise between sentences is ignored. A sentence that would not fit in
//! [`MAX_RAW_LEN`] bytes is dropped.

use heapless::String;

use crate::{is_start_delimiter, CHECKSUM_MARKER, MAX_RAW_LEN};

/// A complete sentence as recovered from the stream, without terminator
pub type RawSentence = String<MAX_RAW_LEN>;

/// Errors that abort the sentence in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Sentence exceeds the maximum length
    Overflow,
    /// Non-ASCII byte inside a sentence
    NonAscii,
    /// Invalid sentence structure (second checksum marker)
    Malformed,
}

/// Framer states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramerState {
    /// No sentence in progress
    Idle,
    /// Collecting body characters
    Accumulating,
    /// A `*` was seen, collecting checksum digits
    ChecksumExpected,
    /// Line end seen while collecting; sentence is complete
    Terminating,
    /// Inconsistent input; discard and go idle
    Invalid,
}

/// Byte classes that drive the framer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramerEvent {
    /// `$`, `!` or `~`
    Start,
    /// `*`
    ChecksumMarker,
    /// CR or LF
    LineEnd,
    /// Any other byte
    Data,
}

impl FramerEvent {
    /// Classify a received byte
    pub fn classify(byte: u8) -> Self {
        match byte {
            b'\r' | b'\n' => FramerEvent::LineEnd,
            b if b == CHECKSUM_MARKER as u8 => FramerEvent::ChecksumMarker,
            b if is_start_delimiter(b) => FramerEvent::Start,
            _ => FramerEvent::Data,
        }
    }
}

impl FramerState {
    /// Whether bytes are being stored in this state
    pub fn is_collecting(&self) -> bool {
        matches!(self, FramerState::Accumulating | FramerState::ChecksumExpected)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: FramerEvent) -> Self {
        use FramerEvent::*;
        use FramerState::*;

        match (self, event) {
            // A start delimiter always begins a fresh sentence
            (_, Start) => Accumulating,

            (Accumulating, ChecksumMarker) => ChecksumExpected,
            (Accumulating, Data) => Accumulating,
            (Accumulating, LineEnd) => Terminating,

            (ChecksumExpected, Data) => ChecksumExpected,
            (ChecksumExpected, LineEnd) => Terminating,
            (ChecksumExpected, ChecksumMarker) => Invalid,

            // Stray terminator with nothing accumulated
            (Idle | Terminating | Invalid, LineEnd) => Invalid,

            // Default: noise outside a sentence
            _ => Idle,
        }
    }
}

/// State machine recovering sentences from a byte stream
#[derive(Debug, Clone)]
pub struct Framer {
    state: FramerState,
    buffer: RawSentence,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer {
    /// Create a new framer
    pub const fn new() -> Self {
        Self {
            state: FramerState::Idle,
            buffer: String::new(),
        }
    }

    /// Abandon any partial sentence
    pub fn reset(&mut self) {
        self.state = FramerState::Idle;
        self.buffer.clear();
    }

    /// Current state
    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Number of bytes held for the sentence in progress
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte to the framer
    ///
    /// Returns `Ok(Some(sentence))` when a line end completes a sentence,
    /// `Ok(None)` when more bytes are needed, or `Err` when the sentence in
    /// progress had to be discarded. The framer is idle again after an error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<RawSentence>, FrameError> {
        let event = FramerEvent::classify(byte);
        let was_collecting = self.state.is_collecting();
        self.state = self.state.transition(event);

        match self.state {
            FramerState::Idle => Ok(None),
            FramerState::Accumulating | FramerState::ChecksumExpected => {
                if event == FramerEvent::Start {
                    self.buffer.clear();
                }
                if !byte.is_ascii() {
                    self.reset();
                    return Err(FrameError::NonAscii);
                }
                if self.buffer.push(byte as char).is_err() {
                    self.reset();
                    return Err(FrameError::Overflow);
                }
                Ok(None)
            }
            FramerState::Terminating => {
                let sentence = core::mem::take(&mut self.buffer);
                self.reset();
                Ok(Some(sentence))
            }
            FramerState::Invalid => {
                self.reset();
                if was_collecting {
                    Err(FrameError::Malformed)
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Feed bytes until a sentence completes or is discarded
    ///
    /// Consumed bytes are removed from the front of `bytes`; anything after
    /// the completing byte is left for the next call.
    pub fn feed_bytes(&mut self, bytes: &mut &[u8]) -> Result<Option<RawSentence>, FrameError> {
        while let Some((&byte, rest)) = bytes.split_first() {
            *bytes = rest;
            if let Some(sentence) = self.feed(byte)? {
                return Ok(Some(sentence));
            }
        }
        Ok(None)
    }
}
