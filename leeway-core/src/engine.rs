//! Ingestion pipeline
//!
//! ```text
//!   UartRx ──► Framer ──► SentenceParser ──► SentenceBuffer ──► SentenceSink
//!   (bytes)    (raw)      (Sentence)         (LIFO)            (display)
//! ```
//!
//! The engine is driven by cooperative polling: [`Engine::listen`] drains
//! whatever the receiver has, [`Engine::talk`] hands the newest sentence
//! to a consumer. Framing errors are recovered silently; parse errors and
//! buffer overflow are reported to the caller of [`Engine::feed`].

use leeway_hal::UartRx;
use leeway_protocol::{Framer, FramerState, Sentence};

use crate::buffer::{BufferError, SentenceBuffer, DEFAULT_CAPACITY};
use crate::config::{ConfigError, EngineConfig};
use crate::parser::{ParseError, SentenceParser};
use crate::traits::SentenceSink;

/// Errors ingesting a complete sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IngestError {
    /// The sentence was rejected by the parser
    Parse(ParseError),
    /// The sentence parsed but the buffer was full; it was dropped
    BufferFull,
}

impl From<ParseError> for IngestError {
    fn from(e: ParseError) -> Self {
        IngestError::Parse(e)
    }
}

/// Pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineStats {
    /// Sentences parsed, including ones later dropped by a full buffer
    pub parsed: u32,
    /// Framing errors recovered from
    pub framing_errors: u32,
    /// Sentences rejected by the parser
    pub rejected: u32,
    /// Parsed sentences dropped because the buffer was full
    pub dropped: u32,
}

/// NMEA0183 ingestion engine
#[derive(Debug, Clone)]
pub struct Engine<const N: usize = DEFAULT_CAPACITY> {
    framer: Framer,
    parser: SentenceParser,
    buffer: SentenceBuffer<N>,
    stats: EngineStats,
}

impl<const N: usize> Engine<N> {
    /// Create an engine with a buffer holding up to `N` sentences
    pub fn new(parser: SentenceParser) -> Self {
        Self::with_capacity(parser, N)
    }

    /// Create an engine with a buffer holding up to `capacity` sentences
    /// (at most `N`)
    pub fn with_capacity(parser: SentenceParser, capacity: usize) -> Self {
        Self {
            framer: Framer::new(),
            parser,
            buffer: SentenceBuffer::with_capacity(capacity),
            stats: EngineStats::default(),
        }
    }

    /// Create an engine from a validated configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.buffer_capacity > N {
            return Err(ConfigError::CapacityTooLarge);
        }
        Ok(Self::with_capacity(config.parser(), config.buffer_capacity))
    }

    /// Feed one received byte
    ///
    /// Returns `Some` when the byte completed a sentence: the new buffer
    /// depth, or why the sentence was not stored.
    pub fn feed(&mut self, byte: u8) -> Option<Result<usize, IngestError>> {
        match self.framer.feed(byte) {
            Ok(Some(raw)) => Some(self.ingest(&raw)),
            Ok(None) => None,
            Err(_e) => {
                self.stats.framing_errors = self.stats.framing_errors.wrapping_add(1);
                #[cfg(feature = "defmt")]
                defmt::debug!("Framing error: {:?}", _e);
                None
            }
        }
    }

    /// Feed a run of received bytes, returning the number of sentences stored
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> usize {
        bytes
            .iter()
            .filter_map(|&byte| self.feed(byte))
            .filter(Result::is_ok)
            .count()
    }

    /// Parse and store an already framed sentence (no terminator)
    pub fn ingest(&mut self, raw: &str) -> Result<usize, IngestError> {
        #[cfg(feature = "defmt")]
        defmt::trace!("Raw sentence: {=str}", raw);

        let sentence = match self.parser.parse(raw) {
            Ok(sentence) => sentence,
            Err(e) => {
                self.stats.rejected = self.stats.rejected.wrapping_add(1);
                #[cfg(feature = "defmt")]
                defmt::debug!("Rejected sentence: {:?}", e);
                return Err(IngestError::Parse(e));
            }
        };
        self.stats.parsed = self.stats.parsed.wrapping_add(1);

        self.buffer.push(sentence).map_err(|BufferError::Full(_dropped)| {
            self.stats.dropped = self.stats.dropped.wrapping_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!("Sentence buffer full, dropped {=str}", _dropped.tag());
            IngestError::BufferFull
        })
    }

    /// Poll the receiver until it has no byte waiting
    ///
    /// Returns the number of bytes consumed.
    pub fn listen<R: UartRx>(&mut self, rx: &mut R) -> Result<usize, R::Error> {
        let mut count = 0;
        while let Some(byte) = rx.read_byte()? {
            count += 1;
            // Outcomes are tracked in the stats
            let _ = self.feed(byte);
        }
        Ok(count)
    }

    /// Deliver the newest pending sentence, if any
    ///
    /// Returns true if a sentence was delivered. A sentence whose delivery
    /// fails is not put back.
    pub fn talk<S: SentenceSink>(&mut self, sink: &mut S) -> Result<bool, S::Error> {
        match self.buffer.pop() {
            Some(sentence) => {
                sink.deliver(&sentence)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Deliver every pending sentence, newest first
    pub fn drain<S: SentenceSink>(&mut self, sink: &mut S) -> Result<usize, S::Error> {
        let mut count = 0;
        while self.talk(sink)? {
            count += 1;
        }
        Ok(count)
    }

    /// Take the newest pending sentence
    pub fn pop(&mut self) -> Option<Sentence> {
        self.buffer.pop()
    }

    /// Number of pending sentences
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Pipeline counters
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Sentences parsed so far
    pub fn parsed_count(&self) -> u32 {
        self.stats.parsed
    }

    /// Current framer state
    pub fn framer_state(&self) -> FramerState {
        self.framer.state()
    }

    /// Abandon any partially received sentence
    pub fn reset_framer(&mut self) {
        self.framer.reset();
    }

    /// The parser
    pub fn parser(&self) -> &SentenceParser {
        &self.parser
    }

    /// The sentence buffer
    pub fn buffer(&self) -> &SentenceBuffer<N> {
        &self.buffer
    }
}

impl<const N: usize> Default for Engine<N> {
    fn default() -> Self {
        Self::new(SentenceParser::default())
    }
}
