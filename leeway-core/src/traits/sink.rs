//! Sentence consumers

use leeway_hal::UartTx;
use leeway_protocol::Sentence;

/// Consumer of finished sentences
///
/// The engine hands out one sentence per call; implementations write it to
/// a display, a serial link or a log.
pub trait SentenceSink {
    /// Error type for delivery
    type Error;

    /// Deliver one sentence
    fn deliver(&mut self, sentence: &Sentence) -> Result<(), Self::Error>;
}

impl<S: SentenceSink + ?Sized> SentenceSink for &mut S {
    type Error = S::Error;

    fn deliver(&mut self, sentence: &Sentence) -> Result<(), Self::Error> {
        (**self).deliver(sentence)
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl SentenceSink for NoopSink {
    type Error = core::convert::Infallible;

    fn deliver(&mut self, _sentence: &Sentence) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Writes sentence bodies to a UART
#[derive(Debug)]
pub struct SerialSink<T> {
    tx: T,
}

impl<T: UartTx> SerialSink<T> {
    /// Wrap a transmitter
    pub fn new(tx: T) -> Self {
        Self { tx }
    }

    /// Give the transmitter back
    pub fn into_inner(self) -> T {
        self.tx
    }
}

impl<T: UartTx> SentenceSink for SerialSink<T> {
    type Error = T::Error;

    fn deliver(&mut self, sentence: &Sentence) -> Result<(), Self::Error> {
        self.tx.write_blocking(sentence.as_bytes())?;
        self.tx.flush()
    }
}
