//! Sentence buffer shared between a producer and a consumer
//!
//! For setups where framing runs in one context (a UART interrupt or
//! task) and display updates in another. Each operation holds the lock
//! only for the push or pop itself.
//!
//! A shared reference is a [`SentenceSink`], so the engine hands sentences
//! across with [`Engine::talk`](crate::Engine::talk) or
//! [`Engine::drain`](crate::Engine::drain):
//!
//! ```ignore
//! static SENTENCES: SharedSentenceBuffer<CriticalSectionRawMutex, 5> =
//!     SharedSentenceBuffer::new();
//!
//! // receive context
//! engine.listen(&mut uart)?;
//! engine.talk(&mut &SENTENCES)?;
//!
//! // display context
//! if let Some(sentence) = SENTENCES.pop() { /* ... */ }
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use leeway_protocol::Sentence;

use crate::buffer::{BufferError, SentenceBuffer, DEFAULT_CAPACITY};
use crate::traits::SentenceSink;

/// [`SentenceBuffer`] behind a blocking mutex
pub struct SharedSentenceBuffer<M: RawMutex, const N: usize = DEFAULT_CAPACITY> {
    inner: Mutex<M, RefCell<SentenceBuffer<N>>>,
}

impl<M: RawMutex, const N: usize> SharedSentenceBuffer<M, N> {
    /// Create an empty buffer holding up to `N` sentences
    pub const fn new() -> Self {
        Self::with_capacity(N)
    }

    /// Create an empty buffer holding up to `capacity` sentences (at most `N`)
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(SentenceBuffer::with_capacity(capacity))),
        }
    }

    /// Store a sentence, returning the new depth
    pub fn push(&self, sentence: Sentence) -> Result<usize, BufferError> {
        self.inner.lock(|buffer| buffer.borrow_mut().push(sentence))
    }

    /// Take the most recently stored sentence
    pub fn pop(&self) -> Option<Sentence> {
        self.inner.lock(|buffer| buffer.borrow_mut().pop())
    }

    /// Drop every stored sentence
    pub fn clear(&self) {
        self.inner.lock(|buffer| buffer.borrow_mut().clear());
    }

    /// Number of stored sentences
    pub fn len(&self) -> usize {
        self.inner.lock(|buffer| buffer.borrow().len())
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if a push would be refused
    pub fn is_full(&self) -> bool {
        self.inner.lock(|buffer| buffer.borrow().is_full())
    }
}

impl<M: RawMutex, const N: usize> Default for SharedSentenceBuffer<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> SentenceSink for &SharedSentenceBuffer<M, N> {
    type Error = BufferError;

    fn deliver(&mut self, sentence: &Sentence) -> Result<(), Self::Error> {
        self.push(sentence.clone()).map(|_| ())
    }
}
