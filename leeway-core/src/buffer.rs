//! Bounded LIFO of parsed sentences
//!
//! The most recent sentence is handed out first. When the buffer is full a
//! new sentence is refused and given back to the caller; what is already
//! stored is never evicted.

use heapless::Vec;
use leeway_protocol::Sentence;

/// Default number of buffered sentences
pub const DEFAULT_CAPACITY: usize = 5;

/// Errors storing a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// The buffer is at capacity; the refused sentence is returned
    Full(Sentence),
}

/// LIFO sentence buffer
///
/// `N` is the storage reserved at compile time. The effective capacity can
/// be lowered at runtime with [`SentenceBuffer::with_capacity`].
#[derive(Debug, Clone)]
pub struct SentenceBuffer<const N: usize = DEFAULT_CAPACITY> {
    entries: Vec<Sentence, N>,
    capacity: usize,
}

impl<const N: usize> Default for SentenceBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SentenceBuffer<N> {
    /// Create an empty buffer holding up to `N` sentences
    pub const fn new() -> Self {
        Self::with_capacity(N)
    }

    /// Create an empty buffer holding up to `capacity` sentences (at most `N`)
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: if capacity < N { capacity } else { N },
        }
    }

    /// Store a sentence, returning the new depth
    pub fn push(&mut self, sentence: Sentence) -> Result<usize, BufferError> {
        if self.is_full() {
            return Err(BufferError::Full(sentence));
        }
        self.entries.push(sentence).map_err(BufferError::Full)?;
        Ok(self.entries.len())
    }

    /// Take the most recently stored sentence
    pub fn pop(&mut self) -> Option<Sentence> {
        self.entries.pop()
    }

    /// The sentence [`pop`](Self::pop) would return
    pub fn peek(&self) -> Option<&Sentence> {
        self.entries.last()
    }

    /// Drop every stored sentence
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored sentences
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Effective capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if a push would be refused
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(tag: &str) -> Sentence {
        Sentence::from_fields(&[tag, "1"]).unwrap()
    }

    #[test]
    fn test_default_capacity() {
        let buffer: SentenceBuffer = SentenceBuffer::new();
        assert_eq!(buffer.capacity(), DEFAULT_CAPACITY);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_lifo_order() {
        let mut buffer: SentenceBuffer = SentenceBuffer::new();
        assert_eq!(buffer.push(sentence("$AAAAA")), Ok(1));
        assert_eq!(buffer.push(sentence("$BBBBB")), Ok(2));
        assert_eq!(buffer.push(sentence("$CCCCC")), Ok(3));

        assert_eq!(buffer.peek().map(|s| s.tag()), Some("$CCCCC"));
        assert_eq!(buffer.pop().unwrap().tag(), "$CCCCC");
        assert_eq!(buffer.pop().unwrap().tag(), "$BBBBB");
        assert_eq!(buffer.pop().unwrap().tag(), "$AAAAA");
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn test_full_refuses_newest() {
        let mut buffer: SentenceBuffer = SentenceBuffer::new();
        for tag in ["$AAAAA", "$BBBBB", "$CCCCC", "$DDDDD", "$EEEEE"] {
            buffer.push(sentence(tag)).unwrap();
        }
        assert!(buffer.is_full());

        let refused = sentence("$FFFFF");
        assert_eq!(
            buffer.push(refused.clone()),
            Err(BufferError::Full(refused))
        );
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.pop().unwrap().tag(), "$EEEEE");
    }

    #[test]
    fn test_runtime_capacity() {
        let mut buffer = SentenceBuffer::<8>::with_capacity(2);
        buffer.push(sentence("$AAAAA")).unwrap();
        buffer.push(sentence("$BBBBB")).unwrap();
        assert!(buffer.push(sentence("$CCCCC")).is_err());

        // Clamped to the reserved storage
        let buffer = SentenceBuffer::<3>::with_capacity(10);
        assert_eq!(buffer.capacity(), 3);
    }

    #[test]
    fn test_zero_capacity_refuses_everything() {
        let mut buffer = SentenceBuffer::<4>::with_capacity(0);
        assert!(buffer.is_full());
        assert!(buffer.push(sentence("$AAAAA")).is_err());
    }

    #[test]
    fn test_clear() {
        let mut buffer: SentenceBuffer = SentenceBuffer::new();
        buffer.push(sentence("$AAAAA")).unwrap();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.peek(), None);
    }
}
