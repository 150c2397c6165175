//! Owned NMEA0183 sentence
//!
//! A [`Sentence`] keeps the decoded field values next to the textual body
//! that goes back out on the wire. The two can differ: the parser may store
//! a substitute value for an empty field while the body keeps the field
//! empty.

use core::fmt;

use heapless::{String, Vec};

use crate::checksum::{checksum, format_checksum};
use crate::{
    CHECKSUM_MARKER, FIELD_SEPARATOR, MAX_FIELDS, MAX_RAW_LEN, MAX_SENTENCE_LEN, START_AIS,
    START_NORMAL, START_RESERVED, TERMINATOR,
};

/// A single field value
pub type Field = String<MAX_RAW_LEN>;

/// Errors building a sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SentenceError {
    /// More than [`MAX_FIELDS`] fields
    TooManyFields,
    /// A single field does not fit a sentence
    FieldTooLong,
    /// The body exceeds [`MAX_SENTENCE_LEN`] bytes
    TooLong,
}

/// Sentence category, from the start delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SentenceKind {
    /// `$` - regular instrument data
    Normal,
    /// `!` - AIS encapsulation
    Ais,
    /// `~` - reserved by NMEA
    Reserved,
}

/// A parsed or constructed sentence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    fields: Vec<Field, MAX_FIELDS>,
    body: String<MAX_SENTENCE_LEN>,
}

impl Sentence {
    /// Create an empty sentence
    pub const fn new() -> Self {
        Self {
            fields: Vec::new(),
            body: String::new(),
        }
    }

    /// Build a sentence from field values, tag first
    ///
    /// The body is the comma-joined fields without checksum or terminator.
    pub fn from_fields(fields: &[&str]) -> Result<Self, SentenceError> {
        let mut sentence = Self::new();
        for field in fields {
            sentence.push_field(field)?;
        }
        Ok(sentence)
    }

    /// Append a field whose body text is the value itself
    pub fn push_field(&mut self, value: &str) -> Result<(), SentenceError> {
        self.push_field_as(value, value)
    }

    /// Append a field, writing `text` to the body but storing `value`
    pub fn push_field_as(&mut self, value: &str, text: &str) -> Result<(), SentenceError> {
        if self.fields.is_full() {
            return Err(SentenceError::TooManyFields);
        }
        let value = Field::try_from(value).map_err(|_| SentenceError::FieldTooLong)?;

        let separator = usize::from(!self.fields.is_empty());
        if self.body.len() + separator + text.len() > MAX_SENTENCE_LEN {
            return Err(SentenceError::TooLong);
        }
        if separator > 0 {
            self.push_body(FIELD_SEPARATOR)?;
        }
        self.body
            .push_str(text)
            .map_err(|_| SentenceError::TooLong)?;
        self.fields
            .push(value)
            .map_err(|_| SentenceError::TooManyFields)
    }

    /// Append a transmitted checksum verbatim (`digits` without the `*`)
    pub fn push_checksum(&mut self, digits: &str) -> Result<(), SentenceError> {
        self.push_body(CHECKSUM_MARKER)?;
        self.body
            .push_str(digits)
            .map_err(|_| SentenceError::TooLong)
    }

    /// Append a computed checksum unless the body already carries one
    ///
    /// Returns true if a checksum was appended.
    pub fn ensure_checksum(&mut self) -> Result<bool, SentenceError> {
        if self.has_checksum() {
            return Ok(false);
        }
        let cs = format_checksum(checksum(&self.body));
        self.body
            .push_str(&cs)
            .map_err(|_| SentenceError::TooLong)?;
        Ok(true)
    }

    /// Append the protocol terminator, once
    pub fn terminate(&mut self) -> Result<(), SentenceError> {
        if self.is_terminated() {
            return Ok(());
        }
        self.body
            .push_str(TERMINATOR)
            .map_err(|_| SentenceError::TooLong)
    }

    fn push_body(&mut self, c: char) -> Result<(), SentenceError> {
        self.body.push(c).map_err(|_| SentenceError::TooLong)
    }

    /// The tag (field 0, start delimiter included), or `""` if empty
    pub fn tag(&self) -> &str {
        self.field(0).unwrap_or("")
    }

    /// Sentence category from the start delimiter
    pub fn kind(&self) -> Option<SentenceKind> {
        match *self.body.as_bytes().first()? {
            START_NORMAL => Some(SentenceKind::Normal),
            START_AIS => Some(SentenceKind::Ais),
            START_RESERVED => Some(SentenceKind::Reserved),
            _ => None,
        }
    }

    /// Field value at `index`
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(|f| f.as_str())
    }

    /// Field at `index` as written in the body
    ///
    /// Differs from [`field`](Self::field) where a substitute value was
    /// stored for an empty field.
    pub fn field_text(&self, index: usize) -> Option<&str> {
        if index >= self.fields.len() {
            return None;
        }
        let body = self.body.strip_suffix(TERMINATOR).unwrap_or(&self.body);
        let data = match body.split_once(CHECKSUM_MARKER) {
            Some((data, _)) => data,
            None => body,
        };
        data.split(FIELD_SEPARATOR).nth(index)
    }

    /// All field values, tag first
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of populated fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Textual body as it goes out on the wire
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Body bytes, for transmitters
    pub fn as_bytes(&self) -> &[u8] {
        self.body.as_bytes()
    }

    /// Whether the body carries a `*` checksum marker
    pub fn has_checksum(&self) -> bool {
        self.body.contains(CHECKSUM_MARKER)
    }

    /// Whether the body ends with the protocol terminator
    pub fn is_terminated(&self) -> bool {
        self.body.ends_with(TERMINATOR)
    }

    /// True if no field has been stored
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Sentence {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.body.as_str())
    }
}
