//! Raw sentence parsing
//!
//! Turns a framed raw sentence into a [`Sentence`]:
//!
//! ```text
//!   raw ──► split *hh ──► split fields ──► checksum ──► legacy rewrite ──► CRLF
//! ```
//!
//! The checksum is split off before fields are extracted so the last field
//! never carries `*hh`. Sentences without a checksum get a computed one.

use leeway_protocol::checksum::{checksum, parse_checksum};
use leeway_protocol::{
    is_start_delimiter, Sentence, SentenceError, CHECKSUM_MARKER, FIELD_SEPARATOR,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::transform::{TransformError, Transformer};

/// Value stored for an empty field under [`EmptyFieldPolicy::Zero`]
pub const EMPTY_FIELD_SUBSTITUTE: &str = "0";

/// How a transmitted checksum is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChecksumMode {
    /// Keep the transmitted checksum as is
    #[default]
    Trust,
    /// Reject sentences whose checksum does not match their content
    Verify,
}

/// How empty fields are stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EmptyFieldPolicy {
    /// Store `"0"`; the body keeps the field empty
    #[default]
    Zero,
    /// Store the empty string
    Keep,
}

/// Errors parsing a raw sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// The sentence does not begin with `$`, `!` or `~`
    MissingDelimiter,
    /// Nothing follows the start delimiter in the tag field
    EmptyTag,
    /// `*` is not followed by exactly two hex digits
    MalformedChecksum,
    /// Checksum mismatch (only with [`ChecksumMode::Verify`])
    ChecksumMismatch {
        /// Checksum calculated from the content
        expected: u8,
        /// Checksum found in the sentence
        found: u8,
    },
    /// The sentence does not fit
    Sentence(SentenceError),
    /// A legacy sentence could not be rewritten
    Transform(TransformError),
}

impl From<SentenceError> for ParseError {
    fn from(e: SentenceError) -> Self {
        ParseError::Sentence(e)
    }
}

impl From<TransformError> for ParseError {
    fn from(e: TransformError) -> Self {
        ParseError::Transform(e)
    }
}

/// Parses framed raw sentences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentenceParser {
    transformer: Transformer,
    checksum_mode: ChecksumMode,
    empty_fields: EmptyFieldPolicy,
}

impl SentenceParser {
    /// Create a parser with the default policies
    pub fn new(transformer: Transformer) -> Self {
        Self {
            transformer,
            checksum_mode: ChecksumMode::default(),
            empty_fields: EmptyFieldPolicy::default(),
        }
    }

    /// Set the checksum mode
    pub fn with_checksum_mode(mut self, mode: ChecksumMode) -> Self {
        self.checksum_mode = mode;
        self
    }

    /// Set the empty field policy
    pub fn with_empty_fields(mut self, policy: EmptyFieldPolicy) -> Self {
        self.empty_fields = policy;
        self
    }

    /// The legacy transformer
    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// Mutable access to the legacy transformer
    pub fn transformer_mut(&mut self) -> &mut Transformer {
        &mut self.transformer
    }

    /// Current checksum mode
    pub fn checksum_mode(&self) -> ChecksumMode {
        self.checksum_mode
    }

    /// Current empty field policy
    pub fn empty_fields(&self) -> EmptyFieldPolicy {
        self.empty_fields
    }

    /// Parse one raw sentence (no terminator)
    ///
    /// The result is terminated and always carries a checksum. Legacy
    /// sentences come back rewritten.
    pub fn parse(&self, raw: &str) -> Result<Sentence, ParseError> {
        match raw.as_bytes().first() {
            Some(&first) if is_start_delimiter(first) => {}
            _ => return Err(ParseError::MissingDelimiter),
        }

        let (data, digits) = match raw.split_once(CHECKSUM_MARKER) {
            Some((data, digits)) => (data, Some(digits)),
            None => (raw, None),
        };

        let mut sentence = self.split_fields(data)?;

        match digits {
            Some(digits) => {
                let found = parse_checksum(digits).ok_or(ParseError::MalformedChecksum)?;
                if self.checksum_mode == ChecksumMode::Verify {
                    let expected = checksum(data);
                    if expected != found {
                        return Err(ParseError::ChecksumMismatch { expected, found });
                    }
                }
                sentence.push_checksum(digits)?;
            }
            None => {
                sentence.ensure_checksum()?;
            }
        }

        let mut sentence = match self.transformer.transform(&sentence)? {
            Some(rewritten) => rewritten,
            None => sentence,
        };
        sentence.terminate()?;

        #[cfg(feature = "defmt")]
        defmt::trace!("Parsed {=str}", sentence.body());

        Ok(sentence)
    }

    fn split_fields(&self, data: &str) -> Result<Sentence, ParseError> {
        let mut sentence = Sentence::new();

        for (index, text) in data.split(FIELD_SEPARATOR).enumerate() {
            if index == 0 && text.len() < 2 {
                return Err(ParseError::EmptyTag);
            }
            let value = match (text.is_empty(), self.empty_fields) {
                (true, EmptyFieldPolicy::Zero) => EMPTY_FIELD_SUBSTITUTE,
                _ => text,
            };
            sentence.push_field_as(value, text)?;
        }

        Ok(sentence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::LegacyFilter;

    fn parser() -> SentenceParser {
        SentenceParser::default()
    }

    fn passthrough() -> SentenceParser {
        SentenceParser::new(Transformer::new(
            LegacyFilter::new(),
            crate::transform::Talker::try_from("AO").unwrap(),
            0.0,
        ))
    }

    #[test]
    fn test_parse_with_checksum() {
        let s = parser()
            .parse("$GPGLL,5057.970,N,00146.110,E,142451,A*27")
            .unwrap();
        assert_eq!(s.tag(), "$GPGLL");
        assert_eq!(s.field_count(), 7);
        assert_eq!(s.field(6), Some("A"));
        assert_eq!(s.body(), "$GPGLL,5057.970,N,00146.110,E,142451,A*27\r\n");
    }

    #[test]
    fn test_parse_appends_missing_checksum() {
        let s = parser().parse("$GPGGA,123456,data").unwrap();
        assert_eq!(s.field_count(), 3);
        assert_eq!(s.body(), "$GPGGA,123456,data*41\r\n");
    }

    #[test]
    fn test_parse_keeps_transmitted_digits() {
        // Lowercase and wrong digits survive in trust mode
        let s = parser().parse("$GPGLL,5057.970,N*ab").unwrap();
        assert_eq!(s.body(), "$GPGLL,5057.970,N*ab\r\n");
        assert_eq!(s.field(2), Some("N"));
    }

    #[test]
    fn test_parse_verify_mode() {
        let p = parser().with_checksum_mode(ChecksumMode::Verify);
        assert!(p.parse("$GPGLL,5057.970,N,00146.110,E,142451,A*27").is_ok());
        assert_eq!(
            p.parse("$GPGLL,5057.970,N,00146.110,E,142451,A*28"),
            Err(ParseError::ChecksumMismatch {
                expected: 0x27,
                found: 0x28
            })
        );
        // No checksum is still fine: one is computed
        assert!(p.parse("$GPGGA,123456,data").is_ok());
    }

    #[test]
    fn test_parse_malformed_checksum() {
        assert_eq!(
            parser().parse("$GPGLL,1*2"),
            Err(ParseError::MalformedChecksum)
        );
        assert_eq!(
            parser().parse("$GPGLL,1*"),
            Err(ParseError::MalformedChecksum)
        );
        assert_eq!(
            parser().parse("$GPGLL,1*ZZ"),
            Err(ParseError::MalformedChecksum)
        );
    }

    #[test]
    fn test_parse_empty_fields_zero() {
        let s = passthrough().parse("$IIMTW,,C,,").unwrap();
        assert_eq!(s.field_count(), 5);
        assert_eq!(s.field(1), Some("0"));
        assert_eq!(s.field(3), Some("0"));
        assert_eq!(s.field(4), Some("0"));
        assert!(s.body().starts_with("$IIMTW,,C,,*"));
    }

    #[test]
    fn test_parse_empty_fields_keep() {
        let s = passthrough()
            .with_empty_fields(EmptyFieldPolicy::Keep)
            .parse("$IIMTW,,C")
            .unwrap();
        assert_eq!(s.field(1), Some(""));
    }

    #[test]
    fn test_parse_missing_delimiter() {
        assert_eq!(parser().parse(""), Err(ParseError::MissingDelimiter));
        assert_eq!(
            parser().parse("GPGLL,1,2"),
            Err(ParseError::MissingDelimiter)
        );
    }

    #[test]
    fn test_parse_empty_tag() {
        assert_eq!(parser().parse("$"), Err(ParseError::EmptyTag));
        assert_eq!(parser().parse("$,1,2"), Err(ParseError::EmptyTag));
        assert_eq!(parser().parse("$*00"), Err(ParseError::EmptyTag));
    }

    #[test]
    fn test_parse_ais_and_tag_only() {
        let s = parser().parse("!AIVDM").unwrap();
        assert_eq!(s.field_count(), 1);
        assert!(s.has_checksum());
    }

    #[test]
    fn test_parse_too_many_fields() {
        let raw = "$XXXXX,1,2,3,4,5,6,7,8,9,0,1,2,3,4,5,6,7,8,9,0,1";
        assert_eq!(
            parser().parse(raw),
            Err(ParseError::Sentence(SentenceError::TooManyFields))
        );
    }

    #[test]
    fn test_parse_rewrites_depth() {
        let s = parser().parse("$IIDBK,A,0017.6,f,,,").unwrap();
        assert_eq!(s.body(), "$AODBT,0017.6,f,5.4,M,,*46\r\n");
    }

    #[test]
    fn test_parse_rewrites_battery_with_checksum() {
        // Transmitted checksum is discarded with the legacy body
        let s = parser().parse("$PSTOB,13.2,v*00").unwrap();
        assert_eq!(s.body(), "$AOXDR,U,13.4,V,BATT*58\r\n");
    }

    #[test]
    fn test_parse_rejects_empty_legacy_depth() {
        assert_eq!(
            parser().parse("$IIDBK,A,,f"),
            Err(ParseError::Transform(TransformError::InvalidNumber(2)))
        );
    }

    #[test]
    fn test_parse_rewrite_error() {
        assert_eq!(
            parser().parse("$PSTOB"),
            Err(ParseError::Transform(TransformError::MissingField(1)))
        );
    }
}
