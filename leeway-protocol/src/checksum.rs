//! NMEA0183 checksum computation and validation
//!
//! The checksum is the XOR of every character between the start delimiter
//! and the `*` marker, rendered as two zero-padded hex digits after the
//! marker (`*0A`). Uppercase digits are emitted; either case is accepted.

use core::fmt::Write;

use heapless::String;

use crate::{is_start_delimiter, CHECKSUM_MARKER, TERMINATOR};

/// Errors from validating an inline checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChecksumError {
    /// No `*` marker in the sentence
    Missing,
    /// The marker is not followed by exactly two hex digits
    Malformed,
    /// The transmitted checksum does not match the sentence content
    Mismatch {
        /// Checksum calculated from the sentence content
        expected: u8,
        /// Checksum found in the sentence
        found: u8,
    },
}

/// Calculate the checksum of a sentence body
///
/// A leading start delimiter is skipped and calculation stops at the first
/// `*`, so both `"GPGLL,1"` and `"$GPGLL,1*hh"` give the same value.
pub fn checksum(body: &str) -> u8 {
    let bytes = body.as_bytes();
    let bytes = match bytes.first() {
        Some(&first) if is_start_delimiter(first) => &bytes[1..],
        _ => bytes,
    };

    bytes
        .iter()
        .take_while(|&&byte| byte != CHECKSUM_MARKER as u8)
        .fold(0u8, |acc, &byte| acc ^ byte)
}

/// Format a checksum as it appears on the wire: `*` plus two hex digits
pub fn format_checksum(checksum: u8) -> String<3> {
    let mut out = String::new();
    // Always 3 bytes, cannot overflow
    let _ = write!(out, "{}{:02X}", CHECKSUM_MARKER, checksum);
    out
}

/// Parse the two hex digits following a `*` marker
pub fn parse_checksum(digits: &str) -> Option<u8> {
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}

/// Check an inline checksum against the sentence content
///
/// Accepts a sentence with or without its start delimiter and terminator.
pub fn validate(sentence: &str) -> Result<(), ChecksumError> {
    let sentence = sentence.strip_suffix(TERMINATOR).unwrap_or(sentence);
    let (_, digits) = sentence
        .split_once(CHECKSUM_MARKER)
        .ok_or(ChecksumError::Missing)?;
    let found = parse_checksum(digits).ok_or(ChecksumError::Malformed)?;
    let expected = checksum(sentence);

    if expected != found {
        return Err(ChecksumError::Mismatch { expected, found });
    }

    Ok(())
}
