//! Legacy sentence rewriting
//!
//! Some instrument buses (Robertson/Stowe databoxes in particular) emit
//! sentences that do not follow NMEA0183. Each known offender is listed in
//! a [`LegacyFilter`] together with the [`Rewrite`] that turns it into a
//! compliant sentence. Tags are matched exactly.
//!
//! Rewritten sentences carry our own talker ID (`AO` by default) and a
//! freshly computed checksum.

use core::fmt::Write;

use heapless::{String, Vec};
use leeway_protocol::{Sentence, SentenceError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Feet to meters
pub const FEET_TO_METERS: f32 = 0.3048;

/// Offset between the battery monitor and the databox reading (volts)
pub const DEFAULT_BATTERY_OFFSET: f32 = 0.2;

/// Talker ID used for rewritten sentences
pub const DEFAULT_TALKER: &str = "AO";

/// Maximum rules in a filter
pub const MAX_RULES: usize = 8;

/// Maximum tag length, start delimiter included
pub const MAX_TAG_LEN: usize = 16;

/// Sentence tag as matched by the filter
pub type Tag = String<MAX_TAG_LEN>;

/// Two-character talker ID
pub type Talker = String<2>;

/// Formatted numeric field
type Number = String<16>;

/// Known legacy rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Rewrite {
    /// `$--DBK,A,x.x,f,...` with a validity flag → `$--DBT` with meters added
    DepthBelowKeel,
    /// `$PSTOB,x.x,v` battery voltage → `$--XDR,U,x.x,V,BATT`
    BatteryVoltage,
}

/// A tag and the rewrite applied to it
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LegacyRule {
    /// Tag to match, start delimiter included (e.g. `$IIDBK`)
    pub tag: Tag,
    /// Rewrite to apply
    pub rewrite: Rewrite,
}

impl LegacyRule {
    /// Create a rule; `None` if the tag is too long
    pub fn new(tag: &str, rewrite: Rewrite) -> Option<Self> {
        Some(Self {
            tag: Tag::try_from(tag).ok()?,
            rewrite,
        })
    }
}

/// Errors rewriting a matched sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransformError {
    /// A field the rewrite needs is absent (field index)
    MissingField(u8),
    /// A numeric field could not be read or formatted (field index)
    InvalidNumber(u8),
    /// The rewritten sentence does not fit
    Sentence(SentenceError),
}

impl From<SentenceError> for TransformError {
    fn from(e: SentenceError) -> Self {
        TransformError::Sentence(e)
    }
}

/// Set of legacy tags and their rewrites
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyFilter {
    rules: Vec<LegacyRule, MAX_RULES>,
}

impl LegacyFilter {
    /// Create an empty filter (everything passes through)
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Filter for the Robertson databox: `$IIDBK` and `$PSTOB`
    pub fn robertson() -> Self {
        let mut filter = Self::new();
        for (tag, rewrite) in [
            ("$IIDBK", Rewrite::DepthBelowKeel),
            ("$PSTOB", Rewrite::BatteryVoltage),
        ] {
            if let Some(rule) = LegacyRule::new(tag, rewrite) {
                let _ = filter.insert(rule);
            }
        }
        filter
    }

    /// Add a rule, replacing any rule for the same tag
    ///
    /// Gives the rule back if the filter is full.
    pub fn insert(&mut self, rule: LegacyRule) -> Result<(), LegacyRule> {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.tag == rule.tag) {
            existing.rewrite = rule.rewrite;
            return Ok(());
        }
        self.rules.push(rule)
    }

    /// Remove the rule for `tag`, returning its rewrite
    pub fn remove(&mut self, tag: &str) -> Option<Rewrite> {
        let index = self.rules.iter().position(|r| r.tag == tag)?;
        Some(self.rules.swap_remove(index).rewrite)
    }

    /// Rewrite registered for `tag`
    pub fn lookup(&self, tag: &str) -> Option<Rewrite> {
        self.rules
            .iter()
            .find(|r| r.tag == tag)
            .map(|r| r.rewrite)
    }

    /// Registered rules
    pub fn rules(&self) -> &[LegacyRule] {
        &self.rules
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no rule is registered
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Rewrites legacy sentences into compliant ones
#[derive(Debug, Clone, PartialEq)]
pub struct Transformer {
    filter: LegacyFilter,
    talker: Talker,
    battery_offset: f32,
}

impl Default for Transformer {
    fn default() -> Self {
        let mut talker = Talker::new();
        let _ = talker.push_str(DEFAULT_TALKER);
        Self::new(LegacyFilter::robertson(), talker, DEFAULT_BATTERY_OFFSET)
    }
}

impl Transformer {
    /// Create a transformer
    pub fn new(filter: LegacyFilter, talker: Talker, battery_offset: f32) -> Self {
        Self {
            filter,
            talker,
            battery_offset,
        }
    }

    /// The legacy filter
    pub fn filter(&self) -> &LegacyFilter {
        &self.filter
    }

    /// Mutable access to the legacy filter
    pub fn filter_mut(&mut self) -> &mut LegacyFilter {
        &mut self.filter
    }

    /// Battery calibration offset (volts)
    pub fn battery_offset(&self) -> f32 {
        self.battery_offset
    }

    /// Whether `tag` is subject to rewriting
    pub fn matches(&self, tag: &str) -> bool {
        self.filter.lookup(tag).is_some()
    }

    /// Rewrite a parsed sentence
    ///
    /// Returns `Ok(None)` if the tag is not in the filter and the sentence
    /// should pass through unchanged.
    pub fn transform(&self, input: &Sentence) -> Result<Option<Sentence>, TransformError> {
        let Some(rewrite) = self.filter.lookup(input.tag()) else {
            return Ok(None);
        };

        let mut output = match rewrite {
            Rewrite::DepthBelowKeel => self.depth_below_keel(input)?,
            Rewrite::BatteryVoltage => self.battery_voltage(input)?,
        };
        output.ensure_checksum()?;

        #[cfg(feature = "defmt")]
        defmt::info!("Rewrote {=str} as {=str}", input.tag(), output.body());

        Ok(Some(output))
    }

    /// `[tag, status, depth_ft, unit, ...]` → `[$--DBT, depth_ft, unit, depth_m, M, , ]`
    ///
    /// The status flag (`A`/`V`) is dropped and every field shifts left.
    /// Fields are read as transmitted, so an empty depth is an error rather
    /// than a substituted zero.
    fn depth_below_keel(&self, input: &Sentence) -> Result<Sentence, TransformError> {
        let feet_text = input
            .field_text(2)
            .ok_or(TransformError::MissingField(2))?;
        let unit = input.field_text(3).filter(|u| !u.is_empty()).unwrap_or("f");
        let feet = read_number(feet_text, 2)?;
        let meters = format_tenths(feet * FEET_TO_METERS, 2)?;

        let tag = self.tag("DBT")?;
        Ok(Sentence::from_fields(&[
            tag.as_str(),
            feet_text,
            unit,
            meters.as_str(),
            "M",
            "",
            "",
        ])?)
    }

    /// `[tag, voltage, unit]` → `[$--XDR, U, voltage + offset, UNIT, BATT]`
    fn battery_voltage(&self, input: &Sentence) -> Result<Sentence, TransformError> {
        let volts = read_number(
            input.field_text(1).ok_or(TransformError::MissingField(1))?,
            1,
        )?;
        let unit = input
            .field_text(2)
            .ok_or(TransformError::MissingField(2))?;
        let value = format_tenths(volts + self.battery_offset, 1)?;

        let mut unit_upper = Number::new();
        for c in unit.chars() {
            unit_upper
                .push(c.to_ascii_uppercase())
                .map_err(|_| TransformError::Sentence(SentenceError::FieldTooLong))?;
        }

        let tag = self.tag("XDR")?;
        Ok(Sentence::from_fields(&[
            tag.as_str(),
            "U",
            value.as_str(),
            unit_upper.as_str(),
            "BATT",
        ])?)
    }

    /// `$` + talker + sentence ID
    fn tag(&self, sentence_id: &str) -> Result<Tag, TransformError> {
        let mut tag = Tag::new();
        write!(tag, "${}{}", self.talker, sentence_id)
            .map_err(|_| TransformError::Sentence(SentenceError::FieldTooLong))?;
        Ok(tag)
    }
}

fn read_number(text: &str, index: u8) -> Result<f32, TransformError> {
    match text.trim().parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(TransformError::InvalidNumber(index)),
    }
}

/// Largest magnitude written by [`format_tenths`]
const MAX_FORMATTED: f32 = 1.0e8;

/// One decimal place, as the display expects
///
/// Halves round away from zero (`12.25` → `12.3`). A value that rounds to
/// zero is written `0.0`, never `-0.0`.
fn format_tenths(value: f32, index: u8) -> Result<Number, TransformError> {
    if !value.is_finite() || value.abs() >= MAX_FORMATTED {
        return Err(TransformError::InvalidNumber(index));
    }

    let scaled = value * 10.0;
    // Truncation after the half offset rounds away from zero
    let tenths = if scaled < 0.0 {
        (scaled - 0.5) as i64
    } else {
        (scaled + 0.5) as i64
    };

    let sign = if tenths < 0 { "-" } else { "" };
    let magnitude = tenths.unsigned_abs();
    let mut out = Number::new();
    write!(out, "{}{}.{}", sign, magnitude / 10, magnitude % 10)
        .map_err(|_| TransformError::InvalidNumber(index))?;
    Ok(out)
}
