//! Configuration type definitions

use heapless::Vec;
use leeway_protocol::is_start_delimiter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::buffer::DEFAULT_CAPACITY;
use crate::parser::{ChecksumMode, EmptyFieldPolicy, SentenceParser};
use crate::transform::{
    LegacyFilter, LegacyRule, Rewrite, Talker, Transformer, DEFAULT_BATTERY_OFFSET,
    DEFAULT_TALKER, MAX_RULES,
};

/// Largest accepted battery offset magnitude (volts)
pub const MAX_BATTERY_OFFSET: f32 = 5.0;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Buffer capacity is zero
    ZeroCapacity,
    /// Buffer capacity exceeds the storage reserved by the engine
    CapacityTooLarge,
    /// Battery offset is not finite or out of range
    InvalidOffset,
    /// Talker ID is not two uppercase letters or digits
    InvalidTalker,
    /// A legacy tag lacks a start delimiter or has invalid characters
    InvalidTag,
    /// More legacy rules than the filter holds
    TooManyRules,
    /// The TOML document could not be read
    Toml,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Talker ID stamped on rewritten sentences
    pub talker: Talker,
    /// Added to battery voltage readings (volts)
    pub battery_offset: f32,
    /// Number of sentences held before new ones are dropped
    pub buffer_capacity: usize,
    /// Transmitted checksum handling
    pub checksum: ChecksumMode,
    /// Empty field handling
    pub empty_fields: EmptyFieldPolicy,
    /// Legacy tags and their rewrites
    pub legacy: Vec<LegacyRule, MAX_RULES>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut talker = Talker::new();
        let _ = talker.push_str(DEFAULT_TALKER);
        Self {
            talker,
            battery_offset: DEFAULT_BATTERY_OFFSET,
            buffer_capacity: DEFAULT_CAPACITY,
            checksum: ChecksumMode::default(),
            empty_fields: EmptyFieldPolicy::default(),
            legacy: LegacyFilter::robertson().rules().iter().cloned().collect(),
        }
    }
}

impl EngineConfig {
    /// Add a legacy rule
    pub fn add_rule(&mut self, tag: &str, rewrite: Rewrite) -> Result<(), ConfigError> {
        let rule = LegacyRule::new(tag, rewrite).ok_or(ConfigError::InvalidTag)?;
        self.legacy
            .push(rule)
            .map_err(|_| ConfigError::TooManyRules)
    }

    /// Check the configuration for values the engine cannot use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        if !self.battery_offset.is_finite() || self.battery_offset.abs() > MAX_BATTERY_OFFSET {
            return Err(ConfigError::InvalidOffset);
        }

        if self.talker.len() != 2
            || !self
                .talker
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(ConfigError::InvalidTalker);
        }

        for rule in &self.legacy {
            if !is_valid_tag(&rule.tag) {
                return Err(ConfigError::InvalidTag);
            }
        }

        Ok(())
    }

    /// Legacy filter built from the configured rules
    ///
    /// A later rule for the same tag replaces an earlier one.
    pub fn filter(&self) -> LegacyFilter {
        let mut filter = LegacyFilter::new();
        for rule in &self.legacy {
            // Same capacity as `legacy`, cannot overflow
            let _ = filter.insert(rule.clone());
        }
        filter
    }

    /// Legacy transformer for this configuration
    pub fn transformer(&self) -> Transformer {
        Transformer::new(self.filter(), self.talker.clone(), self.battery_offset)
    }

    /// Sentence parser for this configuration
    pub fn parser(&self) -> SentenceParser {
        SentenceParser::new(self.transformer())
            .with_checksum_mode(self.checksum)
            .with_empty_fields(self.empty_fields)
    }
}

/// Start delimiter followed by at least one alphanumeric character
fn is_valid_tag(tag: &str) -> bool {
    let bytes = tag.as_bytes();
    match bytes.split_first() {
        Some((&first, rest)) => {
            is_start_delimiter(first)
                && !rest.is_empty()
                && rest.iter().all(|b| b.is_ascii_alphanumeric())
        }
        None => false,
    }
}
