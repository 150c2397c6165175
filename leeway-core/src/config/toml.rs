//! TOML configuration loading
//!
//! Missing keys keep their defaults. Omitting `[[legacy]]` keeps the
//! Robertson databox rules; `legacy = []` disables rewriting.

use super::types::{ConfigError, EngineConfig};

/// Parse and validate a TOML configuration document
pub fn parse_config(input: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = ::toml::from_str(input).map_err(|_e| {
        #[cfg(feature = "defmt")]
        defmt::warn!("Invalid TOML configuration");
        ConfigError::Toml
    })?;

    config.validate()?;

    #[cfg(feature = "defmt")]
    defmt::info!(
        "Config loaded: talker {=str}, {} legacy rules, capacity {}",
        config.talker.as_str(),
        config.legacy.len(),
        config.buffer_capacity
    );

    Ok(config)
}
