//! Engine configuration
//!
//! Board-agnostic settings for the parser, the legacy transformer and the
//! sentence buffer. With the `toml` feature they can be read from a TOML
//! document.

#[cfg(feature = "toml")]
pub mod toml;
pub mod types;

pub use types::*;
