//! Configuration schema definitions and loading.
//!
//! Defines the configuration structure for the bridge: general settings and
//! the MPRIS section. All configurations are serializable to/from TOML.

mod general;
mod loading;
mod mpris;
mod paths;

#[cfg(test)]
mod tests;

pub use general::{GeneralConfig, LogLevel};
pub use mpris::MprisConfig;
pub use paths::ConfigPaths;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Main configuration structure.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// MPRIS bridge settings.
    #[serde(default)]
    pub mpris: MprisConfig,
}
