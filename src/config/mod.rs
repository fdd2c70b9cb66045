//! Configuration schema definitions and loading.
//!
//! Defines the complete configuration structure for airwave. All sections
//! are serializable to/from TOML and fall back to defaults when omitted.

mod general;
mod loading;
mod paths;
mod playback;
mod stations;

#[cfg(test)]
mod tests;

pub use general::{GeneralConfig, LogLevel};
pub use paths::ConfigPaths;
pub use playback::{MIN_TICK_INTERVAL, PlaybackConfig, SeekBeforeReady};
pub use stations::{Station, default_stations};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Main configuration structure for airwave.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Playback coordinator settings.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Live stations offered to the user.
    #[serde(default = "default_stations")]
    pub stations: Vec<Station>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            playback: PlaybackConfig::default(),
            stations: default_stations(),
        }
    }
}
