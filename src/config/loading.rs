use std::{fs, path::Path};

use tracing::{debug, info, instrument};
use url::Url;

use super::{Config, ConfigPaths, Station};
use crate::{AirwaveError, Result, services::PlaybackError};

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    #[instrument]
    pub fn load(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| AirwaveError::toml_parse(e, Some(path)))?;
        config.validate()?;
        info!(path = %path.display(), stations = config.stations.len(), "Loaded configuration");
        Ok(config)
    }

    /// Load the main configuration file, falling back to defaults when it
    /// does not exist.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined or an
    /// existing file fails to parse.
    pub fn load_or_default() -> Result<Config> {
        let path = ConfigPaths::main_config()?;
        if path.exists() {
            Self::load(&path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Config::default())
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `AirwaveError::TomlParse` for malformed input and
    /// `AirwaveError::Config` for invalid station entries.
    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(content).map_err(|e| AirwaveError::toml_parse(e, None))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    ///
    /// # Errors
    /// Returns `AirwaveError::Config` if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AirwaveError::Config(format!("Failed to serialize configuration: {e}")))
    }

    /// Look up a station by id.
    ///
    /// # Errors
    /// Returns `PlaybackError::UnknownStation` if no station has that id.
    pub fn station(&self, id: &str) -> std::result::Result<&Station, PlaybackError> {
        self.stations
            .iter()
            .find(|station| station.id == id)
            .ok_or_else(|| PlaybackError::UnknownStation(id.to_string()))
    }

    /// Resolve a command-line target: a configured station id, or an
    /// ad-hoc stream URL wrapped in an unnamed station.
    ///
    /// # Errors
    /// Returns `PlaybackError::InvalidUrl` if `target` looks like a URL but
    /// does not parse, `PlaybackError::UnknownStation` otherwise.
    pub fn resolve(&self, target: &str) -> std::result::Result<Station, PlaybackError> {
        if let Ok(station) = self.station(target) {
            return Ok(station.clone());
        }
        if !target.contains("://") {
            return Err(PlaybackError::UnknownStation(target.to_string()));
        }

        let url = Url::parse(target)
            .map_err(|e| PlaybackError::InvalidUrl(format!("{target}: {e}")))?;
        Ok(Station {
            id: url.host_str().unwrap_or("stream").to_string(),
            name: url.to_string(),
            url,
        })
    }

    fn validate(&self) -> Result<()> {
        for (index, station) in self.stations.iter().enumerate() {
            if station.id.trim().is_empty() {
                return Err(AirwaveError::Config(format!(
                    "Station #{} has an empty id",
                    index + 1
                )));
            }
            if self.stations[..index].iter().any(|s| s.id == station.id) {
                return Err(AirwaveError::Config(format!(
                    "Duplicate station id {:?}",
                    station.id
                )));
            }
        }
        Ok(())
    }
}
