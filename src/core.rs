use std::path::Path;

use thiserror::Error;

use crate::services::PlaybackError;

/// Crate-level error type.
#[derive(Error, Debug)]
pub enum AirwaveError {
    /// Configuration is structurally valid TOML but semantically wrong
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML could not be parsed into the configuration schema
    #[error("{0}")]
    TomlParse(String),

    /// Playback could not be started or controlled
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

/// Result alias using [`AirwaveError`].
pub type Result<T> = std::result::Result<T, AirwaveError>;

impl AirwaveError {
    /// Build a `TomlParse` error, naming the file when one is known.
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                AirwaveError::TomlParse(format!(
                    "Failed to parse TOML at {:?}: {}",
                    clean_path, error
                ))
            }
            None => AirwaveError::TomlParse(format!("Failed to parse TOML: {}", error)),
        }
    }
}
