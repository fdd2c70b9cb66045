/// Errors that can occur during playback operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The audio output device could not be claimed
    #[error("Failed to activate audio output: {0}")]
    AudioActivation(String),

    /// The playback service task is no longer running
    #[error("Playback service is not running")]
    ServiceUnavailable,

    /// No station is configured with the given id
    #[error("Station {0:?} not found")]
    UnknownStation(String),

    /// A stream URL could not be parsed
    #[error("Invalid stream URL: {0}")]
    InvalidUrl(String),
}
