use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Shortest tick spacing the coordinator will request.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Playback coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Milliseconds between elapsed-time ticks delivered to time observers.
    pub tick_interval_ms: u64,

    /// What to do with a seek requested before the stream is ready.
    pub seek_before_ready: SeekBeforeReady,

    /// Release the audio output as soon as playback is paused.
    pub end_session_on_pause: bool,
}

impl PlaybackConfig {
    /// Tick spacing as a `Duration`, never shorter than one millisecond.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms).max(MIN_TICK_INTERVAL)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            seek_before_ready: SeekBeforeReady::Drop,
            end_session_on_pause: false,
        }
    }
}

/// Policy for seeks issued before the session reports readiness.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeekBeforeReady {
    /// Ignore the request; its completion reports `false`.
    #[default]
    Drop,

    /// Keep the latest request and issue it once the session is ready.
    Queue,
}
