use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical playback state held by the coordinator.
///
/// Exactly one value is current at any instant. Observers are only told
/// about actual changes, never about same-value writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing has been reported yet
    #[default]
    Unknown,

    /// Playback was requested and the transport is waiting for data
    Buffering,

    /// An item is loaded and can start without further buffering
    Ready,

    /// Audio is being rendered
    Playing,

    /// Playback is paused
    Paused,

    /// The item played to its end
    Ended,

    /// Audio output could not be claimed
    Failed,

    /// The playback buffer ran dry while playing
    Stalled,

    /// The user is dragging the position (UI driven)
    Scrubbing,
}

impl PlaybackState {
    /// Every state, in declaration order.
    pub const ALL: [PlaybackState; 9] = [
        Self::Unknown,
        Self::Buffering,
        Self::Ready,
        Self::Playing,
        Self::Paused,
        Self::Ended,
        Self::Failed,
        Self::Stalled,
        Self::Scrubbing,
    ];

    /// Whether this state counts as "playing" for toggling and output release.
    ///
    /// Buffering counts: the user asked for audio and is waiting on it.
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing | Self::Buffering)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Buffering => "buffering",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
            Self::Failed => "failed",
            Self::Stalled => "stalled",
            Self::Scrubbing => "scrubbing",
        };
        f.write_str(name)
    }
}

/// What the transport is currently doing with its clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeControlStatus {
    /// Clock is running
    Playing,

    /// Clock is stopped
    Paused,

    /// Playback was requested but the transport is waiting for enough data
    WaitingToPlay,
}

impl From<TimeControlStatus> for PlaybackState {
    fn from(status: TimeControlStatus) -> Self {
        match status {
            TimeControlStatus::Playing => Self::Playing,
            TimeControlStatus::Paused => Self::Paused,
            TimeControlStatus::WaitingToPlay => Self::Buffering,
        }
    }
}

/// Duration reported by a session once it becomes ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDuration {
    /// On-demand item with a known length
    Finite(Duration),

    /// Live stream with no end
    Indefinite,
}

impl MediaDuration {
    /// Length truncated to whole seconds, `None` for live streams.
    pub fn whole_seconds(self) -> Option<u64> {
        match self {
            Self::Finite(duration) => Some(duration.as_secs()),
            Self::Indefinite => None,
        }
    }

    /// Whether the item is a live stream.
    pub fn is_indefinite(self) -> bool {
        matches!(self, Self::Indefinite)
    }
}

/// Buffer health reported by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferStatus {
    /// Nothing left to render
    Empty,

    /// Enough data is arriving to keep playing
    LikelyToKeepUp,

    /// Buffer reached capacity
    Full,
}
