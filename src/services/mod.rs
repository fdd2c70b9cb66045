/// Shared reactive building blocks
pub mod common;
/// Live stream playback coordination
pub mod playback;

pub use playback::{
    AudioOutput, AudioRouteEvent, AudioRouteSink, MediaBackend, MediaSession,
    PeriodicTimeObserver, PlaybackCoordinator, PlaybackError, PlaybackHandle, PlaybackObserver,
    PlaybackService, PlaybackState,
};
