use std::time::Duration;

use url::Url;

use super::{
    MediaDuration, PlaybackError, SeekId, SessionId, SignalKind, SignalSink, TimeControlStatus,
};

/// Token returned by a session for one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub u64);

/// One playable item plus the engine state driving it.
///
/// Implementations wrap the platform media engine. They never call back into
/// the coordinator directly; every notification goes through a
/// [`SignalSink`] handed over in [`MediaSession::add_listener`].
pub trait MediaSession: Send {
    /// Stream URL this session was created from
    fn url(&self) -> &Url;

    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Move to `offset`; the outcome arrives as a
    /// [`SessionSignal::SeekCompleted`](super::SessionSignal::SeekCompleted) tagged with `request`
    fn seek(&mut self, offset: Duration, request: SeekId);

    /// Whether the item has reported readiness
    fn is_ready(&self) -> bool;

    /// Item duration, `None` until ready
    fn duration(&self) -> Option<MediaDuration>;

    /// Current transport clock status
    fn time_control_status(&self) -> TimeControlStatus;

    /// Register a listener for one signal kind
    fn add_listener(&mut self, kind: SignalKind, sink: SignalSink) -> ListenerToken;

    /// Remove a listener previously returned by `add_listener`
    fn remove_listener(&mut self, token: ListenerToken);
}

/// Factory for media sessions.
pub trait MediaBackend: Send + 'static {
    /// Create a session for `url` without starting playback.
    fn create_session(&mut self, url: Url, id: SessionId) -> Box<dyn MediaSession>;
}

/// Process-wide audio output activation.
pub trait AudioOutput: Send + 'static {
    /// Claim the output device.
    ///
    /// # Errors
    /// Returns `PlaybackError::AudioActivation` if the device cannot be claimed.
    fn activate(&mut self) -> Result<(), PlaybackError>;

    /// Release the output device.
    fn deactivate(&mut self);
}
