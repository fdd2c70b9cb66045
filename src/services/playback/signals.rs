//! Typed signals flowing from the media backend and the audio route layer
//! into the coordinator.

use std::{fmt, time::Duration};

use bitflags::bitflags;
use tokio::sync::mpsc::UnboundedSender;

use super::{BufferStatus, MediaDuration, TimeControlStatus};

/// Identifies one session created by the coordinator.
///
/// Ids increase monotonically, so a signal tagged with an older id can
/// always be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Identifies one seek request so its completion can be matched up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeekId(pub(crate) u64);

/// Kinds of listener the coordinator registers on every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Transport clock changes (playing / paused / waiting)
    TimeControlStatus,

    /// Item became ready, carrying its duration
    Readiness,

    /// Item played to its end
    EndOfMedia,

    /// Buffer empty / likely to keep up / full
    BufferStatus,

    /// Elapsed time ticks at the given interval
    PeriodicTick {
        /// Requested tick spacing
        interval: Duration,
    },

    /// A seek request finished or was abandoned by the backend
    SeekCompletion,
}

/// A signal emitted by a media session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionSignal {
    /// Transport clock status changed
    TimeControlStatus(TimeControlStatus),

    /// Session is ready to play
    Ready(MediaDuration),

    /// Item played to its end
    EndOfMedia,

    /// Buffer health changed
    Buffer(BufferStatus),

    /// Current playback position
    Tick(Duration),

    /// Seek request finished
    SeekCompleted {
        /// Request this completion belongs to
        id: SeekId,
        /// `false` when the seek was interrupted
        finished: bool,
    },
}

impl SessionSignal {
    /// Whether a listener of `kind` should receive this signal.
    pub fn is_for(&self, kind: SignalKind) -> bool {
        matches!(
            (self, kind),
            (Self::TimeControlStatus(_), SignalKind::TimeControlStatus)
                | (Self::Ready(_), SignalKind::Readiness)
                | (Self::EndOfMedia, SignalKind::EndOfMedia)
                | (Self::Buffer(_), SignalKind::BufferStatus)
                | (Self::Tick(_), SignalKind::PeriodicTick { .. })
                | (Self::SeekCompleted { .. }, SignalKind::SeekCompletion)
        )
    }
}

/// A session signal tagged with the session that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEnvelope {
    /// Emitting session
    pub session: SessionId,
    /// The signal itself
    pub signal: SessionSignal,
}

/// Callback endpoint handed to a session for one listener registration.
///
/// Safe to call from any thread; delivery is redispatched onto the
/// coordinator's serialized context.
#[derive(Debug, Clone)]
pub struct SignalSink {
    session: SessionId,
    tx: UnboundedSender<SessionEnvelope>,
}

impl SignalSink {
    pub(crate) fn new(session: SessionId, tx: UnboundedSender<SessionEnvelope>) -> Self {
        Self { session, tx }
    }

    /// Session this sink is bound to.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Deliver a signal. Returns `false` once the coordinator is gone.
    pub fn emit(&self, signal: SessionSignal) -> bool {
        self.tx
            .send(SessionEnvelope {
                session: self.session,
                signal,
            })
            .is_ok()
    }
}

bitflags! {
    /// Options attached to the end of an audio interruption.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InterruptionOptions: u32 {
        /// The system suggests resuming playback.
        const SHOULD_RESUME = 0x00000001;
    }
}

/// Another process or a call preempted audio output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionEvent {
    /// Output was taken away
    Began,
    /// Output was handed back
    Ended(InterruptionOptions),
}

/// Why the audio route changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteChangeReason {
    /// The previous output device went away (headphones unplugged)
    OldDeviceUnavailable,
    /// A new output device appeared
    NewDeviceAvailable,
    /// The audio category changed
    CategoryChange,
    /// The route was overridden
    Override,
    /// Anything else
    Other,
}

/// Events from the process-wide audio route layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioRouteEvent {
    /// Interruption began or ended
    Interruption(InterruptionEvent),
    /// Output route changed
    RouteChange(RouteChangeReason),
}

/// Entry point for the platform audio layer to report route events.
#[derive(Debug, Clone)]
pub struct AudioRouteSink {
    tx: UnboundedSender<AudioRouteEvent>,
}

impl AudioRouteSink {
    pub(crate) fn new(tx: UnboundedSender<AudioRouteEvent>) -> Self {
        Self { tx }
    }

    /// Report an event. Returns `false` once the playback service has stopped.
    pub fn emit(&self, event: AudioRouteEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}
