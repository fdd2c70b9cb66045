//! In-process media backend that behaves like a live HLS engine.
//!
//! Used by the CLI and integration tests to drive the full playback stack
//! without a platform media engine.

use std::{
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

use super::{
    AudioOutput, ListenerToken, MediaBackend, MediaDuration, MediaSession, PlaybackError, SeekId,
    SessionId, SessionSignal, SignalKind, SignalSink, TimeControlStatus,
};

/// Timing used by simulated sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Delay between the first readiness listener and the ready signal
    pub ready_delay: Duration,
    /// Length reported for URLs that are not HLS playlists
    pub on_demand_duration: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ready_delay: Duration::from_millis(500),
            on_demand_duration: Duration::from_secs(180),
        }
    }
}

/// Backend producing [`SimulatedSession`]s.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    config: SimulationConfig,
}

impl SimulatedBackend {
    /// Create a backend with the given timing.
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl MediaBackend for SimulatedBackend {
    fn create_session(&mut self, url: Url, id: SessionId) -> Box<dyn MediaSession> {
        let duration = if is_live_playlist(&url) {
            MediaDuration::Indefinite
        } else {
            MediaDuration::Finite(self.config.on_demand_duration)
        };
        debug!(%id, %url, ?duration, "Creating simulated session");
        Box::new(SimulatedSession::new(url, duration, self.config.ready_delay))
    }
}

fn is_live_playlist(url: &Url) -> bool {
    url.path().ends_with(".m3u8")
}

struct Listener {
    token: ListenerToken,
    kind: SignalKind,
    sink: SignalSink,
}

struct SessionState {
    listeners: Vec<Listener>,
    ready: bool,
    wants_play: bool,
    status: TimeControlStatus,
    position: Duration,
    duration: MediaDuration,
}

impl SessionState {
    fn emit(&self, signal: SessionSignal) {
        for listener in self.listeners.iter().filter(|l| signal.is_for(l.kind)) {
            listener.sink.emit(signal.clone());
        }
    }

    fn set_status(&mut self, status: TimeControlStatus) {
        if self.status != status {
            self.status = status;
            self.emit(SessionSignal::TimeControlStatus(status));
        }
    }

    fn has_listener(&self, token: ListenerToken) -> bool {
        self.listeners.iter().any(|l| l.token == token)
    }
}

/// A simulated session.
///
/// Readiness fires `ready_delay` after the first readiness listener is
/// attached. The clock advances only while playing; finite items emit
/// end-of-media when the position reaches their duration.
pub struct SimulatedSession {
    url: Url,
    state: Arc<Mutex<SessionState>>,
    ready_delay: Duration,
    next_token: u64,
    tasks: Vec<JoinHandle<()>>,
}

impl SimulatedSession {
    fn new(url: Url, duration: MediaDuration, ready_delay: Duration) -> Self {
        Self {
            url,
            state: Arc::new(Mutex::new(SessionState {
                listeners: Vec::new(),
                ready: false,
                wants_play: false,
                status: TimeControlStatus::Paused,
                position: Duration::ZERO,
                duration,
            })),
            ready_delay,
            next_token: 1,
            tasks: Vec::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }

    fn spawn_readiness(&mut self) {
        let state = Arc::clone(&self.state);
        let delay = self.ready_delay;
        self.tasks.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut guard = lock_state(&state);
            guard.ready = true;
            let duration = guard.duration;
            guard.emit(SessionSignal::Ready(duration));
            if guard.wants_play {
                guard.set_status(TimeControlStatus::Playing);
            }
        }));
    }

    fn spawn_clock(&mut self, token: ListenerToken, interval: Duration) {
        let state = Arc::clone(&self.state);
        self.tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut guard = lock_state(&state);
                if !guard.has_listener(token) {
                    break;
                }
                if guard.status == TimeControlStatus::Playing {
                    guard.position += interval;
                }
                if let MediaDuration::Finite(length) = guard.duration {
                    if guard.position >= length && guard.status == TimeControlStatus::Playing {
                        guard.position = length;
                        guard.wants_play = false;
                        guard.set_status(TimeControlStatus::Paused);
                        guard.emit(SessionSignal::EndOfMedia);
                    }
                }
                let position = guard.position;
                for listener in guard.listeners.iter().filter(|l| l.token == token) {
                    listener.sink.emit(SessionSignal::Tick(position));
                }
            }
        }));
    }
}

impl MediaSession for SimulatedSession {
    fn url(&self) -> &Url {
        &self.url
    }

    fn play(&mut self) {
        let mut state = self.lock();
        state.wants_play = true;
        let status = if state.ready {
            TimeControlStatus::Playing
        } else {
            TimeControlStatus::WaitingToPlay
        };
        state.set_status(status);
    }

    fn pause(&mut self) {
        let mut state = self.lock();
        state.wants_play = false;
        state.set_status(TimeControlStatus::Paused);
    }

    fn seek(&mut self, offset: Duration, request: SeekId) {
        let mut state = self.lock();
        let finished = state.ready;
        if finished {
            state.position = match state.duration {
                MediaDuration::Finite(length) => offset.min(length),
                MediaDuration::Indefinite => offset,
            };
        }
        state.emit(SessionSignal::SeekCompleted {
            id: request,
            finished,
        });
    }

    fn is_ready(&self) -> bool {
        self.lock().ready
    }

    fn duration(&self) -> Option<MediaDuration> {
        let state = self.lock();
        state.ready.then_some(state.duration)
    }

    fn time_control_status(&self) -> TimeControlStatus {
        self.lock().status
    }

    fn add_listener(&mut self, kind: SignalKind, sink: SignalSink) -> ListenerToken {
        let token = ListenerToken(self.next_token);
        self.next_token += 1;

        let first_readiness = {
            let mut state = self.lock();
            let first = kind == SignalKind::Readiness
                && !state.listeners.iter().any(|l| l.kind == SignalKind::Readiness);
            state.listeners.push(Listener { token, kind, sink });
            first
        };

        if first_readiness {
            self.spawn_readiness();
        }
        if let SignalKind::PeriodicTick { interval } = kind {
            self.spawn_clock(token, interval);
        }

        token
    }

    fn remove_listener(&mut self, token: ListenerToken) {
        self.lock().listeners.retain(|l| l.token != token);
    }
}

impl Drop for SimulatedSession {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Audio output stand-in that records whether it is claimed.
///
/// Clones share state, so a test can keep one and hand the other to the
/// service.
#[derive(Debug, Clone, Default)]
pub struct SimulatedOutput {
    active: Arc<AtomicBool>,
    fail_activation: bool,
}

impl SimulatedOutput {
    /// Output that activates successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Output whose activation always fails.
    pub fn failing() -> Self {
        Self {
            fail_activation: true,
            ..Self::default()
        }
    }

    /// Whether the output is currently claimed.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl AudioOutput for SimulatedOutput {
    fn activate(&mut self) -> Result<(), PlaybackError> {
        if self.fail_activation {
            return Err(PlaybackError::AudioActivation(
                "simulated output refused activation".to_string(),
            ));
        }
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn deactivate(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}
