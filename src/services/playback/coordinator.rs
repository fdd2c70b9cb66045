use std::{collections::HashMap, sync::Weak, time::Duration};

use chrono::Local;
use futures::Stream;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::{MIN_TICK_INTERVAL, PlaybackConfig, SeekBeforeReady},
    services::common::Property,
};

use super::{
    AudioOutput, AudioRouteEvent, BufferStatus, InterruptionEvent, InterruptionOptions,
    MediaBackend, MediaDuration, PeriodicTimeObserver, PlaybackObserver, PlaybackState,
    RouteChangeReason, SeekId, SessionEnvelope, SessionId, SessionSignal,
    observers::ObserverRegistry, transport::Transport,
};

/// Invoked once with `true` when a seek finished, `false` when it was
/// dropped, superseded or interrupted.
pub type SeekCompletion = Box<dyn FnOnce(bool) + Send>;

/// Tunables the coordinator needs from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Spacing of periodic time ticks, raised to one millisecond if shorter
    pub tick_interval: Duration,
    /// What to do with a seek issued before the session is ready
    pub seek_before_ready: SeekBeforeReady,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            seek_before_ready: SeekBeforeReady::Drop,
        }
    }
}

impl From<&PlaybackConfig> for CoordinatorSettings {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            seek_before_ready: config.seek_before_ready,
        }
    }
}

/// Read-only reactive view of the coordinator's public state.
#[derive(Clone, Debug)]
pub struct PlaybackProperties {
    /// Canonical playback state
    pub state: Property<PlaybackState>,
    /// Whole-second duration of the current item, `None` for live streams
    pub asset_duration: Property<Option<u64>>,
    /// URL of the attached session
    pub current_url: Property<Option<Url>>,
}

impl PlaybackProperties {
    fn new() -> Self {
        Self {
            state: Property::new(PlaybackState::Unknown),
            asset_duration: Property::new(None),
            current_url: Property::new(None),
        }
    }

    /// Stream of full snapshots, yielded whenever any property changes.
    pub fn watch(&self) -> impl Stream<Item = Self> + Send + use<> {
        crate::watch_all!(self, state, asset_duration, current_url)
    }
}

struct PendingSeek {
    offset: Duration,
    completion: Option<SeekCompletion>,
}

/// Owns the current media session and reduces its signals to one
/// [`PlaybackState`].
///
/// Every method expects to run on a single serialized context; see
/// [`PlaybackService`](super::PlaybackService) for the task that provides one.
pub struct PlaybackCoordinator {
    backend: Box<dyn MediaBackend>,
    output: Box<dyn AudioOutput>,
    settings: CoordinatorSettings,
    signal_tx: UnboundedSender<SessionEnvelope>,

    transport: Option<Transport>,
    next_session: u64,
    next_seek: u64,

    playback_state: PlaybackState,
    asset_duration: Option<u64>,
    output_active: bool,

    pending_seek: Option<PendingSeek>,
    seeks_in_flight: HashMap<SeekId, SeekCompletion>,

    playback_observers: ObserverRegistry<dyn PlaybackObserver>,
    time_observers: ObserverRegistry<dyn PeriodicTimeObserver>,
    properties: PlaybackProperties,
}

impl PlaybackCoordinator {
    /// Create a coordinator with no session attached.
    ///
    /// Sessions report through sinks feeding `signal_tx`; whoever owns the
    /// receiving end must pass each envelope to
    /// [`handle_session_signal`](Self::handle_session_signal).
    pub fn new(
        backend: Box<dyn MediaBackend>,
        output: Box<dyn AudioOutput>,
        mut settings: CoordinatorSettings,
        signal_tx: UnboundedSender<SessionEnvelope>,
    ) -> Self {
        settings.tick_interval = settings.tick_interval.max(MIN_TICK_INTERVAL);
        Self {
            backend,
            output,
            settings,
            signal_tx,
            transport: None,
            next_session: 1,
            next_seek: 1,
            playback_state: PlaybackState::Unknown,
            asset_duration: None,
            output_active: false,
            pending_seek: None,
            seeks_in_flight: HashMap::new(),
            playback_observers: ObserverRegistry::new(),
            time_observers: ObserverRegistry::new(),
            properties: PlaybackProperties::new(),
        }
    }

    // Commands

    /// Replace the current session with one for `url` and start playing it.
    pub fn play_url(&mut self, url: Url) {
        self.set_item(url);
        self.play();
    }

    /// Replace the current session with one for `url` without starting it.
    pub fn set_item(&mut self, url: Url) {
        if let Some(old) = self.transport.take() {
            old.detach();
        }
        self.abandon_seeks();

        let id = SessionId(self.next_session);
        self.next_session += 1;

        info!(%id, %url, "Attaching new session");
        let session = self.backend.create_session(url.clone(), id);
        self.transport = Some(Transport::attach(
            id,
            session,
            &self.signal_tx,
            self.settings.tick_interval,
        ));

        self.properties.current_url.set(Some(url));
        self.set_asset_duration(None);
        self.set_playback_state(PlaybackState::Unknown);
    }

    /// Claim audio output and start or resume the current session.
    ///
    /// The output is asked to activate on every call; the platform may have
    /// taken it away since the last one.
    pub fn play(&mut self) {
        self.activate_output();

        match self.transport.as_mut() {
            Some(transport) => transport.session_mut().play(),
            None => debug!("play() without an attached session"),
        }
    }

    /// Pause the current session. Does nothing unless something is playing.
    pub fn pause(&mut self) {
        let state = self.playback_state;
        let wants_audio = state.is_playing() || state == PlaybackState::Stalled;
        match self.transport.as_mut() {
            Some(transport) if wants_audio => transport.session_mut().pause(),
            Some(_) => debug!(%state, "pause() while not playing"),
            None => debug!("pause() without an attached session"),
        }
    }

    /// Pause when playing, play otherwise.
    pub fn toggle_play_pause(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Move the current session to `offset`.
    ///
    /// Before the session is ready the request is dropped or queued
    /// according to [`SeekBeforeReady`]; neither case is an error.
    pub fn seek(&mut self, offset: Duration, completion: Option<SeekCompletion>) {
        let Some(transport) = self.transport.as_ref() else {
            debug!("seek() without an attached session");
            complete(completion, false);
            return;
        };

        // A queued seek waits for the ready signal even if the backend already
        // flipped its flag, so later requests queue behind it and replace it.
        if self.pending_seek.is_none() && transport.session().is_ready() {
            self.issue_seek(offset, completion);
            return;
        }

        match self.settings.seek_before_ready {
            SeekBeforeReady::Drop => {
                debug!(?offset, "Dropping seek issued before readiness");
                complete(completion, false);
            }
            SeekBeforeReady::Queue => {
                debug!(?offset, "Queueing seek until readiness");
                let superseded = self.pending_seek.replace(PendingSeek { offset, completion });
                if let Some(superseded) = superseded {
                    complete(superseded.completion, false);
                }
            }
        }
    }

    /// Release audio output unless something is still playing.
    pub fn end_unused_audio_session(&mut self) {
        if self.is_playing() {
            debug!("Keeping audio output, playback in progress");
            return;
        }
        if self.output_active {
            self.output.deactivate();
            self.output_active = false;
            info!("Released audio output");
        }
    }

    // Observers

    /// Register a state observer. Registering twice is a no-op.
    pub fn add_playback_observer(&mut self, observer: Weak<dyn PlaybackObserver>) {
        self.playback_observers.add(observer);
    }

    /// Unregister a state observer. Unknown observers are ignored.
    pub fn remove_playback_observer(&mut self, observer: &Weak<dyn PlaybackObserver>) {
        self.playback_observers.remove(observer);
    }

    /// Register a time observer. Registering twice is a no-op.
    pub fn add_periodic_time_observer(&mut self, observer: Weak<dyn PeriodicTimeObserver>) {
        self.time_observers.add(observer);
    }

    /// Unregister a time observer. Unknown observers are ignored.
    pub fn remove_periodic_time_observer(&mut self, observer: &Weak<dyn PeriodicTimeObserver>) {
        self.time_observers.remove(observer);
    }

    /// Number of registered state observers.
    pub fn playback_observer_count(&self) -> usize {
        self.playback_observers.len()
    }

    /// Number of registered time observers.
    pub fn periodic_time_observer_count(&self) -> usize {
        self.time_observers.len()
    }

    // Queries

    /// Current canonical state.
    pub fn playback_state(&self) -> PlaybackState {
        self.playback_state
    }

    /// `true` while playing or buffering.
    pub fn is_playing(&self) -> bool {
        self.playback_state.is_playing()
    }

    /// Whole-second duration of the current item.
    pub fn asset_duration(&self) -> Option<u64> {
        self.asset_duration
    }

    /// URL of the attached session.
    pub fn current_url(&self) -> Option<&Url> {
        self.transport.as_ref().map(|t| t.session().url())
    }

    /// Id of the attached session.
    pub fn current_session(&self) -> Option<SessionId> {
        self.transport.as_ref().map(Transport::id)
    }

    /// Whether audio output is currently claimed.
    pub fn output_active(&self) -> bool {
        self.output_active
    }

    /// Reactive view of the public state.
    pub fn properties(&self) -> &PlaybackProperties {
        &self.properties
    }

    // Signals

    /// Apply one signal from a session.
    ///
    /// Signals from any session other than the attached one are discarded.
    pub fn handle_session_signal(&mut self, envelope: SessionEnvelope) {
        let SessionEnvelope { session, signal } = envelope;

        if self.current_session() != Some(session) {
            debug!(%session, ?signal, "Discarding signal from detached session");
            return;
        }

        match signal {
            SessionSignal::TimeControlStatus(status) => self.set_playback_state(status.into()),
            SessionSignal::Ready(duration) => self.handle_ready(duration),
            SessionSignal::EndOfMedia => self.set_playback_state(PlaybackState::Ended),
            SessionSignal::Buffer(status) => self.handle_buffer_status(status),
            SessionSignal::Tick(time) => self.time_observers.for_each(|o| o.update(time)),
            SessionSignal::SeekCompleted { id, finished } => {
                complete(self.seeks_in_flight.remove(&id), finished);
            }
        }
    }

    /// Apply one event from the audio route layer.
    pub fn handle_audio_route_event(&mut self, event: AudioRouteEvent) {
        match event {
            AudioRouteEvent::Interruption(InterruptionEvent::Ended(options))
                if options.contains(InterruptionOptions::SHOULD_RESUME) =>
            {
                info!("Interruption ended, resuming");
                self.play();
            }
            AudioRouteEvent::Interruption(InterruptionEvent::Began) => {
                info!("Audio output interrupted");
                self.output_active = false;
            }
            AudioRouteEvent::RouteChange(RouteChangeReason::OldDeviceUnavailable) => {
                info!("Output device went away, pausing");
                self.pause();
            }
            other => debug!(?other, "Ignoring audio route event"),
        }
    }

    /// Detach the current session and release audio output.
    pub fn shutdown(&mut self) {
        if let Some(transport) = self.transport.take() {
            transport.detach();
        }
        self.abandon_seeks();
        self.properties.current_url.set(None);
        if self.output_active {
            self.output.deactivate();
            self.output_active = false;
        }
    }

    fn handle_ready(&mut self, duration: MediaDuration) {
        match duration.whole_seconds() {
            Some(seconds) => {
                info!(seconds, "Session ready");
                self.set_asset_duration(Some(seconds));
            }
            None => {
                info!("Session ready, live stream");
                self.notify_player_item_set();
            }
        }

        if !self.is_playing() && self.playback_state != PlaybackState::Failed {
            self.set_playback_state(PlaybackState::Ready);
        }

        if let Some(PendingSeek { offset, completion }) = self.pending_seek.take() {
            self.issue_seek(offset, completion);
        }
    }

    fn handle_buffer_status(&mut self, status: BufferStatus) {
        match status {
            BufferStatus::Empty if self.playback_state == PlaybackState::Playing => {
                self.set_playback_state(PlaybackState::Stalled);
            }
            BufferStatus::LikelyToKeepUp | BufferStatus::Full
                if self.playback_state == PlaybackState::Stalled =>
            {
                let status = self
                    .transport
                    .as_ref()
                    .map(|t| t.session().time_control_status());
                if let Some(status) = status {
                    self.set_playback_state(status.into());
                }
            }
            _ => {}
        }
    }

    fn issue_seek(&mut self, offset: Duration, completion: Option<SeekCompletion>) {
        let Some(transport) = self.transport.as_mut() else {
            complete(completion, false);
            return;
        };

        let id = SeekId(self.next_seek);
        self.next_seek += 1;

        if let Some(completion) = completion {
            self.seeks_in_flight.insert(id, completion);
        }
        transport.session_mut().seek(offset, id);
    }

    fn abandon_seeks(&mut self) {
        if let Some(pending) = self.pending_seek.take() {
            complete(pending.completion, false);
        }
        for (_, completion) in self.seeks_in_flight.drain() {
            completion(false);
        }
    }

    fn activate_output(&mut self) {
        match self.output.activate() {
            Ok(()) => {
                if !self.output_active {
                    info!("Activated audio output");
                }
                self.output_active = true;
            }
            Err(e) => {
                self.output_active = false;
                warn!(error = %e, "Audio output activation failed");
                self.set_playback_state(PlaybackState::Failed);
            }
        }
    }

    fn set_playback_state(&mut self, state: PlaybackState) {
        if state == self.playback_state {
            return;
        }

        let previous = self.playback_state;
        self.playback_state = state;
        self.properties.state.set(state);

        info!(
            from = %previous,
            to = %state,
            at = %Local::now().to_rfc3339(),
            "Playback state changed"
        );

        self.playback_observers
            .for_each(|o| o.playback_state_changed(state));
    }

    fn set_asset_duration(&mut self, duration: Option<u64>) {
        self.asset_duration = duration;
        self.properties.asset_duration.set(duration);
        if duration.is_some() {
            self.notify_player_item_set();
        }
    }

    fn notify_player_item_set(&mut self) {
        self.playback_observers.for_each(|o| o.player_item_set());
    }
}

impl Drop for PlaybackCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn complete(completion: Option<SeekCompletion>, finished: bool) {
    if let Some(completion) = completion {
        completion(finished);
    }
}
