use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use futures::Stream;
use tokio::{
    sync::{
        mpsc::{self, Receiver, Sender, UnboundedReceiver},
        oneshot,
    },
    task::JoinHandle,
};
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::PlaybackConfig;

use super::{
    AudioOutput, AudioRouteEvent, AudioRouteSink, CoordinatorSettings, MediaBackend,
    PeriodicTimeObserver, PlaybackCoordinator, PlaybackError, PlaybackObserver,
    PlaybackProperties, PlaybackState, SessionEnvelope,
};

/// Commands sent to the playback actor
enum Command {
    PlayUrl(Url),
    SetItem(Url),
    Play,
    Pause,
    TogglePlayPause,
    Seek {
        offset: Duration,
        reply: oneshot::Sender<bool>,
    },
    EndUnusedAudioSession,
    AddPlaybackObserver(Weak<dyn PlaybackObserver>),
    RemovePlaybackObserver(Weak<dyn PlaybackObserver>),
    AddPeriodicTimeObserver(Weak<dyn PeriodicTimeObserver>),
    RemovePeriodicTimeObserver(Weak<dyn PeriodicTimeObserver>),
    Shutdown,
}

/// Starts the playback actor.
///
/// The actor task owns the [`PlaybackCoordinator`] and is the only place its
/// state is touched. Commands from callers, session signals and audio route
/// events are all redispatched onto it, so state writes never race observer
/// iteration.
pub struct PlaybackService;

impl PlaybackService {
    /// Spawn the actor on the current tokio runtime and return a handle to it.
    ///
    /// There is no global instance; pass the handle to whichever components
    /// need playback.
    #[instrument(skip_all)]
    pub fn start(
        backend: impl MediaBackend,
        output: impl AudioOutput,
        config: &PlaybackConfig,
    ) -> PlaybackHandle {
        let (command_tx, command_rx) = mpsc::channel(100);
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (route_tx, route_rx) = mpsc::unbounded_channel();

        let coordinator = PlaybackCoordinator::new(
            Box::new(backend),
            Box::new(output),
            CoordinatorSettings::from(config),
            signal_tx,
        );
        let properties = coordinator.properties().clone();

        let handle = tokio::spawn(async move {
            playback_actor_loop(coordinator, command_rx, signal_rx, route_rx).await;
        });

        info!("Playback service started");

        PlaybackHandle {
            command_tx,
            route_sink: AudioRouteSink::new(route_tx),
            properties,
            _handle: Arc::new(handle),
        }
    }
}

/// Cloneable handle to the playback actor.
#[derive(Clone)]
pub struct PlaybackHandle {
    command_tx: Sender<Command>,
    route_sink: AudioRouteSink,
    properties: PlaybackProperties,
    _handle: Arc<JoinHandle<()>>,
}

impl PlaybackHandle {
    /// Replace the current session with one for `url` and start playing it.
    ///
    /// # Errors
    /// Returns `PlaybackError::ServiceUnavailable` if the actor has stopped.
    pub async fn play_url(&self, url: Url) -> Result<(), PlaybackError> {
        self.send(Command::PlayUrl(url)).await
    }

    /// Attach a session for `url` without starting playback.
    ///
    /// # Errors
    /// Returns `PlaybackError::ServiceUnavailable` if the actor has stopped.
    pub async fn set_item(&self, url: Url) -> Result<(), PlaybackError> {
        self.send(Command::SetItem(url)).await
    }

    /// Resume the current session.
    ///
    /// # Errors
    /// Returns `PlaybackError::ServiceUnavailable` if the actor has stopped.
    pub async fn play(&self) -> Result<(), PlaybackError> {
        self.send(Command::Play).await
    }

    /// Pause the current session.
    ///
    /// # Errors
    /// Returns `PlaybackError::ServiceUnavailable` if the actor has stopped.
    pub async fn pause(&self) -> Result<(), PlaybackError> {
        self.send(Command::Pause).await
    }

    /// Pause when playing, play otherwise.
    ///
    /// # Errors
    /// Returns `PlaybackError::ServiceUnavailable` if the actor has stopped.
    pub async fn toggle_play_pause(&self) -> Result<(), PlaybackError> {
        self.send(Command::TogglePlayPause).await
    }

    /// Seek the current session and wait for the outcome.
    ///
    /// Resolves to `false` when the seek was dropped before readiness,
    /// superseded, or abandoned by a session change.
    ///
    /// # Errors
    /// Returns `PlaybackError::ServiceUnavailable` if the actor has stopped.
    pub async fn seek(&self, offset: Duration) -> Result<bool, PlaybackError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Seek { offset, reply }).await?;
        Ok(rx.await.unwrap_or(false))
    }

    /// Release audio output if nothing is playing.
    ///
    /// # Errors
    /// Returns `PlaybackError::ServiceUnavailable` if the actor has stopped.
    pub async fn end_unused_audio_session(&self) -> Result<(), PlaybackError> {
        self.send(Command::EndUnusedAudioSession).await
    }

    /// Register a state observer without taking ownership of it.
    ///
    /// # Errors
    /// Returns `PlaybackError::ServiceUnavailable` if the actor has stopped.
    pub async fn add_playback_observer(
        &self,
        observer: &Arc<dyn PlaybackObserver>,
    ) -> Result<(), PlaybackError> {
        self.send(Command::AddPlaybackObserver(Arc::downgrade(observer)))
            .await
    }

    /// Unregister a state observer. Unknown observers are ignored.
    ///
    /// # Errors
    /// Returns `PlaybackError::ServiceUnavailable` if the actor has stopped.
    pub async fn remove_playback_observer(
        &self,
        observer: &Arc<dyn PlaybackObserver>,
    ) -> Result<(), PlaybackError> {
        self.send(Command::RemovePlaybackObserver(Arc::downgrade(observer)))
            .await
    }

    /// Register a time observer without taking ownership of it.
    ///
    /// # Errors
    /// Returns `PlaybackError::ServiceUnavailable` if the actor has stopped.
    pub async fn add_periodic_time_observer(
        &self,
        observer: &Arc<dyn PeriodicTimeObserver>,
    ) -> Result<(), PlaybackError> {
        self.send(Command::AddPeriodicTimeObserver(Arc::downgrade(observer)))
            .await
    }

    /// Unregister a time observer. Unknown observers are ignored.
    ///
    /// # Errors
    /// Returns `PlaybackError::ServiceUnavailable` if the actor has stopped.
    pub async fn remove_periodic_time_observer(
        &self,
        observer: &Arc<dyn PeriodicTimeObserver>,
    ) -> Result<(), PlaybackError> {
        self.send(Command::RemovePeriodicTimeObserver(Arc::downgrade(
            observer,
        )))
        .await
    }

    /// Sink for the platform audio layer to report interruptions and
    /// route changes.
    pub fn audio_route_sink(&self) -> AudioRouteSink {
        self.route_sink.clone()
    }

    /// Stop the actor, detaching the session and releasing audio output.
    ///
    /// # Errors
    /// Returns `PlaybackError::ServiceUnavailable` if the actor already stopped.
    pub async fn shutdown(&self) -> Result<(), PlaybackError> {
        self.send(Command::Shutdown).await
    }

    /// Current canonical state.
    pub fn playback_state(&self) -> PlaybackState {
        self.properties.state.get()
    }

    /// `true` while playing or buffering.
    pub fn is_playing(&self) -> bool {
        self.playback_state().is_playing()
    }

    /// Whole-second duration of the current item, `None` for live streams.
    pub fn asset_duration(&self) -> Option<u64> {
        self.properties.asset_duration.get()
    }

    /// URL of the attached session.
    pub fn current_url(&self) -> Option<Url> {
        self.properties.current_url.get()
    }

    /// Stream of state changes, starting with the current state.
    pub fn playback_state_monitored(&self) -> impl Stream<Item = PlaybackState> + Send + use<> {
        self.properties.state.watch()
    }

    /// Stream of property snapshots, yielded on any change.
    pub fn properties_monitored(&self) -> impl Stream<Item = PlaybackProperties> + Send + use<> {
        self.properties.watch()
    }

    async fn send(&self, command: Command) -> Result<(), PlaybackError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| PlaybackError::ServiceUnavailable)
    }
}

/// The actor loop owning the coordinator.
///
/// Runs until a shutdown command arrives or every handle is dropped.
async fn playback_actor_loop(
    mut coordinator: PlaybackCoordinator,
    mut command_rx: Receiver<Command>,
    mut signal_rx: UnboundedReceiver<SessionEnvelope>,
    mut route_rx: UnboundedReceiver<AudioRouteEvent>,
) {
    loop {
        tokio::select! {
            command = command_rx.recv() => {
                match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => apply_command(&mut coordinator, command),
                }
            }
            Some(envelope) = signal_rx.recv() => {
                coordinator.handle_session_signal(envelope);
            }
            Some(event) = route_rx.recv() => {
                coordinator.handle_audio_route_event(event);
            }
        }
    }

    coordinator.shutdown();
    info!("Playback service stopped");
}

fn apply_command(coordinator: &mut PlaybackCoordinator, command: Command) {
    match command {
        Command::PlayUrl(url) => coordinator.play_url(url),
        Command::SetItem(url) => coordinator.set_item(url),
        Command::Play => coordinator.play(),
        Command::Pause => coordinator.pause(),
        Command::TogglePlayPause => coordinator.toggle_play_pause(),
        Command::Seek { offset, reply } => coordinator.seek(
            offset,
            Some(Box::new(move |finished| {
                let _ = reply.send(finished);
            })),
        ),
        Command::EndUnusedAudioSession => coordinator.end_unused_audio_session(),
        Command::AddPlaybackObserver(observer) => coordinator.add_playback_observer(observer),
        Command::RemovePlaybackObserver(observer) => {
            coordinator.remove_playback_observer(&observer)
        }
        Command::AddPeriodicTimeObserver(observer) => {
            coordinator.add_periodic_time_observer(observer)
        }
        Command::RemovePeriodicTimeObserver(observer) => {
            coordinator.remove_periodic_time_observer(&observer)
        }
        Command::Shutdown => debug!("Shutdown handled by the actor loop"),
    }
}
