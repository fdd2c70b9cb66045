use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::{
    ListenerToken, MediaSession, SessionEnvelope, SessionId, SignalKind, SignalSink,
};

/// Listener binding between the coordinator and one session.
///
/// A fresh transport is built for every session and never reused, so
/// signals from a torn-down session cannot reach the next one's state.
pub(crate) struct Transport {
    id: SessionId,
    session: Box<dyn MediaSession>,
    listeners: Vec<ListenerToken>,
}

impl Transport {
    /// Bind to `session` and register every listener kind the coordinator uses.
    pub(crate) fn attach(
        id: SessionId,
        mut session: Box<dyn MediaSession>,
        signal_tx: &UnboundedSender<SessionEnvelope>,
        tick_interval: Duration,
    ) -> Self {
        let kinds = [
            SignalKind::TimeControlStatus,
            SignalKind::Readiness,
            SignalKind::EndOfMedia,
            SignalKind::BufferStatus,
            SignalKind::PeriodicTick {
                interval: tick_interval,
            },
            SignalKind::SeekCompletion,
        ];

        let listeners = kinds
            .into_iter()
            .map(|kind| session.add_listener(kind, SignalSink::new(id, signal_tx.clone())))
            .collect();

        debug!(%id, url = %session.url(), "Attached transport");

        Self {
            id,
            session,
            listeners,
        }
    }

    /// Unregister every listener and hand the session back to be dropped.
    pub(crate) fn detach(mut self) {
        self.remove_listeners();
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    pub(crate) fn session(&self) -> &dyn MediaSession {
        self.session.as_ref()
    }

    pub(crate) fn session_mut(&mut self) -> &mut dyn MediaSession {
        self.session.as_mut()
    }

    fn remove_listeners(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        for token in self.listeners.drain(..) {
            self.session.remove_listener(token);
        }
        debug!(id = %self.id, "Detached transport");
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.remove_listeners();
    }
}
