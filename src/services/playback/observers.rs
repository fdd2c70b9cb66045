use std::{ptr, sync::Weak, time::Duration};

use super::PlaybackState;

/// Subscriber interested in playback state transitions.
pub trait PlaybackObserver: Send + Sync {
    /// Called once per actual state change.
    fn playback_state_changed(&self, state: PlaybackState);

    /// Called when a new item is attached and its duration (or lack of one)
    /// is known.
    fn player_item_set(&self) {}
}

/// Subscriber interested in elapsed-time ticks.
pub trait PeriodicTimeObserver: Send + Sync {
    /// Current playback position of the attached session.
    fn update(&self, time: Duration);
}

/// Ordered registry of non-owning observer handles.
///
/// Observers are held through `Weak`, so registration never extends an
/// observer's lifetime. Owners are still expected to unregister explicitly;
/// entries whose owner is gone are skipped and pruned on the next pass.
pub(crate) struct ObserverRegistry<T: ?Sized> {
    entries: Vec<Weak<T>>,
}

impl<T: ?Sized> ObserverRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an observer. Returns `false` if it was already registered.
    pub(crate) fn add(&mut self, observer: Weak<T>) -> bool {
        self.prune();
        if self.position(&observer).is_some() {
            return false;
        }
        self.entries.push(observer);
        true
    }

    /// Remove an observer by identity. Returns `false` if it was not registered.
    pub(crate) fn remove(&mut self, observer: &Weak<T>) -> bool {
        match self.position(observer) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Invoke `notify` on every live observer in registration order.
    pub(crate) fn for_each(&mut self, mut notify: impl FnMut(&T)) {
        let mut saw_dead = false;
        for entry in &self.entries {
            match entry.upgrade() {
                Some(observer) => notify(&*observer),
                None => saw_dead = true,
            }
        }
        if saw_dead {
            self.prune();
        }
    }

    fn position(&self, observer: &Weak<T>) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| ptr::addr_eq(entry.as_ptr(), observer.as_ptr()))
    }

    fn prune(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.strong_count() > 0);
        let pruned = before - self.entries.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Dropped observers whose owners are gone");
        }
    }
}

