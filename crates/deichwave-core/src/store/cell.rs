// ── Reactive store cell ──
//
// One watch channel per store field set. The channel's internal lock is
// the per-store mutex: every read sees either the value before or after
// a mutation, never a mix, and subscribers are only woken when the value
// actually changed.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::stream::StoreStream;

pub(crate) struct StoreCell<T: Clone + PartialEq + Send + Sync + 'static> {
    value: watch::Sender<T>,
    refreshed_at: watch::Sender<Option<DateTime<Utc>>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> StoreCell<T> {
    pub(crate) fn new(initial: T) -> Self {
        let (value, _) = watch::channel(initial);
        let (refreshed_at, _) = watch::channel(None);
        Self {
            value,
            refreshed_at,
        }
    }

    /// Clone of the current value.
    pub(crate) fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Run `f` against the current value without cloning it.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Replace the value if it differs. Returns `true` if it changed.
    ///
    /// Compare and assign happen under the same lock, so two racing
    /// writers of the same value produce exactly one change.
    pub(crate) fn replace(&self, next: T) -> bool {
        self.value.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        })
    }

    /// Mutate in place. `f` reports whether it changed anything.
    pub(crate) fn modify(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        // `send_if_modified` updates even with zero receivers.
        self.value.send_if_modified(f)
    }

    /// Record a successful refresh from the server.
    pub(crate) fn mark_refreshed(&self) {
        self.refreshed_at.send_replace(Some(Utc::now()));
    }

    pub(crate) fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        *self.refreshed_at.borrow()
    }

    pub(crate) fn subscribe(&self) -> StoreStream<T> {
        StoreStream::new(self.value.subscribe())
    }
}
