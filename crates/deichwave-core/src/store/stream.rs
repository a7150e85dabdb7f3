// ── Store subscriptions ──
//
// Point-in-time access plus change notification for a single store,
// usable directly or as a `Stream`.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A subscription to one store's state.
pub struct StoreStream<T: Clone + Send + Sync + 'static> {
    current: T,
    receiver: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> StoreStream<T> {
    pub(crate) fn new(mut receiver: watch::Receiver<T>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The value captured at creation time or by the last [`changed()`](Self::changed).
    pub fn current(&self) -> &T {
        &self.current
    }

    /// The latest value (may have changed since creation).
    pub fn latest(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// `true` if the store changed since the last observed value.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next change, returning the new value.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        let value = self.receiver.borrow_and_update().clone();
        self.current = value.clone();
        Some(value)
    }

    /// Convert into a `Stream` that yields the current value first, then
    /// every change.
    pub fn into_stream(self) -> StoreWatchStream<T> {
        StoreWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct StoreWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<T>,
}

impl<T: Clone + Send + Sync + 'static> Stream for StoreWatchStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin regardless of T (it boxes its future).
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn changed_waits_for_a_new_value() {
        let (tx, rx) = watch::channel(1);
        let mut stream = StoreStream::new(rx);
        assert_eq!(*stream.current(), 1);
        assert!(!stream.has_changed());

        {
            let mut changed = task::spawn(stream.changed());
            assert_pending!(changed.poll());
            tx.send_replace(2);
            assert!(changed.is_woken());
            assert_eq!(assert_ready!(changed.poll()), Some(2));
        }
        assert_eq!(*stream.current(), 2);

        drop(tx);
        assert_eq!(tokio_test::block_on(stream.changed()), None);
    }

    #[test]
    fn into_stream_yields_current_value_first() {
        let (tx, rx) = watch::channel("a".to_owned());
        let mut values = StoreStream::new(rx).into_stream();

        assert_eq!(tokio_test::block_on(values.next()), Some("a".to_owned()));
        tx.send_replace("b".to_owned());
        assert_eq!(tokio_test::block_on(values.next()), Some("b".to_owned()));
        drop(tx);
        assert_eq!(tokio_test::block_on(values.next()), None);
    }
}
