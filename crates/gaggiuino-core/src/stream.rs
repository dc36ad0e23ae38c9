// ── Reactive snapshot stream ──
//
// Subscription type for consuming snapshot replacements from the store.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::snapshot::DeviceSnapshot;

/// A subscription to one machine's snapshot.
///
/// Gives point-in-time access plus change notification via
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct SnapshotStream {
    current: Arc<DeviceSnapshot>,
    receiver: watch::Receiver<Arc<DeviceSnapshot>>,
}

impl SnapshotStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<DeviceSnapshot>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot seen at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<DeviceSnapshot> {
        &self.current
    }

    /// The latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> Arc<DeviceSnapshot> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next replacement. `None` once the coordinator is gone.
    pub async fn changed(&mut self) -> Option<Arc<DeviceSnapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    /// Convert into a `Stream`. Yields the current snapshot first.
    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct SnapshotWatchStream {
    inner: WatchStream<Arc<DeviceSnapshot>>,
}

impl Stream for SnapshotWatchStream {
    type Item = Arc<DeviceSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
