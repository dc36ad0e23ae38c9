// ── Snapshot store ──
//
// Holds the current `DeviceSnapshot` behind a `watch` channel so readers
// never block, plus an ordered list of synchronous listeners that fire
// after every replacement.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::snapshot::DeviceSnapshot;
use crate::stream::SnapshotStream;

type Listener = Arc<dyn Fn(&DeviceSnapshot) + Send + Sync>;

/// Handle returned by [`SnapshotStore::add_listener`], used to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Reactive holder for one machine's snapshot.
pub struct SnapshotStore {
    snapshot: watch::Sender<Arc<DeviceSnapshot>>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(DeviceSnapshot::default()));
        Self {
            snapshot,
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<DeviceSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.snapshot.subscribe())
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Replace the snapshot wholesale and notify listeners.
    pub(crate) fn replace(&self, snapshot: DeviceSnapshot) {
        let snapshot = Arc::new(snapshot);
        self.snapshot.send_replace(Arc::clone(&snapshot));
        self.notify(&snapshot);
    }

    /// Copy the current snapshot, apply `f` and publish the result.
    pub(crate) fn update(&self, f: impl FnOnce(&mut DeviceSnapshot)) {
        let mut next = DeviceSnapshot::clone(&self.snapshot());
        f(&mut next);
        self.replace(next);
    }

    // ── Listeners ────────────────────────────────────────────────────

    /// Register a callback run after every snapshot replacement, in
    /// registration order.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&DeviceSnapshot) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.lock_listeners().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub(crate) fn clear_listeners(&self) {
        self.lock_listeners().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Listeners run outside the lock so they may add or remove listeners.
    fn notify(&self, snapshot: &DeviceSnapshot) {
        let listeners: Vec<Listener> = self
            .lock_listeners()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.snapshot.borrow().refreshed_at
    }

    /// How long ago the last successful poll completed.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
