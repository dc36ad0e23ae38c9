// ── Device state coordinator ──
//
// Lifecycle for one machine: owns its client, polls it on a fixed cadence,
// caches the result in a `SnapshotStore` and routes writes. Every operation
// that talks to the device holds the client mutex for its whole duration,
// so polls and writes never interleave.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gaggiuino_api::{GaggiuinoClient, SettingsGroup};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{SettingsUpdate, WriteOutcome};
use crate::config::{CoordinatorConfig, WriteTimeoutPolicy};
use crate::error::CoreError;
use crate::snapshot::DeviceSnapshot;
use crate::store::{ListenerId, SnapshotStore};
use crate::stream::SnapshotStream;

// ── CoordinatorState ─────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CoordinatorState {
    /// Created, first refresh not yet successful.
    Uninitialized,
    Refreshing,
    Idle,
    /// Shut down; every operation returns [`CoreError::Stopped`].
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshKind {
    First,
    Scheduled,
}

// ── Coordinator ──────────────────────────────────────────────────

/// Polling coordinator for a single Gaggiuino machine.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Readers go through
/// [`snapshot()`](Self::snapshot), [`subscribe()`](Self::subscribe) or
/// [`add_listener()`](Self::add_listener) and never wait on the device.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: CoordinatorConfig,
    store: Arc<SnapshotStore>,
    state: watch::Sender<CoordinatorState>,
    last_update_success: AtomicBool,
    cancel: CancellationToken,
    client: Mutex<Option<GaggiuinoClient>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator. Does not contact the machine; call
    /// [`first_refresh()`](Self::first_refresh) next.
    pub fn new(config: CoordinatorConfig) -> Result<Self, CoreError> {
        let client = GaggiuinoClient::new(config.host.as_str(), &config.transport)?;
        let (state, _) = watch::channel(CoordinatorState::Uninitialized);

        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                config,
                store: Arc::new(SnapshotStore::new()),
                state,
                last_update_success: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                client: Mutex::new(Some(client)),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn host(&self) -> &url::Url {
        &self.inner.config.host
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Initial refresh for a freshly created coordinator.
    ///
    /// Unlike later polls, any failure here (including an unreachable
    /// machine) is reported as [`CoreError::NotReady`].
    pub async fn first_refresh(&self) -> Result<(), CoreError> {
        self.run_refresh(RefreshKind::First).await
    }

    /// Run one poll cycle now.
    ///
    /// A timeout or connection failure keeps the cached snapshot and only
    /// marks it offline. Any other failure clears the snapshot and is
    /// returned as [`CoreError::UpdateFailed`].
    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.run_refresh(RefreshKind::Scheduled).await
    }

    /// Spawn the background poll task. A no-op if already running or if
    /// the poll interval is zero.
    pub async fn start(&self) -> Result<(), CoreError> {
        self.ensure_running()?;
        let interval = self.inner.config.poll_interval;
        if interval.is_zero() {
            debug!("background polling disabled");
            return Ok(());
        }

        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            return Ok(());
        }
        let coordinator = self.clone();
        let cancel = self.inner.cancel.clone();
        handles.push(tokio::spawn(poll_task(coordinator, interval, cancel)));

        info!(
            host = %self.inner.config.host,
            interval_secs = interval.as_secs(),
            "polling started"
        );
        Ok(())
    }

    /// Stop polling, drop listeners and release the client.
    ///
    /// Idempotent. Afterwards every operation returns [`CoreError::Stopped`].
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let handles: Vec<_> = self.inner.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }

        *self.inner.client.lock().await = None;
        self.inner.store.clear_listeners();
        self.set_state(CoordinatorState::Stopped);
        debug!(host = %self.inner.config.host, "coordinator stopped");
    }

    /// One-shot: create, refresh once, run `f`, shut down.
    ///
    /// Background polling is disabled since callers only need a single
    /// read-modify cycle.
    pub async fn oneshot<F, Fut, T>(config: CoordinatorConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Coordinator) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.poll_interval = Duration::ZERO;

        let coordinator = Coordinator::new(cfg)?;
        coordinator.first_refresh().await?;
        let result = f(coordinator.clone()).await;
        coordinator.shutdown().await;
        result
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Make `id` the active brew profile.
    ///
    /// `id` must be in the cached profile list; otherwise this fails with
    /// [`CoreError::Validation`] without contacting the machine. On success
    /// the cached active profile is patched immediately, ahead of the next
    /// poll.
    pub async fn select_profile(&self, id: u32) -> Result<WriteOutcome, CoreError> {
        self.ensure_running()?;
        let profile = self
            .inner
            .store
            .snapshot()
            .profile_by_id(id)
            .cloned()
            .ok_or_else(|| CoreError::Validation {
                message: format!("unknown profile id {id}"),
            })?;

        let guard = self.inner.client.lock().await;
        let client = guard.as_ref().ok_or(CoreError::Stopped)?;

        match client.select_profile(id).await {
            Ok(true) => {
                self.inner
                    .store
                    .update(|s| s.apply_profile_selection(&profile));
                info!(profile_id = id, name = %profile.name, "profile selected");
                Ok(WriteOutcome::Applied)
            }
            Ok(false) => {
                warn!(profile_id = id, "machine rejected profile selection");
                Ok(WriteOutcome::Rejected)
            }
            Err(e)
                if e.is_timeout()
                    && self.inner.config.write_timeout == WriteTimeoutPolicy::Ignore =>
            {
                warn!(profile_id = id, error = %e, "profile selection timed out");
                Ok(WriteOutcome::Unconfirmed)
            }
            Err(e) => {
                warn!(profile_id = id, error = %e, "profile selection failed");
                Err(CoreError::update_failed(&e))
            }
        }
    }

    /// Write a full settings group, then re-read it from the machine.
    ///
    /// The cached group is replaced by what the machine reports back, not
    /// by the submitted payload.
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<WriteOutcome, CoreError> {
        self.ensure_running()?;
        let group = update.group();

        let guard = self.inner.client.lock().await;
        let client = guard.as_ref().ok_or(CoreError::Stopped)?;

        let accepted = write_group(client, &update).await.map_err(|e| {
            warn!(%group, error = %e, "settings write failed");
            CoreError::update_failed(&e)
        })?;
        if !accepted {
            warn!(%group, "machine rejected settings");
            return Ok(WriteOutcome::Rejected);
        }

        let confirmed = read_group(client, group).await.map_err(|e| {
            warn!(%group, error = %e, "settings re-read failed");
            CoreError::update_failed(&e)
        })?;
        self.inner.store.update(|s| s.apply_settings(confirmed));
        info!(%group, "settings updated");
        Ok(WriteOutcome::Applied)
    }

    /// Independent health probe. Any failure reads as unhealthy.
    pub async fn check_health(&self) -> bool {
        let guard = self.inner.client.lock().await;
        let Some(client) = guard.as_ref() else {
            return false;
        };
        match client.healthy().await {
            Ok(healthy) => healthy,
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        }
    }

    // ── State observation ────────────────────────────────────────

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<DeviceSnapshot> {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    /// Register a synchronous callback fired after every snapshot
    /// replacement, including patches made by writes.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&DeviceSnapshot) + Send + Sync + 'static,
    {
        self.inner.store.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.store.remove_listener(id)
    }

    pub fn state(&self) -> watch::Receiver<CoordinatorState> {
        self.inner.state.subscribe()
    }

    pub fn current_state(&self) -> CoordinatorState {
        *self.inner.state.borrow()
    }

    /// Whether the most recent poll cycle ended without an unexpected error.
    pub fn last_update_success(&self) -> bool {
        self.inner.last_update_success.load(Ordering::Acquire)
    }

    // ── Internals ────────────────────────────────────────────────

    fn set_state(&self, state: CoordinatorState) {
        self.inner.state.send_replace(state);
    }

    fn ensure_running(&self) -> Result<(), CoreError> {
        if self.current_state() == CoordinatorState::Stopped {
            return Err(CoreError::Stopped);
        }
        Ok(())
    }

    async fn run_refresh(&self, kind: RefreshKind) -> Result<(), CoreError> {
        let guard = self.inner.client.lock().await;
        let client = guard.as_ref().ok_or(CoreError::Stopped)?;
        let previous = self.current_state();
        self.set_state(CoordinatorState::Refreshing);

        let result = fetch_snapshot(client).await;
        drop(guard);

        let host = &self.inner.config.host;
        match result {
            Ok(snapshot) => {
                self.inner.store.replace(snapshot);
                self.inner.last_update_success.store(true, Ordering::Release);
                self.set_state(CoordinatorState::Idle);
                debug!(%host, "refresh complete");
                Ok(())
            }
            Err(e) if e.is_transient() && kind == RefreshKind::Scheduled => {
                debug!(%host, error = %e, "machine unreachable, keeping cached data");
                self.inner.store.update(|s| s.online = false);
                self.set_state(CoordinatorState::Idle);
                Ok(())
            }
            Err(e) => {
                self.inner.store.replace(DeviceSnapshot::default());
                self.inner.last_update_success.store(false, Ordering::Release);
                match kind {
                    RefreshKind::First => {
                        self.set_state(previous);
                        warn!(%host, error = %e, "first refresh failed");
                        Err(CoreError::NotReady {
                            host: host.to_string(),
                            reason: e.to_string(),
                        })
                    }
                    RefreshKind::Scheduled => {
                        self.set_state(CoordinatorState::Idle);
                        warn!(%host, error = %e, "refresh failed, cached data cleared");
                        Err(CoreError::update_failed(&e))
                    }
                }
            }
        }
    }
}

// ── Device I/O ───────────────────────────────────────────────────

/// One full poll cycle. Nothing is committed unless every step succeeds.
async fn fetch_snapshot(client: &GaggiuinoClient) -> Result<DeviceSnapshot, gaggiuino_api::Error> {
    let status = client.get_status().await?;
    let profiles = client.get_profiles().await?;
    let healthy = client.healthy().await?;
    let latest_shot_id = client.get_latest_shot_id().await?;
    let settings = match client.get_settings().await {
        Err(e) if e.is_not_found() => gaggiuino_api::Settings::default(),
        other => other?,
    };
    let firmware_progress = client.get_firmware_progress().await?;

    Ok(DeviceSnapshot::from_poll(
        status,
        profiles,
        healthy,
        latest_shot_id,
        settings,
        firmware_progress,
    ))
}

async fn write_group(
    client: &GaggiuinoClient,
    update: &SettingsUpdate,
) -> Result<bool, gaggiuino_api::Error> {
    match update {
        SettingsUpdate::Boiler(s) => client.update_boiler_settings(s).await,
        SettingsUpdate::System(s) => client.update_system_settings(s).await,
        SettingsUpdate::Led(s) => client.update_led_settings(s).await,
        SettingsUpdate::Scales(s) => client.update_scales_settings(s).await,
    }
}

async fn read_group(
    client: &GaggiuinoClient,
    group: SettingsGroup,
) -> Result<SettingsUpdate, gaggiuino_api::Error> {
    Ok(match group {
        SettingsGroup::Boiler => SettingsUpdate::Boiler(client.get_boiler_settings().await?),
        SettingsGroup::System => SettingsUpdate::System(client.get_system_settings().await?),
        SettingsGroup::Led => SettingsUpdate::Led(client.get_led_settings().await?),
        SettingsGroup::Scales => SettingsUpdate::Scales(client.get_scales_settings().await?),
    })
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh data from the machine.
async fn poll_task(coordinator: Coordinator, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = coordinator.refresh() => {
                        if let Err(e) = result {
                            warn!(error = %e, "periodic refresh failed");
                        }
                    }
                }
            }
        }
    }
}
