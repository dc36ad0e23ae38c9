// Integration tests for `Coordinator` against a wiremock machine.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gaggiuino_core::entity::{LedLight, ProfileSelect};
use gaggiuino_core::{
    BoilerSettings, Coordinator, CoordinatorConfig, CoordinatorState, CoreError, DeviceSnapshot,
    IntegrationRegistry, LedSettings, ProfileNaming, SettingsUpdate, WriteOutcome,
    WriteTimeoutPolicy,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn status_body() -> Value {
    json!([{
        "upTime": "100",
        "profileId": "1",
        "profileName": "Default",
        "targetTemperature": "93",
        "temperature": "92.5",
        "pressure": "0.0",
        "waterLevel": "80",
        "weight": "0",
        "brewSwitchState": "false",
        "steamSwitchState": "false"
    }])
}

fn profiles_body() -> Value {
    json!([
        { "id": 1, "name": "Default", "selected": true },
        { "id": 2, "name": "Lungo", "selected": false },
        { "id": 3, "name": "Lungo", "selected": false }
    ])
}

fn settings_body() -> Value {
    json!({
        "boiler": { "steamSetPoint": 155, "offsetTemp": 7, "hpwr": 550, "mainDivider": 5, "brewDivider": 3 },
        "system": { "warmupState": false, "lcdSleep": 16, "powerLineFrequency": 50 },
        "led": { "state": true, "disco": false, "color": { "R": 255, "G": 255, "B": 255 } },
        "scales": { "forcePredictive": false, "hwScalesEnabled": true, "btScalesEnabled": false },
        "versions": { "firmware": "v1.9.0", "frontend": "v1.4.1", "static": "v1.4.1" }
    })
}

async fn mount_json(server: &MockServer, verb: &str, route: &str, body: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount every read endpoint with healthy default responses.
async fn mount_device(server: &MockServer) {
    mount_json(server, "GET", "/api/system/status", status_body()).await;
    mount_json(server, "GET", "/api/profiles/all", profiles_body()).await;
    mount_json(server, "GET", "/api/shots/latest", json!([{ "lastShotId": "12" }])).await;
    mount_json(server, "GET", "/api/settings", settings_body()).await;
    mount_json(
        server,
        "GET",
        "/api/firmware/progress",
        json!({ "status": "idle", "progress": 0, "type": "firmware" }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

fn config(server: &MockServer) -> CoordinatorConfig {
    CoordinatorConfig::new(&server.uri())
        .unwrap()
        .with_timeout(Duration::from_millis(200))
        .with_poll_interval(Duration::ZERO)
}

async fn setup() -> (MockServer, Coordinator) {
    let server = MockServer::start().await;
    mount_device(&server).await;
    let coordinator = Coordinator::new(config(&server)).unwrap();
    coordinator.first_refresh().await.unwrap();
    (server, coordinator)
}

fn unreachable_host() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

async fn status_polls(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/system/status")
        .count()
}

/// A plain HTTP machine that answers every read endpoint until `dropping`
/// is set, then accepts and immediately closes each connection.
async fn flaky_machine(dropping: Arc<AtomicBool>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            if dropping.load(Ordering::SeqCst) {
                drop(socket);
                continue;
            }
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                }
                let head = String::from_utf8_lossy(&buf[..read]).into_owned();
                let body = match head.split_whitespace().nth(1).unwrap_or("/") {
                    "/api/system/status" => status_body(),
                    "/api/profiles/all" => profiles_body(),
                    "/api/shots/latest" => json!([{ "lastShotId": "12" }]),
                    "/api/settings" => settings_body(),
                    "/api/firmware/progress" => {
                        json!({ "status": "idle", "progress": 0, "type": "firmware" })
                    }
                    _ => json!({}),
                }
                .to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{addr}")
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_reflects_latest_values() {
    let (server, coordinator) = setup().await;
    assert_eq!(coordinator.current_state(), CoordinatorState::Idle);
    assert!(coordinator.last_update_success());

    let snap = coordinator.snapshot();
    assert!(snap.online);
    assert!(snap.healthy);
    assert_eq!(snap.active_profile_id(), Some(1));
    assert_eq!(snap.latest_shot_id, Some(12));
    assert_eq!(snap.boiler.as_ref().unwrap().steam_set_point, Some(155));
    assert_eq!(snap.versions.as_ref().unwrap().firmware.as_deref(), Some("v1.9.0"));

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/system/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "temperature": "120.25", "profileId": "1" }])),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    mount_device(&server).await;
    coordinator.refresh().await.unwrap();

    let status = coordinator.snapshot().status.clone().unwrap();
    assert_eq!(status.temperature, Some(120.25));
    assert_eq!(status.pressure, None);
}

#[tokio::test]
async fn test_absent_optional_results_are_none() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/api/system/status", status_body()).await;
    mount_json(&server, "GET", "/api/profiles/all", profiles_body()).await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    for route in ["/api/shots/latest", "/api/settings", "/api/firmware/progress"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
    }

    let coordinator = Coordinator::new(config(&server)).unwrap();
    coordinator.first_refresh().await.unwrap();

    let snap = coordinator.snapshot();
    assert!(snap.online);
    assert!(snap.status.is_some());
    assert!(snap.latest_shot_id.is_none());
    assert!(snap.boiler.is_none() && snap.led.is_none() && snap.versions.is_none());
    assert!(snap.firmware_progress.is_none());
}

#[tokio::test]
async fn test_transient_failure_keeps_previous_snapshot() {
    let (server, coordinator) = setup().await;
    let before = coordinator.snapshot();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/system/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(status_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    coordinator.refresh().await.unwrap();

    let mut expected = DeviceSnapshot::clone(&before);
    expected.online = false;
    assert_eq!(*coordinator.snapshot(), expected);
    assert!(coordinator.last_update_success());
    assert_eq!(coordinator.current_state(), CoordinatorState::Idle);
}

#[tokio::test]
async fn test_dropped_connection_keeps_previous_snapshot() {
    let dropping = Arc::new(AtomicBool::new(false));
    let host = flaky_machine(Arc::clone(&dropping)).await;
    let cfg = CoordinatorConfig::new(&host)
        .unwrap()
        .with_timeout(Duration::from_secs(2))
        .with_poll_interval(Duration::ZERO);
    let coordinator = Coordinator::new(cfg).unwrap();
    coordinator.first_refresh().await.unwrap();
    let before = coordinator.snapshot();
    assert!(before.online);
    assert!(before.status.is_some());

    dropping.store(true, Ordering::SeqCst);
    coordinator.refresh().await.unwrap();

    let mut expected = DeviceSnapshot::clone(&before);
    expected.online = false;
    assert_eq!(*coordinator.snapshot(), expected);
    assert!(coordinator.last_update_success());
}

#[tokio::test]
async fn test_unexpected_failure_clears_snapshot() {
    let (server, coordinator) = setup().await;

    server.reset().await;
    mount_device(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/profiles/all"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .with_priority(1)
        .mount(&server)
        .await;

    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::UpdateFailed { .. }), "got {err:?}");
    assert_eq!(*coordinator.snapshot(), DeviceSnapshot::default());
    assert!(!coordinator.last_update_success());
}

#[tokio::test]
async fn test_first_refresh_against_timing_out_host_is_not_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(config(&server)).unwrap();
    let err = coordinator.first_refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::NotReady { .. }), "got {err:?}");
    assert_eq!(coordinator.current_state(), CoordinatorState::Uninitialized);
    assert!(!coordinator.snapshot().online);
}

// ── Profile selection ───────────────────────────────────────────────

#[tokio::test]
async fn test_select_unknown_profile_sends_nothing() {
    let (server, coordinator) = setup().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = coordinator.select_profile(42).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_select_profile_patches_cache_before_refresh() {
    let (server, coordinator) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/profile-select/2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    coordinator.add_listener(move |snap| {
        if snap.active_profile_id() == Some(2) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let outcome = coordinator.select_profile(2).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Applied);

    let snap = coordinator.snapshot();
    assert_eq!(snap.active_profile_id(), Some(2));
    assert_eq!(snap.status.as_ref().unwrap().profile_name.as_deref(), Some("Lungo"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_duplicate_profile_names_selectable_through_display_name() {
    let (server, coordinator) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/profile-select/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let select = ProfileSelect::new(ProfileNaming::NameWithId);
    let options = select.options(&coordinator.snapshot());
    assert!(options.contains(&"Lungo (ID: 2)".to_owned()));
    assert!(options.contains(&"Lungo (ID: 3)".to_owned()));

    select.select_option(&coordinator, "Lungo (ID: 3)").await.unwrap();
    assert_eq!(coordinator.snapshot().active_profile_id(), Some(3));
}

#[tokio::test]
async fn test_select_timeout_follows_policy() {
    let (server, coordinator) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/profile-select/2"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let outcome = coordinator.select_profile(2).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Unconfirmed);
    assert_eq!(coordinator.snapshot().active_profile_id(), Some(1));

    let strict = Coordinator::new(config(&server).with_write_timeout(WriteTimeoutPolicy::Fail))
        .unwrap();
    strict.first_refresh().await.unwrap();
    let err = strict.select_profile(2).await.unwrap_err();
    assert!(matches!(err, CoreError::UpdateFailed { .. }), "got {err:?}");
}

// ── Settings ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_settings_caches_device_readback() {
    let (server, coordinator) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/settings/boiler"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    // The machine clamps the submitted value.
    mount_json(
        &server,
        "GET",
        "/api/settings/boiler",
        json!({ "steamSetPoint": 150, "hpwr": 550 }),
    )
    .await;

    let submitted = BoilerSettings {
        steam_set_point: Some(170),
        ..coordinator.snapshot().boiler.clone().unwrap()
    };
    let outcome = coordinator
        .update_settings(SettingsUpdate::Boiler(submitted))
        .await
        .unwrap();

    assert_eq!(outcome, WriteOutcome::Applied);
    let boiler = coordinator.snapshot().boiler.clone().unwrap();
    assert_eq!(boiler.steam_set_point, Some(150));
}

#[tokio::test]
async fn test_led_write_is_followed_by_a_full_poll() {
    let (server, coordinator) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/settings/led"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    mount_json(
        &server,
        "GET",
        "/api/settings/led",
        json!({ "state": false, "disco": false, "color": { "R": 255, "G": 255, "B": 255 } }),
    )
    .await;

    let outcome = LedLight::turn_off(&coordinator).await.unwrap();
    assert_eq!(outcome, Some(WriteOutcome::Applied));
    assert_eq!(status_polls(&server).await, 2);
}

#[tokio::test]
async fn test_rejected_settings_skip_readback() {
    let (server, coordinator) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/settings/led"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/settings/led"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let before = coordinator.snapshot().led.clone();
    let outcome = coordinator
        .update_settings(SettingsUpdate::Led(LedSettings::default()))
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::Rejected);
    assert_eq!(coordinator.snapshot().led, before);
}

#[tokio::test]
async fn test_settings_server_error_is_update_failed() {
    let (server, coordinator) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/settings/scales"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let scales = coordinator.snapshot().scales.clone().unwrap();
    let err = coordinator
        .update_settings(SettingsUpdate::Scales(scales))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UpdateFailed { .. }), "got {err:?}");
}

// ── Health ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_check_on_unreachable_host_is_false() {
    let cfg = CoordinatorConfig::new(&unreachable_host())
        .unwrap()
        .with_timeout(Duration::from_millis(500));
    let coordinator = Coordinator::new(cfg).unwrap();
    assert!(!coordinator.check_health().await);
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_background_polling_publishes_snapshots() {
    let server = MockServer::start().await;
    mount_device(&server).await;
    let coordinator =
        Coordinator::new(config(&server).with_poll_interval(Duration::from_millis(50))).unwrap();
    coordinator.first_refresh().await.unwrap();

    let mut stream = coordinator.subscribe();
    let first = stream.current().refreshed_at;
    coordinator.start().await.unwrap();

    let next = tokio::time::timeout(Duration::from_secs(5), stream.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(next.refreshed_at >= first);

    coordinator.shutdown().await;
    assert_eq!(coordinator.current_state(), CoordinatorState::Stopped);
}

#[tokio::test]
async fn test_stopped_coordinator_rejects_operations() {
    let (_server, coordinator) = setup().await;
    coordinator.add_listener(|_| {});
    coordinator.shutdown().await;

    assert_eq!(coordinator.store().listener_count(), 0);
    assert!(matches!(coordinator.refresh().await, Err(CoreError::Stopped)));
    assert!(matches!(coordinator.select_profile(1).await, Err(CoreError::Stopped)));
    assert!(matches!(coordinator.start().await, Err(CoreError::Stopped)));
    assert!(!coordinator.check_health().await);

    // Idempotent.
    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_cancels_poll_in_flight() {
    let server = MockServer::start().await;
    mount_device(&server).await;
    let cfg = config(&server)
        .with_timeout(Duration::from_secs(30))
        .with_poll_interval(Duration::from_millis(50));
    let coordinator = Coordinator::new(cfg).unwrap();
    coordinator.first_refresh().await.unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/system/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(status_body())
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    coordinator.add_listener(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    coordinator.start().await.unwrap();

    // Wait until a poll is blocked on the slow status request.
    tokio::time::timeout(Duration::from_secs(5), async {
        while status_polls(&server).await == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(coordinator.current_state(), CoordinatorState::Refreshing);

    tokio::time::timeout(Duration::from_secs(1), coordinator.shutdown())
        .await
        .unwrap();
    assert_eq!(coordinator.current_state(), CoordinatorState::Stopped);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(status_polls(&server).await, 1);
}

// ── Registry ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_registry_setup_against_timing_out_host_registers_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let registry = IntegrationRegistry::new();
    let err = registry.setup_entry(config(&server)).await.unwrap_err();
    assert!(matches!(err, CoreError::NotReady { .. }), "got {err:?}");
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_registry_unload_stops_polling() {
    let server = MockServer::start().await;
    mount_device(&server).await;
    let registry = IntegrationRegistry::new();

    let id = registry
        .setup_entry(config(&server).with_poll_interval(Duration::from_millis(50)))
        .await
        .unwrap();
    let entry = registry.get(id).unwrap();
    assert_eq!(entry.title, format!("gaggiuino ({})", server.uri()));
    assert_eq!(entry.coordinator.current_state(), CoordinatorState::Idle);

    // First refresh plus at least one background poll.
    tokio::time::timeout(Duration::from_secs(5), async {
        while status_polls(&server).await < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    registry.unload_entry(id).await.unwrap();
    assert_eq!(entry.coordinator.current_state(), CoordinatorState::Stopped);
    assert!(registry.get(id).is_none());

    let seen = status_polls(&server).await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(status_polls(&server).await, seen);
}

#[tokio::test]
async fn test_registry_unload_unknown_entry() {
    let registry = IntegrationRegistry::new();
    let err = registry.unload_entry(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, CoreError::EntryNotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_registry_concurrent_setups_keep_one_coordinator() {
    let server = MockServer::start().await;
    mount_device(&server).await;
    let registry = IntegrationRegistry::new();
    let id = Uuid::new_v4();

    let (a, b) = tokio::join!(
        registry.setup_entry_with_id(id, config(&server)),
        registry.setup_entry_with_id(id, config(&server)),
    );
    assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
    let loser = if a.is_err() { a } else { b };
    assert!(matches!(loser, Err(CoreError::Validation { .. })), "got {loser:?}");

    assert_eq!(registry.len(), 1);
    let entry = registry.get(id).unwrap();
    assert_eq!(entry.coordinator.current_state(), CoordinatorState::Idle);

    registry.shutdown_all().await;
    assert!(registry.is_empty());
    assert_eq!(entry.coordinator.current_state(), CoordinatorState::Stopped);
}
