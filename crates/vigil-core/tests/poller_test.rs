#![allow(clippy::unwrap_used)]

// Poller behavior against scripted sources, on a paused Tokio clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use vigil_core::{
    Alerts, BackupJobs, Clock, CoreError, Host, HostStatus, Hosts, ManualClock, PollPhase,
    PollSettings, Poller, RecordSource, SnapshotStore,
};

// ── Fixtures ────────────────────────────────────────────────────────

struct Step {
    delay: Duration,
    result: Result<Vec<Value>, vigil_api::Error>,
}

#[derive(Default)]
struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn ok(self, records: Vec<Value>) -> Self {
        self.push(Duration::ZERO, Ok(records))
    }

    fn ok_after(self, delay: Duration, records: Vec<Value>) -> Self {
        self.push(delay, Ok(records))
    }

    fn fail(self, status: u16) -> Self {
        self.push(
            Duration::ZERO,
            Err(vigil_api::Error::Http {
                status,
                message: "upstream down".into(),
            }),
        )
    }

    fn push(self, delay: Duration, result: Result<Vec<Value>, vigil_api::Error>) -> Self {
        self.steps.lock().unwrap().push_back(Step { delay, result });
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RecordSource for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<Value>, vigil_api::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        let Some(step) = step else {
            return Err(vigil_api::Error::Http {
                status: 599,
                message: "script exhausted".into(),
            });
        };
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        step.result
    }
}

fn clock() -> Arc<dyn Clock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
    ))
}

fn alert(id: &str, last_seen: &str) -> Value {
    json!({
        "id": id,
        "first_ai_response": "Investigate.",
        "last_seen_at": last_seen,
        "zbx_raw": { "severity": "High", "host": "db-01", "name": "Disk full" }
    })
}

fn alerts_poller(source: ScriptedSource, settings: PollSettings) -> Poller<Alerts, ScriptedSource> {
    Poller::new(source, settings, clock())
}

fn every_30s() -> PollSettings {
    PollSettings::every(Duration::from_secs(30))
}

// ── Initial fetch and connection state ──────────────────────────────

#[tokio::test(start_paused = true)]
async fn initial_fetch_is_blocking_then_connected() {
    let source = ScriptedSource::default().ok_after(
        Duration::from_secs(1),
        vec![
            alert("a", "2025-06-01T10:00:00Z"),
            alert("b", "2025-06-01T11:00:00Z"),
        ],
    );
    let poller = alerts_poller(source, every_30s());
    assert_eq!(poller.connection_state().phase, PollPhase::Idle);

    poller.start();
    let state = poller.connection_state();
    assert!(state.loading);
    assert_eq!(state.phase, PollPhase::Loading);

    let mut rx = poller.connection();
    let state = rx
        .wait_for(|s| s.phase == PollPhase::Connected)
        .await
        .unwrap()
        .clone();
    assert!(state.is_connected);
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(
        state.last_updated,
        Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
    );

    let ids: Vec<_> = poller.snapshot().iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(poller.counts().high, 2);
    poller.stop();
}

#[tokio::test(start_paused = true)]
async fn blocking_failure_keeps_data_and_records_error() {
    let source = ScriptedSource::default()
        .ok(vec![alert("a", "2025-06-01T10:00:00Z")])
        .fail(503);
    let poller = alerts_poller(source, every_30s());

    poller.try_refresh().await.unwrap();
    let before = poller.snapshot();

    let err = poller.try_refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::Http { status: 503, .. }));

    let after = poller.snapshot();
    assert!(Arc::ptr_eq(&before, &after));
    let state = poller.connection_state();
    assert!(!state.is_connected);
    assert_eq!(state.phase, PollPhase::Disconnected);
    assert_eq!(
        state.error.as_deref(),
        Some("Webhook returned HTTP 503: upstream down")
    );
    assert!(state.last_updated.is_some());
}

#[tokio::test(start_paused = true)]
async fn silent_failure_flips_connection_without_error() {
    let source = ScriptedSource::default()
        .ok(vec![alert("a", "2025-06-01T10:00:00Z")])
        .fail(502)
        .ok(vec![alert("a", "2025-06-01T10:00:00Z")]);
    let poller = alerts_poller(source, every_30s());
    poller.start();

    let mut rx = poller.connection();
    rx.wait_for(|s| s.phase == PollPhase::Connected).await.unwrap();

    // First tick fails silently.
    let state = rx.wait_for(|s| !s.is_connected).await.unwrap().clone();
    assert_eq!(state.error, None);
    assert!(!state.loading);
    assert_eq!(poller.snapshot().len(), 1);

    // Next tick recovers.
    let state = rx.wait_for(|s| s.is_connected).await.unwrap().clone();
    assert_eq!(state.phase, PollPhase::Connected);
    assert_eq!(poller.source().calls(), 3);
    poller.stop();
}

#[tokio::test(start_paused = true)]
async fn success_clears_previous_error() {
    let source = ScriptedSource::default()
        .fail(500)
        .ok(vec![alert("a", "2025-06-01T10:00:00Z")]);
    let poller = alerts_poller(source, every_30s());

    assert!(poller.try_refresh().await.is_err());
    assert!(poller.connection_state().error.is_some());
    assert!(poller.snapshot().is_empty());

    poller.refresh().await;
    let state = poller.connection_state();
    assert_eq!(state.error, None);
    assert!(state.is_connected);
    assert_eq!(poller.snapshot().len(), 1);
}

// ── Interval scheduling ─────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn interval_refreshes_and_stop_halts_them() {
    let payload = vec![alert("a", "2025-06-01T10:00:00Z")];
    let source = ScriptedSource::default()
        .ok(payload.clone())
        .ok(payload.clone())
        .ok(payload.clone())
        .ok(payload);
    let poller = alerts_poller(source, every_30s());
    poller.start();
    assert!(poller.is_running());

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(poller.source().calls(), 3);

    poller.stop();
    assert!(!poller.is_running());
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(poller.source().calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn unchanged_polls_keep_identity_and_version() {
    let payload = vec![
        alert("a", "2025-06-01T10:00:00Z"),
        alert("b", "2025-06-01T11:00:00Z"),
    ];
    let mut changed = payload.clone();
    changed[0]["first_ai_response"] = json!("Updated guidance.");

    let source = ScriptedSource::default()
        .ok(payload.clone())
        .ok(payload)
        .ok(changed);
    let poller = alerts_poller(source, every_30s());

    poller.refresh().await;
    let first = poller.snapshot();
    let version = poller.version();

    let changes = poller.try_refresh().await.unwrap();
    assert!(changes.is_empty());
    assert_eq!(poller.version(), version);
    let second = poller.snapshot();
    assert!(Arc::ptr_eq(&first, &second));

    let changes = poller.try_refresh().await.unwrap();
    assert_eq!(changes.updated, vec!["a".to_owned()]);
    let third = poller.snapshot();
    let b_before = first.iter().find(|x| x.id == "b").unwrap();
    let b_after = third.iter().find(|x| x.id == "b").unwrap();
    assert!(Arc::ptr_eq(b_before, b_after));
    assert_eq!(poller.get("a").unwrap().ai_response, "Updated guidance.");
}

// ── Overlapping requests ────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn stale_response_is_discarded() {
    let source = ScriptedSource::default()
        .ok_after(
            Duration::from_secs(10),
            vec![alert("old", "2025-06-01T09:00:00Z")],
        )
        .ok_after(
            Duration::from_secs(1),
            vec![alert("new", "2025-06-01T11:00:00Z")],
        );
    let poller = alerts_poller(source, every_30s());

    let (slow, fast) = tokio::join!(poller.try_refresh(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        poller.try_refresh().await
    });

    assert!(matches!(slow, Err(CoreError::Superseded)));
    assert!(fast.is_ok());
    let ids: Vec<_> = poller.snapshot().iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, vec!["new"]);
    let state = poller.connection_state();
    assert!(!state.loading);
    assert_eq!(state.phase, PollPhase::Connected);
}

#[tokio::test(start_paused = true)]
async fn abortable_domain_cancels_superseded_request() {
    let job = |id: &str| json!({ "id": id, "name": id, "lastResult": "Success" });
    let source = ScriptedSource::default()
        .ok_after(Duration::from_secs(10), vec![job("slow")])
        .ok_after(Duration::from_secs(1), vec![job("fast")]);
    let poller: Poller<BackupJobs, _> = Poller::new(
        source,
        PollSettings::every(Duration::from_secs(5)).abortable(),
        clock(),
    );

    let started = tokio::time::Instant::now();
    let (slow, fast) = tokio::join!(poller.try_refresh(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        poller.try_refresh().await
    });

    assert!(matches!(slow, Err(CoreError::Superseded)));
    assert!(fast.is_ok());
    assert!(started.elapsed() < Duration::from_secs(5));
    let names: Vec<_> = poller.snapshot().iter().map(|j| j.name.clone()).collect();
    assert_eq!(names, vec!["fast"]);
}

#[tokio::test(start_paused = true)]
async fn manual_refresh_shows_loading_while_in_flight() {
    let source = ScriptedSource::default()
        .ok(vec![alert("a", "2025-06-01T10:00:00Z")])
        .ok_after(
            Duration::from_secs(5),
            vec![alert("a", "2025-06-01T10:00:00Z")],
        );
    let poller = alerts_poller(source, every_30s());
    poller.refresh().await;

    let background = poller.clone();
    let handle = tokio::spawn(async move { background.refresh().await });
    let mut rx = poller.connection();
    let state = rx.wait_for(|s| s.loading).await.unwrap().clone();
    assert_eq!(state.phase, PollPhase::Loading);
    assert_eq!(poller.snapshot().len(), 1);

    handle.await.unwrap();
    let state = poller.connection_state();
    assert!(!state.loading);
    assert_eq!(state.phase, PollPhase::Connected);
}

// ── Cache seeding ───────────────────────────────────────────────────

#[derive(Default)]
struct MemoryStore {
    hosts: Mutex<Vec<Host>>,
    saves: AtomicUsize,
}

impl SnapshotStore<Host> for MemoryStore {
    fn load(&self) -> Vec<Host> {
        self.hosts.lock().unwrap().clone()
    }

    fn save(&self, records: &[Arc<Host>]) {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.hosts.lock().unwrap() = records.iter().map(|h| (**h).clone()).collect();
    }
}

fn cached_host(id: &str, name: &str) -> Host {
    Host {
        id: id.into(),
        name: name.into(),
        hostname: name.into(),
        ip: String::new(),
        status: HostStatus::Online,
        groups: Vec::new(),
        os: String::new(),
        cpu_usage: 0.0,
        memory_usage: 0.0,
        disk_usage: 0.0,
        problem_count: 0,
        last_seen: None,
    }
}

#[tokio::test(start_paused = true)]
async fn cache_paints_immediately_then_refreshes_silently() {
    let store = Arc::new(MemoryStore::default());
    *store.hosts.lock().unwrap() = vec![cached_host("2", "web"), cached_host("1", "db")];

    let source = ScriptedSource::default().ok_after(
        Duration::from_secs(2),
        vec![
            json!({ "hostid": "1", "name": "db", "available": "1" }),
            json!({ "hostid": "3", "name": "api", "available": "2" }),
        ],
    );
    let poller: Poller<Hosts, _> = Poller::with_cache(
        source,
        PollSettings::every(Duration::from_secs(60)),
        clock(),
        store.clone(),
    );

    poller.start();
    let names: Vec<_> = poller.snapshot().iter().map(|h| h.name.clone()).collect();
    assert_eq!(names, vec!["db", "web"]);
    assert_eq!(poller.counts().total, 2);
    let state = poller.connection_state();
    assert!(!state.loading);
    assert_eq!(state.phase, PollPhase::Refreshing);

    let mut rx = poller.connection();
    rx.wait_for(|s| s.phase == PollPhase::Connected).await.unwrap();

    let names: Vec<_> = poller.snapshot().iter().map(|h| h.name.clone()).collect();
    assert_eq!(names, vec!["api", "db"]);
    assert_eq!(poller.counts().offline, 1);
    assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    assert_eq!(store.hosts.lock().unwrap().len(), 2);
    poller.stop();
}

#[tokio::test(start_paused = true)]
async fn empty_cache_means_blocking_start() {
    let store = Arc::new(MemoryStore::default());
    let source =
        ScriptedSource::default().ok(vec![json!({ "hostid": "1", "name": "db", "available": "1" })]);
    let poller: Poller<Hosts, _> = Poller::with_cache(
        source,
        PollSettings::every(Duration::from_secs(60)),
        clock(),
        store,
    );

    poller.start();
    assert!(poller.connection_state().loading);
    let mut rx = poller.connection();
    rx.wait_for(|s| s.phase == PollPhase::Connected).await.unwrap();
    assert_eq!(poller.snapshot().len(), 1);
    poller.stop();
}

#[derive(Default)]
struct ThreadRecordingStore {
    saved_on: Mutex<Option<std::thread::ThreadId>>,
}

impl SnapshotStore<Host> for ThreadRecordingStore {
    fn load(&self) -> Vec<Host> {
        Vec::new()
    }

    fn save(&self, _records: &[Arc<Host>]) {
        *self.saved_on.lock().unwrap() = Some(std::thread::current().id());
    }
}

#[tokio::test]
async fn cache_is_written_off_the_runtime_thread_before_connecting() {
    let store = Arc::new(ThreadRecordingStore::default());
    let source =
        ScriptedSource::default().ok(vec![json!({ "hostid": "1", "name": "db", "available": "1" })]);
    let poller: Poller<Hosts, _> = Poller::with_cache(
        source,
        PollSettings::every(Duration::from_secs(60)),
        clock(),
        store.clone(),
    );

    poller.try_refresh().await.unwrap();
    assert_eq!(poller.connection_state().phase, PollPhase::Connected);

    let saved_on = store.saved_on.lock().unwrap().expect("cache saved");
    assert_ne!(saved_on, std::thread::current().id());
}
