#![allow(clippy::unwrap_used)]

// End-to-end: Dashboard against a mock webhook server.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use vigil_api::{Endpoint, RequestBody};
use vigil_core::{
    CoreError, Dashboard, DashboardConfig, DomainEndpoint, HostCache, HostStatus, LogSource,
    ManualClock, PollPhase, PollSettings, Severity, SnapshotStore,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn url(server: &MockServer, p: &str) -> Url {
    Url::parse(&format!("{}{p}", server.uri())).unwrap()
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 8, 12, 0, 0).unwrap(),
    ))
}

fn domain(endpoint: Endpoint, secs: u64) -> Option<DomainEndpoint> {
    Some(DomainEndpoint {
        endpoint,
        poll: PollSettings::every(Duration::from_secs(secs)),
    })
}

#[tokio::test]
async fn refresh_all_populates_every_domain() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/webhook/ai-insights"))
        .and(header("authorization", "Bearer s3cret"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "e1",
                "first_ai_response": "Extend the volume.",
                "last_seen_at": "2025-06-08T11:00:00Z",
                "zbx_raw": { "severity": "Disaster", "host": "nas-01", "name": "Disk failure" }
            },
            { "id": "broken" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/webhook/zabbix-hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "hostid": "2", "name": "web", "available": "2" },
            { "hostid": "1", "name": "db", "available": "1" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/webhook/ai-reports"))
        .and(body_json(json!({
            "from": "2025-06-01T12:00:00.000Z",
            "to": "2025-06-08T12:00:00.000Z"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "r1",
            "title": "Weekly",
            "content": "Everything is fine.",
            "created_at": "2025-06-08T06:00:00Z"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/webhook/veeam-jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "j1", "name": "Nightly", "lastResult": "Warning" }
        ])))
        .mount(&server)
        .await;

    let cache_dir = tempfile::tempdir().unwrap();
    let clock = clock();
    let config = DashboardConfig {
        alerts: domain(
            Endpoint::post(url(&server, "/webhook/ai-insights"), RequestBody::EmptyObject),
            30,
        ),
        hosts: domain(Endpoint::get(url(&server, "/webhook/zabbix-hosts")), 60),
        reports: domain(
            Endpoint::post(url(&server, "/webhook/ai-reports"), RequestBody::EmptyObject),
            120,
        ),
        backup_jobs: domain(Endpoint::get(url(&server, "/webhook/veeam-jobs")), 5),
        token: Some(SecretString::from("s3cret".to_owned())),
        cache_dir: Some(cache_dir.path().to_path_buf()),
        ..DashboardConfig::default()
    };

    let dashboard = Dashboard::with_clock(config, clock.clone()).unwrap();
    assert_eq!(
        dashboard.domains(),
        vec!["alerts", "hosts", "reports", "backup_jobs"]
    );
    dashboard.refresh_all().await;

    let alerts = dashboard.alerts().unwrap();
    let view = alerts.view();
    assert_eq!(view.data.len(), 1);
    assert_eq!(view.data[0].severity, Severity::Disaster);
    assert_eq!(view.counts.disaster, 1);
    assert_eq!(view.connection.phase, PollPhase::Connected);

    let hosts = dashboard.hosts().unwrap().snapshot();
    let names: Vec<_> = hosts.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["db", "web"]);
    assert_eq!(hosts[1].status, HostStatus::Offline);

    let reports = dashboard.reports().unwrap().snapshot();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].age, "6h 0m");

    assert_eq!(dashboard.backup_jobs().unwrap().counts().warning, 1);

    // The hosts snapshot landed in the cache.
    let cache = HostCache::new(cache_dir.path(), clock);
    assert_eq!(cache.load().len(), 2);
}

#[tokio::test]
async fn unreachable_webhook_reports_error_without_data() {
    let config = DashboardConfig {
        alerts: domain(
            Endpoint::post(
                Url::parse("http://127.0.0.1:1/webhook/ai-insights").unwrap(),
                RequestBody::EmptyObject,
            ),
            30,
        ),
        ..DashboardConfig::default()
    };
    let dashboard = Dashboard::with_clock(config, clock()).unwrap();
    let alerts = dashboard.alerts().unwrap();

    let err = alerts.try_refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::Unreachable { .. }));
    let state = alerts.connection_state();
    assert!(!state.is_connected);
    assert!(state.error.unwrap().starts_with("Cannot reach webhook"));
    assert!(alerts.snapshot().is_empty());
}

#[tokio::test]
async fn system_logs_merge_both_feeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "time": 1_700_000_000_000_i64, "type": "LOGIN", "userId": "u1" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/admin-events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "time": 1_700_000_500_000_i64, "operationType": "UPDATE", "resourceType": "CLIENT" }
        ])))
        .mount(&server)
        .await;

    let config = DashboardConfig {
        user_events: Some(url(&server, "/admin/events")),
        admin_events: Some(url(&server, "/admin/admin-events")),
        ..DashboardConfig::default()
    };
    let dashboard = Dashboard::new(config).unwrap();

    let logs = dashboard.system_logs().await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].source, LogSource::Admin);
    assert_eq!(logs[0].event, "UPDATE_CLIENT");
    assert_eq!(logs[1].user, "u1");
}

#[tokio::test]
async fn system_logs_fail_when_either_feed_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/admin-events"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let config = DashboardConfig {
        user_events: Some(url(&server, "/admin/events")),
        admin_events: Some(url(&server, "/admin/admin-events")),
        ..DashboardConfig::default()
    };
    let err = Dashboard::new(config)
        .unwrap()
        .system_logs()
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Http { status: 403, .. }));
}

#[tokio::test]
async fn unconfigured_domains_are_reported() {
    let dashboard = Dashboard::new(DashboardConfig::default()).unwrap();
    assert!(dashboard.domains().is_empty());
    assert!(matches!(
        dashboard.hosts(),
        Err(CoreError::NotConfigured { .. })
    ));
    assert!(matches!(
        dashboard.system_logs().await,
        Err(CoreError::NotConfigured { .. })
    ));
}

#[tokio::test]
async fn dropping_the_dashboard_stops_its_pollers() {
    let config = DashboardConfig {
        backup_jobs: domain(
            Endpoint::get(Url::parse("http://127.0.0.1:1/webhook/veeam-jobs").unwrap()),
            5,
        ),
        ..DashboardConfig::default()
    };
    let dashboard = Dashboard::with_clock(config, clock()).unwrap();
    dashboard.start_all();
    let jobs = dashboard.backup_jobs().unwrap().clone();
    assert!(jobs.is_running());

    drop(dashboard);
    assert!(!jobs.is_running());
}
