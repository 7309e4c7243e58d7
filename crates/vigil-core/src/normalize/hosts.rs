use chrono::{DateTime, Utc};
use vigil_api::models::RawHost;

use super::{
    UNKNOWN_HOST, first_present, is_truthy, parse_count, parse_number, parse_timestamp, required,
};
use crate::error::ShapeError;
use crate::model::{Host, HostStatus};

const DOMAIN: &str = "hosts";

/// Normalize one Zabbix host. Only a host id is required.
pub fn normalize_host(raw: &RawHost, _now: DateTime<Utc>) -> Result<Host, ShapeError> {
    let id = required(
        first_present([
            raw.hostid.as_deref(),
            raw.host_id.as_deref(),
            raw.id.as_deref(),
        ]),
        DOMAIN,
        "hostid",
    )?;

    let name = first_present([
        raw.name.as_deref(),
        raw.visible_name.as_deref(),
        raw.host.as_deref(),
    ])
    .unwrap_or(UNKNOWN_HOST);
    let hostname = first_present([raw.host.as_deref(), raw.name.as_deref()]).unwrap_or(UNKNOWN_HOST);

    let main_ip = raw
        .interfaces
        .iter()
        .filter(|iface| iface.main.as_deref().is_some_and(is_truthy))
        .find_map(|iface| first_present([iface.ip.as_deref()]));
    let any_ip = raw
        .interfaces
        .iter()
        .find_map(|iface| first_present([iface.ip.as_deref()]));
    let ip = first_present([main_ip, any_ip, raw.ip.as_deref()]).unwrap_or_default();

    let status = if raw.status.as_deref().map(str::trim) == Some("1") {
        HostStatus::Disabled
    } else {
        match raw.available.as_deref().map(str::trim) {
            Some("1") => HostStatus::Online,
            Some("2") => HostStatus::Offline,
            _ => HostStatus::Unknown,
        }
    };

    let groups = raw
        .groups
        .iter()
        .filter_map(|g| first_present([g.name.as_deref()]))
        .map(str::to_owned)
        .collect();

    let os = first_present([
        raw.inventory.as_ref().and_then(|inv| inv.os.as_deref()),
        raw.os.as_deref(),
    ])
    .unwrap_or_default();

    let usage = |value: Option<&str>| value.and_then(parse_number).unwrap_or(0.0);

    Ok(Host {
        id: id.to_owned(),
        name: name.to_owned(),
        hostname: hostname.to_owned(),
        ip: ip.to_owned(),
        status,
        groups,
        os: os.to_owned(),
        cpu_usage: usage(raw.cpu.as_deref()),
        memory_usage: usage(raw.memory.as_deref()),
        disk_usage: usage(raw.disk.as_deref()),
        problem_count: first_present([raw.problems.as_deref(), raw.problem_count.as_deref()])
            .and_then(parse_count)
            .unwrap_or(0),
        last_seen: first_present([raw.lastaccess.as_deref(), raw.last_seen.as_deref()])
            .and_then(parse_timestamp),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use vigil_api::RawRecord;

    fn host(value: Value) -> Result<Host, ShapeError> {
        normalize_host(&RawHost::from_value(value).unwrap(), Utc::now())
    }

    #[test]
    fn zabbix_host_get_shape() {
        let h = host(json!({
            "hostid": "10084",
            "host": "web-01.internal",
            "name": "Web 01",
            "status": "0",
            "available": "1",
            "interfaces": [
                { "ip": "10.0.0.9", "main": "0" },
                { "ip": "10.0.0.5", "main": "1" }
            ],
            "groups": [{ "groupid": "2", "name": "Linux servers" }, { "groupid": "7" }],
            "inventory": { "os": "Ubuntu 22.04" },
            "problems": "3",
            "cpu": "37.5"
        }))
        .unwrap();

        assert_eq!(h.id, "10084");
        assert_eq!(h.name, "Web 01");
        assert_eq!(h.hostname, "web-01.internal");
        assert_eq!(h.ip, "10.0.0.5");
        assert_eq!(h.status, HostStatus::Online);
        assert_eq!(h.groups, vec!["Linux servers".to_owned()]);
        assert_eq!(h.os, "Ubuntu 22.04");
        assert_eq!(h.problem_count, 3);
        assert!((h.cpu_usage - 37.5).abs() < f64::EPSILON);
        assert!(h.memory_usage.abs() < f64::EPSILON);
    }

    #[test]
    fn disabled_wins_over_availability() {
        let h = host(json!({ "hostid": 1, "status": 1, "available": 1 })).unwrap();
        assert_eq!(h.status, HostStatus::Disabled);

        let h = host(json!({ "hostid": 2, "available": "2" })).unwrap();
        assert_eq!(h.status, HostStatus::Offline);

        let h = host(json!({ "hostid": 3, "available": "0" })).unwrap();
        assert_eq!(h.status, HostStatus::Unknown);
    }

    #[test]
    fn fallbacks_when_fields_are_missing() {
        let h = host(json!({ "id": "h-9", "ip": "192.168.1.4", "os": "Windows" })).unwrap();
        assert_eq!(h.id, "h-9");
        assert_eq!(h.name, "unknown-host");
        assert_eq!(h.hostname, "unknown-host");
        assert_eq!(h.ip, "192.168.1.4");
        assert_eq!(h.os, "Windows");
        assert_eq!(h.problem_count, 0);
        assert!(h.groups.is_empty());
        assert_eq!(h.last_seen, None);
    }

    #[test]
    fn host_without_id_is_rejected() {
        assert_eq!(
            host(json!({ "name": "orphan" })).unwrap_err(),
            ShapeError::MissingField {
                domain: "hosts",
                field: "hostid"
            }
        );
    }

    #[test]
    fn normalizing_twice_gives_equal_hosts() {
        let record = RawHost::from_value(json!({
            "hostid": "10090",
            "host": "nas-01",
            "available": "2",
            "interfaces": [{ "ip": "10.0.0.20" }],
            "groups": [{ "name": "Storage" }],
            "lastaccess": "1748770200"
        }))
        .unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        let first = normalize_host(&record, now).unwrap();
        let second = normalize_host(&record, now).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.status, HostStatus::Offline);
    }
}
