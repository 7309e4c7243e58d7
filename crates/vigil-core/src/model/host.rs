// ── Host domain types ──

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HostStatus {
    Online,
    Offline,
    Unknown,
    Disabled,
}

/// A monitored host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    /// Visible name.
    pub name: String,
    /// Technical host name.
    pub hostname: String,
    pub ip: String,
    pub status: HostStatus,
    pub groups: Vec<String>,
    pub os: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub problem_count: u32,
    pub last_seen: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostCounts {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub unknown: usize,
    pub disabled: usize,
    pub with_problems: usize,
}

impl HostCounts {
    pub fn tally(hosts: &[Arc<Host>]) -> Self {
        let mut counts = Self {
            total: hosts.len(),
            ..Self::default()
        };
        for host in hosts {
            match host.status {
                HostStatus::Online => counts.online += 1,
                HostStatus::Offline => counts.offline += 1,
                HostStatus::Unknown => counts.unknown += 1,
                HostStatus::Disabled => counts.disabled += 1,
            }
            if host.problem_count > 0 {
                counts.with_problems += 1;
            }
        }
        counts
    }
}
