// ── Alert domain types ──

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Zabbix problem severity, least to most severe.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Average,
    High,
    Disaster,
}

impl Severity {
    /// Most severe first, the order dashboards list them in.
    pub const DESCENDING: [Severity; 5] = [
        Severity::Disaster,
        Severity::High,
        Severity::Average,
        Severity::Warning,
        Severity::Info,
    ];
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

/// Coarse problem category inferred from the problem text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Category {
    #[serde(rename = "VMware")]
    #[strum(serialize = "VMware")]
    VMware,
    Disk,
    #[serde(rename = "CPU")]
    #[strum(serialize = "CPU")]
    Cpu,
    Memory,
    Network,
    Database,
    Service,
    System,
}

/// One AI-annotated monitoring problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub host: String,
    pub problem: String,
    pub description: String,
    pub severity: Severity,
    pub status: AlertStatus,
    pub category: Category,
    pub acknowledged: bool,
    pub resolved: bool,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    /// Raw Zabbix event clock, epoch seconds.
    pub clock: Option<i64>,
    /// Elapsed time since the problem started, e.g. `"2h 5m"`.
    pub duration: String,
    pub ai_response: String,
    pub occurrences: u32,
}

/// Aggregate counts over an alert snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub total: usize,
    pub disaster: usize,
    pub high: usize,
    pub average: usize,
    pub warning: usize,
    pub info: usize,
    pub active: usize,
    pub acknowledged: usize,
    pub resolved: usize,
}

impl AlertCounts {
    pub fn tally(alerts: &[Arc<Alert>]) -> Self {
        let mut counts = Self {
            total: alerts.len(),
            ..Self::default()
        };
        for alert in alerts {
            match alert.severity {
                Severity::Disaster => counts.disaster += 1,
                Severity::High => counts.high += 1,
                Severity::Average => counts.average += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Info => counts.info += 1,
            }
            match alert.status {
                AlertStatus::Active => counts.active += 1,
                AlertStatus::Acknowledged => counts.acknowledged += 1,
                AlertStatus::Resolved => counts.resolved += 1,
            }
        }
        counts
    }

    pub fn for_severity(&self, severity: Severity) -> usize {
        match severity {
            Severity::Disaster => self.disaster,
            Severity::High => self.high,
            Severity::Average => self.average,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!(Severity::from_str("HIGH").unwrap(), Severity::High);
        assert_eq!(Severity::Disaster.to_string(), "disaster");
        assert!(Severity::Disaster > Severity::Warning);
    }

    #[test]
    fn category_display_names() {
        assert_eq!(Category::Cpu.to_string(), "CPU");
        assert_eq!(Category::VMware.to_string(), "VMware");
        assert_eq!(
            serde_json::to_value(Category::Cpu).unwrap(),
            serde_json::json!("CPU")
        );
    }
}
