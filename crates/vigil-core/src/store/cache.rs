// ── Host snapshot cache ──
//
// Last successful hosts snapshot on disk, so the dashboard paints
// immediately on the next start. A missing or unreadable cache file is
// treated as empty; write failures are logged and ignored.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::PersistenceError;
use crate::model::Host;

/// Persistent storage for one domain's last published snapshot.
pub trait SnapshotStore<T>: Send + Sync {
    /// Records from the last save, or empty when nothing usable exists.
    fn load(&self) -> Vec<T>;

    /// Persist a snapshot. Failures are logged, never raised.
    fn save(&self, records: &[Arc<T>]);
}

#[derive(Deserialize)]
struct StoredHosts {
    hosts: Vec<Host>,
}

#[derive(Serialize)]
struct StoredHostsRef<'a> {
    hosts: &'a [Arc<Host>],
    /// Save time, epoch milliseconds.
    timestamp: i64,
}

/// File-backed cache for the hosts domain.
#[derive(Debug, Clone)]
pub struct HostCache {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl HostCache {
    pub const FILE_NAME: &'static str = "zabbix_hosts_cache.json";

    pub fn new(dir: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: dir.as_ref().join(Self::FILE_NAME),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_load(&self) -> Result<Vec<Host>, PersistenceError> {
        let raw = fs::read_to_string(&self.path)?;
        let stored: StoredHosts = serde_json::from_str(&raw)?;
        Ok(stored.hosts)
    }

    pub fn try_save(&self, hosts: &[Arc<Host>]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec(&StoredHostsRef {
            hosts,
            timestamp: self.clock.now().timestamp_millis(),
        })?;

        // Write-then-rename so a crash never leaves a half-written cache.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SnapshotStore<Host> for HostCache {
    fn load(&self) -> Vec<Host> {
        match self.try_load() {
            Ok(hosts) => {
                debug!(path = %self.path.display(), count = hosts.len(), "loaded host cache");
                hosts
            }
            Err(PersistenceError::Io(e)) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable host cache");
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[Arc<Host>]) {
        if let Err(e) = self.try_save(records) {
            warn!(path = %self.path.display(), error = %e, "failed to write host cache");
        }
    }
}
