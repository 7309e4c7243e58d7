// ── Reactive reconciled collection ──
//
// Wraps a `ReconciliationState` behind a mutex and broadcasts each new
// published snapshot over `watch` channels. Subscribers are only woken
// when a reconciliation actually changed something.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use super::reconcile::{ChangeSet, OrderMode, ReconciliationState};
use crate::model::Keyed;

pub(crate) struct ReconciledCollection<T: Send + Sync + 'static> {
    state: Mutex<ReconciliationState<T>>,
    mode: OrderMode,

    /// Version counter, bumped on every published change.
    version: watch::Sender<u64>,

    /// Published snapshot in display order.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Keyed + PartialEq + Send + Sync + 'static> ReconciledCollection<T> {
    pub(crate) fn new(mode: OrderMode) -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            state: Mutex::new(ReconciliationState::new()),
            mode,
            version,
            snapshot,
        }
    }

    /// Reconcile a full snapshot. Returns the change set, which is empty
    /// when nothing was published.
    pub(crate) fn apply(&self, incoming: Vec<T>) -> ChangeSet {
        let reconciled = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.reconcile(incoming, self.mode)
        };

        if !reconciled.changes.is_empty() {
            // `send_replace` updates even with zero receivers.
            self.snapshot.send_replace(reconciled.published);
            self.version.send_modify(|v| *v += 1);
        }
        reconciled.changes
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
