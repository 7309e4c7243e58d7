// ── Snapshot store ──
//
// Identity-preserving reconciliation of incoming snapshots, the reactive
// collection consumers subscribe to, and the on-disk host cache.

mod cache;
pub(crate) mod collection;
mod reconcile;

pub use cache::{HostCache, SnapshotStore};
pub use reconcile::{ChangeSet, OrderMode, Reconciled, ReconciliationState};
