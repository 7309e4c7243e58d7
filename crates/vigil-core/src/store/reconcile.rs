// ── Incremental reconciliation ──
//
// Merges a freshly normalized snapshot into the previously published one.
// Records whose content is unchanged keep their existing `Arc`, so
// consumers can skip work with `Arc::ptr_eq`. Only new or changed records
// are allocated.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::model::Keyed;

/// How the published order is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderMode {
    /// Follow the order of each incoming (already sorted) snapshot.
    #[default]
    Sorted,
    /// The first snapshot fixes the order; later snapshots only append
    /// keys never seen before. Rows do not jump while a list is watched.
    AppendOnly,
}

/// Keys touched by one reconciliation, in published order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    /// The published key sequence differs from the previous one.
    pub reordered: bool,
}

impl ChangeSet {
    /// Nothing a consumer would need to redraw.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty() && !self.reordered
    }
}

/// Result of one reconciliation.
#[derive(Debug)]
pub struct Reconciled<T> {
    pub published: Arc<Vec<Arc<T>>>,
    pub changes: ChangeSet,
}

/// Per-domain reconciliation memory: records by key plus display order.
#[derive(Debug)]
pub struct ReconciliationState<T> {
    data_by_key: HashMap<String, Arc<T>>,
    /// In `AppendOnly` mode this keeps keys that have since disappeared, so
    /// a job that comes back returns to its old row. They are skipped when
    /// publishing. The list only grows, bounded by the distinct keys the
    /// source has ever reported (the configured backup jobs).
    display_order: Vec<String>,
}

impl<T> Default for ReconciliationState<T> {
    fn default() -> Self {
        Self {
            data_by_key: HashMap::new(),
            display_order: Vec::new(),
        }
    }
}

impl<T: Keyed + PartialEq> ReconciliationState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Arc<T>> {
        self.data_by_key.get(key)
    }

    pub fn len(&self) -> usize {
        self.data_by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_by_key.is_empty()
    }

    /// The current published list.
    pub fn published(&self) -> Vec<Arc<T>> {
        self.display_order
            .iter()
            .filter_map(|key| self.data_by_key.get(key).cloned())
            .collect()
    }

    fn published_keys(&self) -> Vec<&str> {
        self.display_order
            .iter()
            .filter(|key| self.data_by_key.contains_key(*key))
            .map(String::as_str)
            .collect()
    }

    /// Merge `incoming` into the state and return the new published list.
    ///
    /// Duplicate keys within one snapshot: the last record wins, at the
    /// position of the first occurrence.
    pub fn reconcile(&mut self, incoming: Vec<T>, mode: OrderMode) -> Reconciled<T> {
        let mut next: HashMap<String, Arc<T>> = HashMap::with_capacity(incoming.len());
        let mut incoming_order: Vec<String> = Vec::with_capacity(incoming.len());

        for record in incoming {
            let key = record.key().to_owned();
            let entry = match self.data_by_key.get(&key) {
                Some(prev) if **prev == record => Arc::clone(prev),
                _ => Arc::new(record),
            };
            if next.insert(key.clone(), entry).is_none() {
                incoming_order.push(key);
            }
        }

        let mut changes = ChangeSet::default();
        for key in &incoming_order {
            match (self.data_by_key.get(key), next.get(key)) {
                (None, _) => changes.added.push(key.clone()),
                (Some(prev), Some(cur)) if !Arc::ptr_eq(prev, cur) => {
                    changes.updated.push(key.clone());
                }
                _ => {}
            }
        }
        changes.removed = self
            .display_order
            .iter()
            .filter(|key| self.data_by_key.contains_key(*key) && !next.contains_key(*key))
            .cloned()
            .collect();

        let before: Vec<String> = self.published_keys().into_iter().map(str::to_owned).collect();

        match mode {
            OrderMode::Sorted => self.display_order = incoming_order,
            OrderMode::AppendOnly => {
                let fresh: Vec<String> = {
                    let known: HashSet<&str> =
                        self.display_order.iter().map(String::as_str).collect();
                    incoming_order
                        .into_iter()
                        .filter(|key| !known.contains(key.as_str()))
                        .collect()
                };
                self.display_order.extend(fresh);
            }
        }
        self.data_by_key = next;

        let after = self.published_keys();
        changes.reordered = before.len() == after.len()
            && changes.added.is_empty()
            && changes.removed.is_empty()
            && before.iter().zip(&after).any(|(a, b)| a != b);

        Reconciled {
            published: Arc::new(self.published()),
            changes,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: &'static str,
        value: u32,
    }

    impl Keyed for Row {
        fn key(&self) -> &str {
            self.id
        }
    }

    fn row(id: &'static str, value: u32) -> Row {
        Row { id, value }
    }

    fn keys(published: &[Arc<Row>]) -> Vec<&'static str> {
        published.iter().map(|r| r.id).collect()
    }

    #[test]
    fn unchanged_records_keep_identity() {
        let mut state = ReconciliationState::new();
        let first = state.reconcile(vec![row("a", 1), row("b", 2)], OrderMode::Sorted);
        let second = state.reconcile(vec![row("a", 1), row("b", 3)], OrderMode::Sorted);

        assert!(Arc::ptr_eq(&first.published[0], &second.published[0]));
        assert!(!Arc::ptr_eq(&first.published[1], &second.published[1]));
        assert_eq!(second.changes.updated, vec!["b".to_owned()]);
        assert!(second.changes.added.is_empty());
        assert!(second.changes.removed.is_empty());
    }

    #[test]
    fn identical_snapshot_is_a_no_op() {
        let mut state = ReconciliationState::new();
        let first = state.reconcile(vec![row("a", 1), row("b", 2)], OrderMode::Sorted);
        let second = state.reconcile(vec![row("a", 1), row("b", 2)], OrderMode::Sorted);

        assert!(second.changes.is_empty());
        for (old, new) in first.published.iter().zip(second.published.iter()) {
            assert!(Arc::ptr_eq(old, new));
        }
    }

    #[test]
    fn missing_keys_are_removed() {
        let mut state = ReconciliationState::new();
        state.reconcile(vec![row("a", 1), row("b", 2), row("c", 3)], OrderMode::Sorted);
        let next = state.reconcile(vec![row("c", 3), row("d", 4)], OrderMode::Sorted);

        assert_eq!(keys(&next.published), vec!["c", "d"]);
        assert_eq!(next.changes.added, vec!["d".to_owned()]);
        assert_eq!(next.changes.removed, vec!["a".to_owned(), "b".to_owned()]);
        assert!(state.get("a").is_none());
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn sorted_mode_follows_incoming_order() {
        let mut state = ReconciliationState::new();
        state.reconcile(vec![row("a", 1), row("b", 2)], OrderMode::Sorted);
        let next = state.reconcile(vec![row("b", 2), row("a", 1)], OrderMode::Sorted);

        assert_eq!(keys(&next.published), vec!["b", "a"]);
        assert!(next.changes.reordered);
        assert!(!next.changes.is_empty());
    }

    #[test]
    fn append_only_keeps_first_order_and_appends_new_keys() {
        let mut state = ReconciliationState::new();
        state.reconcile(vec![row("a", 1), row("b", 2)], OrderMode::AppendOnly);
        let next = state.reconcile(
            vec![row("c", 3), row("b", 20), row("a", 1)],
            OrderMode::AppendOnly,
        );

        assert_eq!(keys(&next.published), vec!["a", "b", "c"]);
        assert_eq!(next.published[1].value, 20);
        assert!(!next.changes.reordered);
    }

    #[test]
    fn append_only_drops_vanished_keys_and_restores_position() {
        let mut state = ReconciliationState::new();
        state.reconcile(vec![row("a", 1), row("b", 2), row("c", 3)], OrderMode::AppendOnly);

        let gone = state.reconcile(vec![row("a", 1), row("c", 3)], OrderMode::AppendOnly);
        assert_eq!(keys(&gone.published), vec!["a", "c"]);
        assert_eq!(gone.changes.removed, vec!["b".to_owned()]);

        let back = state.reconcile(vec![row("b", 2), row("a", 1), row("c", 3)], OrderMode::AppendOnly);
        assert_eq!(keys(&back.published), vec!["a", "b", "c"]);
        assert_eq!(back.changes.added, vec!["b".to_owned()]);
    }

    #[test]
    fn duplicate_keys_last_wins_at_first_position() {
        let mut state = ReconciliationState::new();
        let out = state.reconcile(
            vec![row("a", 1), row("b", 2), row("a", 9)],
            OrderMode::Sorted,
        );
        assert_eq!(keys(&out.published), vec!["a", "b"]);
        assert_eq!(out.published[0].value, 9);
    }

    #[test]
    fn empty_snapshot_clears_everything() {
        let mut state = ReconciliationState::new();
        state.reconcile(vec![row("a", 1)], OrderMode::Sorted);
        let out = state.reconcile(Vec::new(), OrderMode::Sorted);
        assert!(out.published.is_empty());
        assert_eq!(out.changes.removed, vec!["a".to_owned()]);
        assert!(state.is_empty());
    }
}
