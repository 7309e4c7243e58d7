// ── Snapshot subscriptions ──
//
// Consumer-side handle on a domain's published list. Only effective
// changes are published, so every wake-up carries new content.

use std::sync::Arc;

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// A subscription to one domain's published snapshot.
pub struct EntityStream<T: Send + Sync + 'static> {
    current: Snapshot<T>,
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(mut receiver: watch::Receiver<Snapshot<T>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// Snapshot as of subscription or the last [`changed`](Self::changed).
    pub fn current(&self) -> &Snapshot<T> {
        &self.current
    }

    /// Latest published snapshot, whether or not it has been observed.
    pub fn latest(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next published snapshot.
    /// Returns `None` once the poller has been dropped.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        self.receiver.changed().await.ok()?;
        self.current = self.receiver.borrow_and_update().clone();
        Some(Arc::clone(&self.current))
    }

    /// Snapshots published after subscription, as a `Stream`. The one
    /// already held in [`current`](Self::current) is not repeated.
    pub fn into_stream(self) -> impl Stream<Item = Snapshot<T>> + Unpin + Send {
        WatchStream::from_changes(self.receiver)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_stream::StreamExt;

    use super::*;
    use crate::model::Keyed;
    use crate::store::OrderMode;
    use crate::store::collection::ReconciledCollection;

    #[derive(Debug, PartialEq)]
    struct Item(&'static str, u8);

    impl Keyed for Item {
        fn key(&self) -> &str {
            self.0
        }
    }

    #[tokio::test]
    async fn changed_advances_current() {
        let col = ReconciledCollection::new(OrderMode::Sorted);
        let mut sub = EntityStream::new(col.subscribe());
        assert!(sub.current().is_empty());

        col.apply(vec![Item("a", 1)]);
        assert_eq!(sub.latest().len(), 1);
        assert!(sub.current().is_empty());

        let snap = sub.changed().await.unwrap();
        assert_eq!(snap.len(), 1);
        assert!(Arc::ptr_eq(&snap, sub.current()));
    }

    #[tokio::test]
    async fn stream_skips_the_held_snapshot_and_unchanged_applies() {
        let col = ReconciledCollection::new(OrderMode::Sorted);
        col.apply(vec![Item("a", 1)]);
        let mut snapshots = EntityStream::new(col.subscribe()).into_stream();

        col.apply(vec![Item("a", 1)]);
        col.apply(vec![Item("a", 1), Item("b", 2)]);

        let next = snapshots.next().await.unwrap();
        let keys: Vec<_> = next.iter().map(|i| i.0).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn stream_ends_when_the_publisher_goes_away() {
        let col = ReconciledCollection::<Item>::new(OrderMode::Sorted);
        let mut snapshots = EntityStream::new(col.subscribe()).into_stream();
        drop(col);
        assert!(snapshots.next().await.is_none());
    }
}
