// ── Polling controller ──
//
// One poller per domain: an initial fetch on start, then a silent refresh
// on every interval tick. Each completed fetch is normalized, sorted and
// reconciled into the published snapshot. Failures never clear data; they
// only change the connection state.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use strum::Display;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::PollSettings;
use crate::domain::{Domain, normalize_batch};
use crate::error::CoreError;
use crate::fetch::RecordSource;
use crate::store::collection::ReconciledCollection;
use crate::store::{ChangeSet, SnapshotStore};
use crate::stream::EntityStream;

/// Where a poller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PollPhase {
    /// Not started.
    Idle,
    /// A blocking fetch (initial or manual) is in flight.
    Loading,
    Connected,
    Disconnected,
    /// A silent background fetch is in flight.
    Refreshing,
}

/// Connection state exposed to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionState {
    pub phase: PollPhase,
    /// Outcome of the most recent completed fetch.
    pub is_connected: bool,
    /// Time of the last successful fetch.
    pub last_updated: Option<DateTime<Utc>>,
    /// Message of the last failed blocking fetch, cleared on success.
    pub error: Option<String>,
    /// A blocking fetch is in flight.
    pub loading: bool,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            phase: PollPhase::Idle,
            is_connected: false,
            last_updated: None,
            error: None,
            loading: false,
        }
    }
}

/// Everything a consumer renders for one domain.
#[derive(Debug, Clone)]
pub struct PollerView<R, C> {
    pub data: Arc<Vec<Arc<R>>>,
    pub counts: Arc<C>,
    pub connection: ConnectionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleMode {
    /// Shows a loading indicator and records errors.
    Blocking,
    /// Background refresh: failures only flip `is_connected`.
    Silent,
}

/// In-flight bookkeeping, guarded by one lock so sequence checks and
/// state transitions happen atomically.
#[derive(Debug, Default)]
struct CycleBook {
    issued: u64,
    last_settled: u64,
    blocking: usize,
    silent: usize,
    completed: bool,
}

impl CycleBook {
    fn phase(&self, is_connected: bool) -> PollPhase {
        if self.blocking > 0 {
            PollPhase::Loading
        } else if self.silent > 0 {
            PollPhase::Refreshing
        } else if !self.completed {
            PollPhase::Idle
        } else if is_connected {
            PollPhase::Connected
        } else {
            PollPhase::Disconnected
        }
    }
}

/// Periodic poller for one dashboard domain.
///
/// Cheap to clone; clones share state. [`start`](Self::start) and the
/// refresh methods must be called from within a Tokio runtime.
pub struct Poller<D: Domain, S: RecordSource> {
    inner: Arc<PollerInner<D, S>>,
}

impl<D: Domain, S: RecordSource> Clone for Poller<D, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct PollerInner<D: Domain, S: RecordSource> {
    source: S,
    settings: PollSettings,
    clock: Arc<dyn Clock>,
    cache: Option<Arc<dyn SnapshotStore<D::Record>>>,
    collection: ReconciledCollection<D::Record>,
    counts: watch::Sender<Arc<D::Counts>>,
    connection: watch::Sender<ConnectionState>,
    book: Mutex<CycleBook>,
    /// Child token for the current run: cancelled on stop, replaced on start.
    session: Mutex<CancellationToken>,
    /// Token of the abortable request currently in flight.
    in_flight: Mutex<Option<CancellationToken>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Serializes cache writes from overlapping cycles.
    saving: tokio::sync::Mutex<()>,
    _domain: PhantomData<fn() -> D>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<D: Domain, S: RecordSource> Poller<D, S> {
    pub fn new(source: S, settings: PollSettings, clock: Arc<dyn Clock>) -> Self {
        Self::build(source, settings, clock, None)
    }

    /// A poller that paints from `cache` on start and saves every
    /// successful snapshot back to it.
    pub fn with_cache(
        source: S,
        settings: PollSettings,
        clock: Arc<dyn Clock>,
        cache: Arc<dyn SnapshotStore<D::Record>>,
    ) -> Self {
        Self::build(source, settings, clock, Some(cache))
    }

    fn build(
        source: S,
        settings: PollSettings,
        clock: Arc<dyn Clock>,
        cache: Option<Arc<dyn SnapshotStore<D::Record>>>,
    ) -> Self {
        let (counts, _) = watch::channel(Arc::new(D::Counts::default()));
        let (connection, _) = watch::channel(ConnectionState::default());
        let session = CancellationToken::new();
        session.cancel();

        Self {
            inner: Arc::new(PollerInner {
                source,
                settings,
                clock,
                cache,
                collection: ReconciledCollection::new(D::ORDER),
                counts,
                connection,
                book: Mutex::new(CycleBook::default()),
                session: Mutex::new(session),
                in_flight: Mutex::new(None),
                tasks: Mutex::new(Vec::new()),
                saving: tokio::sync::Mutex::new(()),
                _domain: PhantomData,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        D::NAME
    }

    pub fn settings(&self) -> PollSettings {
        self.inner.settings
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Begin polling.
    ///
    /// With a non-empty cache (or data from an earlier run) the snapshot is
    /// published immediately and the first fetch is silent; otherwise the
    /// first fetch is blocking. Calling `start` on a running poller is a
    /// no-op.
    pub fn start(&self) {
        let session = {
            let mut session = lock(&self.inner.session);
            if !session.is_cancelled() {
                debug!(domain = D::NAME, "poller already running");
                return;
            }
            *session = CancellationToken::new();
            session.clone()
        };

        let mode = if self.seed() {
            CycleMode::Silent
        } else {
            CycleMode::Blocking
        };
        let seq = self.begin(mode);

        let mut tasks = lock(&self.inner.tasks);
        tasks.retain(|handle| !handle.is_finished());

        let initial = self.clone();
        tasks.push(tokio::spawn(async move {
            let _ = initial.execute(seq, mode).await;
        }));

        if self.inner.settings.interval.is_zero() {
            debug!(domain = D::NAME, "interval is zero, not scheduling refreshes");
        } else {
            let looping = self.clone();
            tasks.push(tokio::spawn(async move { looping.poll_loop(session).await }));
        }
        info!(
            domain = D::NAME,
            interval = ?self.inner.settings.interval,
            "poller started"
        );
    }

    /// Stop scheduling refreshes.
    ///
    /// Requests already in flight are allowed to finish and apply, except
    /// for abortable domains, whose in-flight request is cancelled.
    pub fn stop(&self) {
        lock(&self.inner.session).cancel();
        if let Some(in_flight) = lock(&self.inner.in_flight).take() {
            in_flight.cancel();
        }
        lock(&self.inner.tasks).clear();
        info!(domain = D::NAME, "poller stopped");
    }

    pub fn is_running(&self) -> bool {
        !lock(&self.inner.session).is_cancelled()
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Manual refresh: a blocking fetch that shows the loading indicator.
    /// Never fails; the outcome lands in [`connection_state`](Self::connection_state).
    pub async fn refresh(&self) {
        let _ = self.try_refresh().await;
    }

    /// Blocking fetch that also reports its outcome.
    ///
    /// Returns `CoreError::Superseded` when a newer request overtook this
    /// one and its response was discarded.
    pub async fn try_refresh(&self) -> Result<ChangeSet, CoreError> {
        let seq = self.begin(CycleMode::Blocking);
        self.execute(seq, CycleMode::Blocking).await
    }

    async fn poll_loop(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.inner.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    debug!(domain = D::NAME, "poll tick");
                    let seq = self.begin(CycleMode::Silent);
                    let poller = self.clone();
                    // Ticks do not wait for slow requests; overlapping
                    // responses are ordered by sequence number.
                    tokio::spawn(async move {
                        let _ = poller.execute(seq, CycleMode::Silent).await;
                    });
                }
            }
        }
        debug!(domain = D::NAME, "poll loop exited");
    }

    /// Publish cached or previously fetched records. Returns `true` when
    /// there is something on screen.
    fn seed(&self) -> bool {
        if !self.inner.collection.is_empty() {
            return true;
        }
        let Some(cache) = &self.inner.cache else {
            return false;
        };
        let cached = cache.load();
        if cached.is_empty() {
            return false;
        }

        let count = cached.len();
        self.inner.collection.apply(D::sort(cached));
        self.publish_counts();
        info!(domain = D::NAME, count, "painted from cache");
        true
    }

    fn begin(&self, mode: CycleMode) -> u64 {
        let mut book = lock(&self.inner.book);
        book.issued += 1;
        match mode {
            CycleMode::Blocking => book.blocking += 1,
            CycleMode::Silent => book.silent += 1,
        }
        self.publish_state(&book, |_| {});
        book.issued
    }

    async fn execute(&self, seq: u64, mode: CycleMode) -> Result<ChangeSet, CoreError> {
        let fetched = self.fetch().await;
        let (changes, at) = self.settle(seq, mode, fetched)?;
        self.persist().await;

        // A newer response may have settled while the cache was written;
        // its connection state stands.
        let book = lock(&self.inner.book);
        if book.last_settled == seq {
            self.publish_state(&book, |state| {
                state.is_connected = true;
                state.error = None;
                state.last_updated = Some(at);
            });
        } else {
            self.publish_state(&book, |_| {});
        }
        Ok(changes)
    }

    /// Write the published snapshot to the cache off the async workers.
    async fn persist(&self) {
        let Some(cache) = &self.inner.cache else {
            return;
        };
        let _saving = self.inner.saving.lock().await;
        let cache = Arc::clone(cache);
        let snapshot = self.inner.collection.snapshot();
        if let Err(err) = tokio::task::spawn_blocking(move || cache.save(&snapshot)).await {
            warn!(domain = D::NAME, error = %err, "cache save task failed");
        }
    }

    async fn fetch(&self) -> Result<Vec<Value>, CoreError> {
        if !self.inner.settings.abort_in_flight {
            return Ok(self.inner.source.fetch().await?);
        }

        let token = self.supersede_in_flight();
        tokio::select! {
            () = token.cancelled() => Err(CoreError::Superseded),
            result = self.inner.source.fetch() => Ok(result?),
        }
    }

    /// Cancel the previous abortable request and register a new one.
    fn supersede_in_flight(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = lock(&self.inner.in_flight).replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    /// Apply a fetch outcome. On success the data is published but the
    /// connection state is left to the caller, which saves the cache first.
    fn settle(
        &self,
        seq: u64,
        mode: CycleMode,
        fetched: Result<Vec<Value>, CoreError>,
    ) -> Result<(ChangeSet, DateTime<Utc>), CoreError> {
        let mut book = lock(&self.inner.book);
        match mode {
            CycleMode::Blocking => book.blocking = book.blocking.saturating_sub(1),
            CycleMode::Silent => book.silent = book.silent.saturating_sub(1),
        }

        if seq < book.last_settled || matches!(fetched, Err(CoreError::Superseded)) {
            debug!(domain = D::NAME, seq, "discarding superseded response");
            self.publish_state(&book, |_| {});
            return Err(CoreError::Superseded);
        }
        book.last_settled = seq;
        book.completed = true;

        match fetched {
            Ok(values) => {
                let now = self.inner.clock.now();
                let records = normalize_batch::<D>(values, now);
                let changes = self.inner.collection.apply(records);
                if !changes.is_empty() {
                    self.publish_counts();
                    debug!(
                        domain = D::NAME,
                        added = changes.added.len(),
                        updated = changes.updated.len(),
                        removed = changes.removed.len(),
                        "snapshot changed"
                    );
                }
                Ok((changes, now))
            }
            Err(err) => {
                warn!(domain = D::NAME, error = %err, "fetch failed, keeping previous data");
                let message = err.to_string();
                self.publish_state(&book, |state| {
                    state.is_connected = false;
                    if mode == CycleMode::Blocking {
                        state.error = Some(message);
                    }
                });
                Err(err)
            }
        }
    }

    fn publish_state(&self, book: &CycleBook, update: impl FnOnce(&mut ConnectionState)) {
        self.inner.connection.send_modify(|state| {
            update(state);
            state.loading = book.blocking > 0;
            state.phase = book.phase(state.is_connected);
        });
    }

    fn publish_counts(&self) {
        let snapshot = self.inner.collection.snapshot();
        self.inner
            .counts
            .send_replace(Arc::new(D::counts(&snapshot)));
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Current published list (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Arc<D::Record>>> {
        self.inner.collection.snapshot()
    }

    pub fn stream(&self) -> EntityStream<D::Record> {
        EntityStream::new(self.inner.collection.subscribe())
    }

    pub fn get(&self, key: &str) -> Option<Arc<D::Record>> {
        self.inner.collection.get(key)
    }

    pub fn counts(&self) -> Arc<D::Counts> {
        self.inner.counts.borrow().clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.inner.connection.borrow().clone()
    }

    pub fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection.subscribe()
    }

    /// Bumped on every published change.
    pub fn version(&self) -> u64 {
        self.inner.collection.version()
    }

    pub fn view(&self) -> PollerView<D::Record, D::Counts> {
        PollerView {
            data: self.snapshot(),
            counts: self.counts(),
            connection: self.connection_state(),
        }
    }
}
