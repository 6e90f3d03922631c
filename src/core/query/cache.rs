//! Process-wide request cache.
//!
//! One entry per [`QueryKey`], created lazily on first use and kept for the
//! lifetime of the cache. Entries are mutated only through the fetch /
//! refetch / invalidate operations below; consumers observe them through
//! snapshots and watch subscriptions.
//!
//! The dedup guarantee: at most one load is in flight per key. Every
//! caller that asks while a load is outstanding attaches to the same
//! shared future and receives the same settled result. Loads are driven by
//! a spawned task, so they run to completion and store their result even
//! if every caller goes away mid-flight.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::dto::ApiResponse;
use crate::core::query::key::QueryKey;
use crate::core::query::state::{QuerySnapshot, QueryStatus};
use crate::errors::ClientError;

/// Settled outcome of a load, shared by every attached caller.
pub type QueryOutcome = Result<Arc<ApiResponse<Value>>, ClientError>;

type SharedLoad = Shared<BoxFuture<'static, QueryOutcome>>;

struct CacheEntry {
    data: Option<Arc<ApiResponse<Value>>>,
    error: Option<ClientError>,
    fetched_at: Option<Instant>,
    in_flight: Option<SharedLoad>,
    tx: watch::Sender<QuerySnapshot>,
}

impl CacheEntry {
    fn new() -> Self {
        Self {
            data: None,
            error: None,
            fetched_at: None,
            in_flight: None,
            tx: watch::Sender::new(QuerySnapshot::idle()),
        }
    }

    fn fresh_data(&self, stale_time: Duration) -> Option<Arc<ApiResponse<Value>>> {
        match (&self.data, self.fetched_at) {
            (Some(data), Some(at)) if at.elapsed() < stale_time => Some(data.clone()),
            _ => None,
        }
    }

    fn snapshot(&self) -> QuerySnapshot {
        let status = if self.error.is_some() {
            QueryStatus::Error
        } else if self.data.is_some() {
            QueryStatus::Success
        } else if self.in_flight.is_some() {
            QueryStatus::Loading
        } else {
            QueryStatus::Idle
        };

        QuerySnapshot {
            status,
            data: self.data.clone(),
            error: self.error.clone(),
            fetched_at: self.fetched_at,
            is_fetching: self.in_flight.is_some(),
        }
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }
}

/// Cheaply clonable handle over the shared entry map. Constructed once at
/// application start and passed to every query handle; a fresh instance
/// per test gives fully isolated state.
#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, CacheEntry>>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // Bookkeeping runs entirely under this lock, which is never held
    // across an await point.
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Non-blocking lookup. `None` means the key has never been touched.
    pub fn read(&self, key: &QueryKey) -> Option<QuerySnapshot> {
        self.lock().get(key).map(CacheEntry::snapshot)
    }

    /// Registers for change notifications on `key`, creating the entry if
    /// it does not exist yet. Dropping the receiver unsubscribes.
    pub fn subscribe(&self, key: &QueryKey) -> watch::Receiver<QuerySnapshot> {
        self.lock()
            .entry(key.clone())
            .or_insert_with(CacheEntry::new)
            .tx
            .subscribe()
    }

    /// Resolves with cached data if it is younger than `stale_time`,
    /// attaches to an in-flight load if one exists, and only otherwise
    /// invokes `make_loader`.
    pub async fn fetch<F, Fut>(
        &self,
        key: &QueryKey,
        make_loader: F,
        stale_time: Duration,
    ) -> QueryOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ApiResponse<Value>, ClientError>> + Send + 'static,
    {
        let load = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_insert_with(CacheEntry::new);

            if let Some(load) = &entry.in_flight {
                debug!(key = %key, "attaching to in-flight load");
                load.clone()
            } else if let Some(data) = entry.fresh_data(stale_time) {
                debug!(key = %key, "cache hit");
                return Ok(data);
            } else {
                self.start_load(entry, key, make_loader())
            }
        };

        load.await
    }

    /// Bypasses the staleness check unconditionally, still honoring the
    /// in-flight dedup guarantee.
    pub async fn force_refetch<F, Fut>(&self, key: &QueryKey, make_loader: F) -> QueryOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ApiResponse<Value>, ClientError>> + Send + 'static,
    {
        let load = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_insert_with(CacheEntry::new);

            if let Some(load) = &entry.in_flight {
                debug!(key = %key, "refetch attaching to in-flight load");
                load.clone()
            } else {
                self.start_load(entry, key, make_loader())
            }
        };

        load.await
    }

    /// Marks the entry stale without touching its data; the next `fetch`
    /// will reload regardless of `stale_time`.
    pub fn invalidate(&self, key: &QueryKey) {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(key) {
            entry.fetched_at = None;
            entry.publish();
        }
    }

    fn start_load<Fut>(&self, entry: &mut CacheEntry, key: &QueryKey, loader: Fut) -> SharedLoad
    where
        Fut: Future<Output = Result<ApiResponse<Value>, ClientError>> + Send + 'static,
    {
        let cache = self.clone();
        let settle_key = key.clone();

        let load: SharedLoad = async move {
            let outcome = loader.await.map(Arc::new);
            cache.settle(&settle_key, outcome.clone());
            outcome
        }
        .boxed()
        .shared();

        debug!(key = %key, "starting load");
        entry.in_flight = Some(load.clone());
        entry.publish();

        // Keep the load running even if every attached caller drops.
        tokio::spawn(load.clone());

        load
    }

    fn settle(&self, key: &QueryKey, outcome: QueryOutcome) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };

        entry.in_flight = None;
        match outcome {
            Ok(data) => {
                entry.data = Some(data);
                entry.error = None;
                entry.fetched_at = Some(Instant::now());
            }
            Err(err) => {
                // Previous data stays available; only the error is updated.
                warn!(key = %key, error = %err, "load failed");
                entry.error = Some(err);
            }
        }
        entry.publish();
    }
}
