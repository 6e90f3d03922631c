//! Per-consumer binding to one cache entry.
//!
//! A handle triggers the initial load on construction (and on dependency
//! changes), reads the entry through snapshots, and exposes the imperative
//! `refetch`. Dropping a handle drops its subscription but never cancels
//! an in-flight load; other consumers of the key may still be waiting on
//! it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use tokio::sync::watch;

use crate::api::dto::ApiResponse;
use crate::core::query::cache::{QueryCache, QueryOutcome};
use crate::core::query::key::QueryKey;
use crate::core::query::state::QuerySnapshot;
use crate::errors::ClientError;

pub type LoaderFuture = BoxFuture<'static, Result<ApiResponse<Value>, ClientError>>;

/// Reusable loader: invoked once per actual network call, shared by
/// automatic fetches and imperative refetches alike.
pub type Loader = Arc<dyn Fn() -> LoaderFuture + Send + Sync>;

/// Wraps a plain async closure into a [`Loader`].
pub fn loader<F, Fut>(f: F) -> Loader
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiResponse<Value>, ClientError>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Age under which cached data is served without a network call.
    /// Zero means every fetch reloads.
    pub stale_time: Duration,
    /// Ordered primitive values; a shallow change forces a new fetch.
    pub deps: Vec<String>,
    /// Gate for automatic fetches. Imperative `refetch` ignores it.
    pub enabled: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            deps: Vec::new(),
            enabled: true,
        }
    }
}

impl QueryOptions {
    pub fn with_stale_time(stale_time: Duration) -> Self {
        Self {
            stale_time,
            ..Self::default()
        }
    }
}

pub struct QueryHandle {
    cache: QueryCache,
    key: QueryKey,
    loader: Loader,
    stale_time: Duration,
    deps: Vec<String>,
    enabled: bool,
    rx: watch::Receiver<QuerySnapshot>,
}

impl QueryHandle {
    /// Binds a consumer to `key` and, unless disabled, triggers the first
    /// fetch in the background. Must be called within a tokio runtime.
    pub fn new(cache: QueryCache, key: QueryKey, loader: Loader, options: QueryOptions) -> Self {
        let rx = cache.subscribe(&key);
        let handle = Self {
            cache,
            key,
            loader,
            stale_time: options.stale_time,
            deps: options.deps,
            enabled: options.enabled,
            rx,
        };
        if handle.enabled {
            handle.spawn_fetch();
        }
        handle
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn snapshot(&self) -> QuerySnapshot {
        self.cache
            .read(&self.key)
            .unwrap_or_else(QuerySnapshot::idle)
    }

    /// Latest known envelope for the key, fresh or stale.
    pub fn data(&self) -> Option<Arc<ApiResponse<Value>>> {
        self.snapshot().data
    }

    /// Transport/decode failure if the last load failed, otherwise the
    /// logical failure carried by the latest envelope, if any.
    pub fn error(&self) -> Option<ClientError> {
        let snapshot = self.snapshot();
        if let Some(err) = snapshot.error {
            return Some(err);
        }
        snapshot.data.as_deref().and_then(ApiResponse::logical_error)
    }

    /// True until the key settles for the first time, even when the settle
    /// comes straight from cache.
    pub fn is_loading(&self) -> bool {
        !self.snapshot().has_settled()
    }

    pub fn is_fetching(&self) -> bool {
        self.snapshot().is_fetching
    }

    /// Awaits the staleness-respecting fetch for this key: resolves from
    /// cache when fresh, attaches to an in-flight load, or loads.
    pub async fn ready(&self) -> QueryOutcome {
        let loader = self.loader.clone();
        self.cache
            .fetch(&self.key, move || loader(), self.stale_time)
            .await
    }

    /// Forces a reload regardless of freshness, attaching to an in-flight
    /// load if one exists. Resolves when the load settles.
    pub async fn refetch(&self) -> QueryOutcome {
        let loader = self.loader.clone();
        self.cache.force_refetch(&self.key, move || loader()).await
    }

    /// Shallow comparison; a change triggers a new automatic fetch.
    pub fn update_deps(&mut self, deps: Vec<String>) {
        if self.deps == deps {
            return;
        }
        self.deps = deps;
        if self.enabled {
            self.spawn_fetch();
        }
    }

    /// Enabling a previously disabled handle triggers the initial fetch.
    pub fn set_enabled(&mut self, enabled: bool) {
        let was_enabled = self.enabled;
        self.enabled = enabled;
        if enabled && !was_enabled {
            self.spawn_fetch();
        }
    }

    /// Fire-and-forget variant of [`refetch`](Self::refetch) for fan-out
    /// callers that do not want to await completion.
    pub fn spawn_refetch(&self) {
        let cache = self.cache.clone();
        let key = self.key.clone();
        let loader = self.loader.clone();
        tokio::spawn(async move {
            let _ = cache.force_refetch(&key, move || loader()).await;
        });
    }

    /// Resolves when the entry publishes its next snapshot.
    pub async fn changed(&mut self) {
        // The sender lives in the cache entry, which is never dropped
        // while the cache is alive.
        self.rx.changed().await.ok();
    }

    /// An independent subscription to this key's snapshots.
    pub fn watch(&self) -> watch::Receiver<QuerySnapshot> {
        self.rx.clone()
    }

    fn spawn_fetch(&self) {
        let cache = self.cache.clone();
        let key = self.key.clone();
        let loader = self.loader.clone();
        let stale_time = self.stale_time;
        tokio::spawn(async move {
            // Failures are stored on the entry; nothing to do here.
            let _ = cache.fetch(&key, move || loader(), stale_time).await;
        });
    }
}
