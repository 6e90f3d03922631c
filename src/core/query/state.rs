//! Observable state of one cache entry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::api::dto::ApiResponse;
use crate::errors::ClientError;

/// Lifecycle of a cache entry. `Idle` means the key exists (someone
/// subscribed) but no load has started; `Error` means the latest settle
/// failed, regardless of whether older data is still available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Point-in-time view of a cache entry.
///
/// Distinguishes "never fetched" (`status == Idle`, no data, no error) from
/// "failed after a prior success" (`status == Error`, `data` still set).
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub status: QueryStatus,
    pub data: Option<Arc<ApiResponse<Value>>>,
    pub error: Option<ClientError>,
    pub fetched_at: Option<Instant>,
    pub is_fetching: bool,
}

impl QuerySnapshot {
    pub(crate) fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            fetched_at: None,
            is_fetching: false,
        }
    }

    /// True once any settle (success or failure) has been observed for the
    /// key. Consumers use this as the inverse of their loading flag.
    pub fn has_settled(&self) -> bool {
        self.data.is_some() || self.error.is_some()
    }

    /// Whether cached data is older than `stale_time`. A zero `stale_time`
    /// means data is stale the moment it lands.
    pub fn is_stale(&self, stale_time: Duration) -> bool {
        if self.data.is_none() {
            return true;
        }
        match self.fetched_at {
            Some(at) => at.elapsed() >= stale_time,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_snapshot_has_not_settled() {
        let snapshot = QuerySnapshot::idle();
        assert_eq!(snapshot.status, QueryStatus::Idle);
        assert!(!snapshot.has_settled());
        assert!(snapshot.is_stale(Duration::from_secs(60)));
    }

    #[test]
    fn fresh_data_is_not_stale() {
        let snapshot = QuerySnapshot {
            status: QueryStatus::Success,
            data: Some(Arc::new(ApiResponse::ok(serde_json::json!({})))),
            error: None,
            fetched_at: Some(Instant::now()),
            is_fetching: false,
        };
        assert!(!snapshot.is_stale(Duration::from_secs(60)));
        assert!(snapshot.is_stale(Duration::ZERO));
    }
}
