//! Client library for the RustCost Core backend.
//!
//! The crate is the data layer of the dashboard: a typed REST client for
//! the `/api/v1` surface, a process-wide request cache with deduplication
//! and staleness semantics, per-consumer query handles, pure transformers
//! from raw payloads to view models, and the dashboard aggregator that
//! fans out the concurrent queries behind the overview page.

pub mod api;
pub mod core;
pub mod domain;
pub mod errors;

pub use crate::api::dto::ApiResponse;
pub use crate::api::http::ApiClient;
pub use crate::api::info::InfoClient;
pub use crate::api::metric::{MetricResource, MetricSeries, MetricsApi, MetricsClient};
pub use crate::api::system::SystemClient;
pub use crate::core::query::cache::{QueryCache, QueryOutcome};
pub use crate::core::query::handle::{loader, Loader, QueryHandle, QueryOptions};
pub use crate::core::query::key::{build_key, QueryKey};
pub use crate::core::query::state::{QuerySnapshot, QueryStatus};
pub use crate::domain::dashboard::{DashboardMetrics, DashboardSummary};
pub use crate::domain::metric::params::MetricsQueryParams;
pub use crate::errors::ClientError;
