//! Client for the `/api/v1/metrics/{resource}/...` endpoints.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;

use crate::api::dto::ApiResponse;
use crate::api::http::ApiClient;
use crate::core::query::handle::Loader;
use crate::core::query::key::{build_key, QueryKey};
use crate::domain::metric::params::MetricsQueryParams;
use crate::errors::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricResource {
    Nodes,
    Pods,
}

impl MetricResource {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricResource::Nodes => "nodes",
            MetricResource::Pods => "pods",
        }
    }
}

impl fmt::Display for MetricResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data series of a metrics resource, mapped onto the backend routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricSeries {
    Raw,
    RawSummary,
    RawEfficiency,
    Cost,
    CostSummary,
    CostTrend,
}

impl MetricSeries {
    /// Path suffix under `/metrics/{resource}`.
    pub fn path(self) -> &'static str {
        match self {
            MetricSeries::Raw => "/raw",
            MetricSeries::RawSummary => "/raw/summary",
            MetricSeries::RawEfficiency => "/raw/efficiency",
            MetricSeries::Cost => "/cost",
            MetricSeries::CostSummary => "/cost/summary",
            MetricSeries::CostTrend => "/cost/trend",
        }
    }

    /// Flat segment used inside cache keys.
    pub fn key_segment(self) -> &'static str {
        match self {
            MetricSeries::Raw => "raw",
            MetricSeries::RawSummary => "raw-summary",
            MetricSeries::RawEfficiency => "raw-efficiency",
            MetricSeries::Cost => "cost",
            MetricSeries::CostSummary => "cost-summary",
            MetricSeries::CostTrend => "cost-trend",
        }
    }
}

/// Cache key for one metrics query; every consumer of the same logical
/// query derives the same key.
pub fn metrics_query_key(
    resource: MetricResource,
    series: MetricSeries,
    params: &MetricsQueryParams,
) -> QueryKey {
    build_key(resource.as_str(), series.key_segment(), &params.query_pairs())
}

/// Seam between the query layer and the wire. Tests substitute their own
/// implementation; production uses [`MetricsClient`].
#[async_trait]
pub trait MetricsApi: Send + Sync {
    async fn fetch_series(
        &self,
        resource: MetricResource,
        series: MetricSeries,
        params: &MetricsQueryParams,
    ) -> Result<ApiResponse<Value>, ClientError>;
}

#[derive(Debug, Clone)]
pub struct MetricsClient {
    api: ApiClient,
}

impl MetricsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl MetricsApi for MetricsClient {
    async fn fetch_series(
        &self,
        resource: MetricResource,
        series: MetricSeries,
        params: &MetricsQueryParams,
    ) -> Result<ApiResponse<Value>, ClientError> {
        let path = format!("/metrics/{}{}", resource.as_str(), series.path());
        self.api.get_envelope(&path, &params.query_pairs()).await
    }
}

/// Loader bound to one `(resource, series, params)` triple, reused by
/// automatic fetches and refetches of the same handle.
pub fn series_loader(
    api: Arc<dyn MetricsApi>,
    resource: MetricResource,
    series: MetricSeries,
    params: MetricsQueryParams,
) -> Loader {
    Arc::new(move || {
        let api = api.clone();
        let params = params.clone();
        async move { api.fetch_series(resource, series, &params).await }.boxed()
    })
}
