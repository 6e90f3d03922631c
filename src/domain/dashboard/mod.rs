//! Dashboard aggregator.
//!
//! Composes the five queries behind the overview page (raw node metrics,
//! node usage summary, node efficiency, node cost, raw pod metrics) into
//! one derived summary with unified loading and error flags. The
//! aggregator never fetches by itself: each constituent is an ordinary
//! query handle over the shared cache, so two dashboards on one cache
//! still produce one network call per series.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::api::dto::metrics_dto::{
    MetricGetResponse, MetricRawEfficiency, MetricRawEfficiencyResponse, MetricRawSummary,
    MetricRawSummaryResponse,
};
use crate::api::metric::{
    metrics_query_key, series_loader, MetricResource, MetricSeries, MetricsApi,
};
use crate::core::query::cache::QueryCache;
use crate::core::query::handle::{QueryHandle, QueryOptions};
use crate::core::util::format::{average, sum};
use crate::domain::metric::model::{EfficiencyMetric, SummaryMetric, TrendMetricPoint};
use crate::domain::metric::params::MetricsQueryParams;
use crate::domain::metric::transformers::{
    to_efficiency_metrics, to_summary_metrics, to_trend_metrics,
};
use crate::errors::ClientError;

/// Default revalidation window for dashboard panels.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);

const DEFAULT_PODS_SORT: &str = "efficiency_score:desc";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardNodesSummary {
    pub data: Vec<SummaryMetric>,
    pub usage: Option<MetricRawSummary>,
    pub efficiency: Option<MetricRawEfficiency>,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardPodsSummary {
    pub data: Vec<SummaryMetric>,
    /// Average efficiency score across pod rows; `0.0` when empty.
    pub efficiency: f64,
    pub cost: f64,
}

/// Derived view over the latest settled data of every source. Recomputed
/// on read, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub nodes: DashboardNodesSummary,
    pub pods: DashboardPodsSummary,
}

pub struct DashboardMetrics {
    cache: QueryCache,
    api: Arc<dyn MetricsApi>,
    params: MetricsQueryParams,
    stale_time: Duration,
    nodes_raw: QueryHandle,
    pods_raw: QueryHandle,
    nodes_usage: QueryHandle,
    nodes_efficiency: QueryHandle,
    nodes_cost: QueryHandle,
}

impl DashboardMetrics {
    pub fn new(cache: QueryCache, api: Arc<dyn MetricsApi>, params: MetricsQueryParams) -> Self {
        Self::with_stale_time(cache, api, params, DEFAULT_STALE_TIME)
    }

    pub fn with_stale_time(
        cache: QueryCache,
        api: Arc<dyn MetricsApi>,
        params: MetricsQueryParams,
        stale_time: Duration,
    ) -> Self {
        let pods_params = pods_params(&params);

        let nodes_raw = series_handle(
            &cache,
            &api,
            MetricResource::Nodes,
            MetricSeries::Raw,
            &params,
            stale_time,
        );
        let pods_raw = series_handle(
            &cache,
            &api,
            MetricResource::Pods,
            MetricSeries::Raw,
            &pods_params,
            stale_time,
        );
        let nodes_usage = series_handle(
            &cache,
            &api,
            MetricResource::Nodes,
            MetricSeries::RawSummary,
            &params,
            stale_time,
        );
        let nodes_efficiency = series_handle(
            &cache,
            &api,
            MetricResource::Nodes,
            MetricSeries::RawEfficiency,
            &params,
            stale_time,
        );
        let nodes_cost = series_handle(
            &cache,
            &api,
            MetricResource::Nodes,
            MetricSeries::Cost,
            &params,
            stale_time,
        );

        Self {
            cache,
            api,
            params,
            stale_time,
            nodes_raw,
            pods_raw,
            nodes_usage,
            nodes_efficiency,
            nodes_cost,
        }
    }

    pub fn params(&self) -> &MetricsQueryParams {
        &self.params
    }

    /// Replaces the parameter set; every constituent is rebound to its new
    /// key and refetched as needed.
    pub fn set_params(&mut self, params: MetricsQueryParams) {
        if self.params == params {
            return;
        }
        *self = Self::with_stale_time(
            self.cache.clone(),
            self.api.clone(),
            params,
            self.stale_time,
        );
    }

    fn handles(&self) -> [&QueryHandle; 5] {
        [
            &self.nodes_raw,
            &self.pods_raw,
            &self.nodes_usage,
            &self.nodes_efficiency,
            &self.nodes_cost,
        ]
    }

    /// True until every source has settled at least once, and again while
    /// a forced refetch round is outstanding for any source.
    pub fn is_loading(&self) -> bool {
        self.handles()
            .iter()
            .any(|handle| handle.is_loading() || handle.is_fetching())
    }

    /// First error along the node path, if any. Node cost is the primary
    /// dashboard signal, so node errors take precedence in `error()`.
    pub fn nodes_error(&self) -> Option<ClientError> {
        self.nodes_raw
            .error()
            .or_else(|| self.nodes_usage.error())
            .or_else(|| self.nodes_efficiency.error())
            .or_else(|| self.nodes_cost.error())
    }

    pub fn pods_error(&self) -> Option<ClientError> {
        self.pods_raw.error()
    }

    pub fn error(&self) -> Option<ClientError> {
        self.nodes_error().or_else(|| self.pods_error())
    }

    pub fn nodes_summary(&self) -> Vec<SummaryMetric> {
        to_summary_metrics(self.payload(&self.nodes_raw).as_ref())
    }

    pub fn pods_summary(&self) -> Vec<SummaryMetric> {
        to_summary_metrics(self.payload(&self.pods_raw).as_ref())
    }

    pub fn trends(&self) -> Vec<TrendMetricPoint> {
        to_trend_metrics(self.payload(&self.nodes_raw).as_ref())
    }

    pub fn efficiency(&self) -> Vec<EfficiencyMetric> {
        to_efficiency_metrics(self.payload(&self.pods_raw).as_ref())
    }

    /// Derives the summary from whatever has settled so far. Sources that
    /// have not settled (or failed without prior data) contribute empty
    /// sections, so partial data still renders.
    pub fn summary(&self) -> DashboardSummary {
        let nodes_data = self.nodes_summary();
        let pods_data = self.pods_summary();
        let efficiency_rows = self.efficiency();

        let usage = self
            .decode_payload::<MetricRawSummaryResponse>(&self.nodes_usage)
            .map(|response| response.summary);
        let node_efficiency = self
            .decode_payload::<MetricRawEfficiencyResponse>(&self.nodes_efficiency)
            .map(|response| response.efficiency);
        let total_cost = self
            .decode_payload::<MetricGetResponse>(&self.nodes_cost)
            .map(|response| latest_total_cost(&response))
            .unwrap_or(0.0);

        let pod_efficiency = average(
            efficiency_rows
                .iter()
                .map(|row| Some(row.efficiency_score)),
        );
        let pod_cost = sum(pods_data.iter().map(|row| Some(row.total_cost)));

        DashboardSummary {
            nodes: DashboardNodesSummary {
                data: nodes_data,
                usage,
                efficiency: node_efficiency,
                total_cost,
            },
            pods: DashboardPodsSummary {
                data: pods_data,
                efficiency: pod_efficiency,
                cost: pod_cost,
            },
        }
    }

    /// Fans a forced refetch out to every constituent and returns
    /// immediately. Callers that need completion await [`ready`](Self::ready)
    /// or the individual handles.
    pub fn refetch_all(&self) {
        debug!("refetching all dashboard sources");
        for handle in self.handles() {
            handle.spawn_refetch();
        }
    }

    /// Awaits the current settle of every constituent. Per-source failures
    /// stay on the handles; inspect them via the error accessors.
    pub async fn ready(&self) {
        let _ = futures::join!(
            self.nodes_raw.ready(),
            self.pods_raw.ready(),
            self.nodes_usage.ready(),
            self.nodes_efficiency.ready(),
            self.nodes_cost.ready(),
        );
    }

    fn payload(&self, handle: &QueryHandle) -> Option<Value> {
        handle
            .data()
            .and_then(|envelope| envelope.payload().cloned())
    }

    fn decode_payload<T: DeserializeOwned>(&self, handle: &QueryHandle) -> Option<T> {
        let value = self.payload(handle)?;
        serde_json::from_value(value).ok()
    }
}

fn pods_params(params: &MetricsQueryParams) -> MetricsQueryParams {
    let mut pods = params.clone();
    if pods.sort.is_none() {
        pods.sort = Some(DEFAULT_PODS_SORT.to_string());
    }
    pods
}

fn series_handle(
    cache: &QueryCache,
    api: &Arc<dyn MetricsApi>,
    resource: MetricResource,
    series: MetricSeries,
    params: &MetricsQueryParams,
    stale_time: Duration,
) -> QueryHandle {
    QueryHandle::new(
        cache.clone(),
        metrics_query_key(resource, series, params),
        series_loader(api.clone(), resource, series, params.clone()),
        QueryOptions {
            stale_time,
            deps: vec![params.dep_value()],
            enabled: true,
        },
    )
}

/// Latest-point cost per series, summed. Empty input folds to zero.
fn latest_total_cost(response: &MetricGetResponse) -> f64 {
    response
        .series
        .iter()
        .filter_map(|series| series.points.last())
        .filter_map(|point| point.cost.as_ref())
        .filter_map(|cost| cost.total_cost_usd)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::ApiResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::time::sleep;

    type SeriesKey = (MetricResource, MetricSeries);

    #[derive(Default)]
    struct MockMetricsApi {
        responses: Mutex<HashMap<SeriesKey, Result<ApiResponse<Value>, ClientError>>>,
        calls: Mutex<HashMap<SeriesKey, usize>>,
        delay: Option<Duration>,
    }

    impl MockMetricsApi {
        fn respond(&self, resource: MetricResource, series: MetricSeries, envelope: ApiResponse<Value>) {
            self.responses
                .lock()
                .unwrap()
                .insert((resource, series), Ok(envelope));
        }

        fn calls_for(&self, resource: MetricResource, series: MetricSeries) -> usize {
            *self
                .calls
                .lock()
                .unwrap()
                .get(&(resource, series))
                .unwrap_or(&0)
        }
    }

    #[async_trait]
    impl MetricsApi for MockMetricsApi {
        async fn fetch_series(
            &self,
            resource: MetricResource,
            series: MetricSeries,
            _params: &MetricsQueryParams,
        ) -> Result<ApiResponse<Value>, ClientError> {
            *self
                .calls
                .lock()
                .unwrap()
                .entry((resource, series))
                .or_insert(0) += 1;
            if let Some(delay) = self.delay {
                sleep(delay).await;
            }
            self.responses
                .lock()
                .unwrap()
                .get(&(resource, series))
                .cloned()
                .unwrap_or_else(|| Ok(ApiResponse::ok(json!({}))))
        }
    }

    fn node_summary_envelope() -> ApiResponse<Value> {
        ApiResponse::ok(json!({
            "summary": [{
                "id": "n1",
                "cpuUsage": 500,
                "memoryUsage": 2_147_483_648u64,
                "totalCost": 12.5
            }]
        }))
    }

    #[tokio::test]
    async fn node_summary_propagates_to_the_dashboard() {
        let api = Arc::new(MockMetricsApi::default());
        api.respond(MetricResource::Nodes, MetricSeries::Raw, node_summary_envelope());
        api.respond(
            MetricResource::Nodes,
            MetricSeries::Cost,
            ApiResponse::ok(json!({
                "series": [{
                    "key": "n1",
                    "points": [
                        { "time": "2026-08-01T00:00:00Z", "cost": { "total_cost_usd": 5.0 } },
                        { "time": "2026-08-01T01:00:00Z", "cost": { "total_cost_usd": 7.5 } }
                    ]
                }]
            })),
        );

        let dashboard = DashboardMetrics::new(
            QueryCache::new(),
            api.clone(),
            MetricsQueryParams::default(),
        );

        assert!(dashboard.is_loading());
        dashboard.ready().await;
        assert!(!dashboard.is_loading());
        assert!(dashboard.error().is_none());

        let summary = dashboard.summary();
        assert_eq!(summary.nodes.data.len(), 1);
        assert_eq!(summary.nodes.data[0].cpu_usage, 500.0);
        assert_eq!(summary.nodes.data[0].total_cost, 12.5);
        // Latest cost point per series.
        assert_eq!(summary.nodes.total_cost, 7.5);
    }

    #[tokio::test]
    async fn pod_failure_leaves_node_data_intact() {
        let api = Arc::new(MockMetricsApi::default());
        api.respond(MetricResource::Nodes, MetricSeries::Raw, node_summary_envelope());
        api.respond(
            MetricResource::Pods,
            MetricSeries::Raw,
            ApiResponse::error("UPSTREAM", "upstream timeout"),
        );

        let dashboard = DashboardMetrics::new(
            QueryCache::new(),
            api.clone(),
            MetricsQueryParams::default(),
        );
        dashboard.ready().await;

        assert!(dashboard.nodes_error().is_none());
        let pods_error = dashboard.pods_error().expect("pod error expected");
        assert_eq!(
            pods_error,
            ClientError::Api {
                code: Some("UPSTREAM".into()),
                message: "upstream timeout".into()
            }
        );
        // Precedence: no node error, so the pod error surfaces.
        assert_eq!(dashboard.error(), Some(pods_error));

        // Node data still renders.
        assert_eq!(dashboard.nodes_summary().len(), 1);
        assert!(dashboard.pods_summary().is_empty());
    }

    #[tokio::test]
    async fn node_errors_take_precedence() {
        let api = Arc::new(MockMetricsApi::default());
        api.responses.lock().unwrap().insert(
            (MetricResource::Nodes, MetricSeries::Cost),
            Err(ClientError::Transport("connection refused".into())),
        );
        api.respond(
            MetricResource::Pods,
            MetricSeries::Raw,
            ApiResponse::error("UPSTREAM", "upstream timeout"),
        );

        let dashboard = DashboardMetrics::new(
            QueryCache::new(),
            api.clone(),
            MetricsQueryParams::default(),
        );
        dashboard.ready().await;

        assert_eq!(
            dashboard.error(),
            Some(ClientError::Transport("connection refused".into()))
        );
        assert!(dashboard.pods_error().is_some());
    }

    #[tokio::test]
    async fn two_dashboards_share_one_call_per_series() {
        let api = Arc::new(MockMetricsApi::default());
        let cache = QueryCache::new();

        let first = DashboardMetrics::new(
            cache.clone(),
            api.clone(),
            MetricsQueryParams::default(),
        );
        let second = DashboardMetrics::new(
            cache.clone(),
            api.clone(),
            MetricsQueryParams::default(),
        );

        first.ready().await;
        second.ready().await;

        for (resource, series) in [
            (MetricResource::Nodes, MetricSeries::Raw),
            (MetricResource::Pods, MetricSeries::Raw),
            (MetricResource::Nodes, MetricSeries::RawSummary),
            (MetricResource::Nodes, MetricSeries::RawEfficiency),
            (MetricResource::Nodes, MetricSeries::Cost),
        ] {
            assert_eq!(api.calls_for(resource, series), 1, "{resource} {series:?}");
        }
    }

    #[tokio::test]
    async fn refetch_all_reloads_every_source() {
        let api = Arc::new(MockMetricsApi {
            delay: Some(Duration::from_millis(10)),
            ..Default::default()
        });
        let dashboard = DashboardMetrics::new(
            QueryCache::new(),
            api.clone(),
            MetricsQueryParams::default(),
        );
        dashboard.ready().await;
        assert!(!dashboard.is_loading());

        dashboard.refetch_all();
        sleep(Duration::from_millis(1)).await;
        assert!(dashboard.is_loading(), "forced round should be visible");

        sleep(Duration::from_millis(50)).await;
        assert!(!dashboard.is_loading());
        assert_eq!(api.calls_for(MetricResource::Nodes, MetricSeries::Raw), 2);
        assert_eq!(api.calls_for(MetricResource::Pods, MetricSeries::Raw), 2);
        assert_eq!(api.calls_for(MetricResource::Nodes, MetricSeries::Cost), 2);
    }

    #[tokio::test]
    async fn param_change_rebinds_every_source() {
        let api = Arc::new(MockMetricsApi::default());
        let mut dashboard = DashboardMetrics::new(
            QueryCache::new(),
            api.clone(),
            MetricsQueryParams::default(),
        );
        dashboard.ready().await;
        assert_eq!(api.calls_for(MetricResource::Nodes, MetricSeries::Raw), 1);

        dashboard.set_params(MetricsQueryParams {
            namespace: Some("payments".into()),
            ..Default::default()
        });
        dashboard.ready().await;
        assert_eq!(api.calls_for(MetricResource::Nodes, MetricSeries::Raw), 2);
    }

    #[tokio::test]
    async fn empty_sources_fold_to_zero() {
        let api = Arc::new(MockMetricsApi::default());
        let dashboard = DashboardMetrics::new(
            QueryCache::new(),
            api.clone(),
            MetricsQueryParams::default(),
        );
        dashboard.ready().await;

        let summary = dashboard.summary();
        assert_eq!(summary.nodes.total_cost, 0.0);
        assert_eq!(summary.pods.efficiency, 0.0);
        assert_eq!(summary.pods.cost, 0.0);
        assert!(summary.nodes.data.is_empty());
    }
}
