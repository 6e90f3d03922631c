//! Wire DTOs for the `/api/v1/metrics/*` endpoints.
//!
//! Field names mirror what RustCost Core serializes. Everything is
//! `#[serde(default)]`-lenient: a missing or extra field on the wire must
//! never fail the decode of an otherwise usable payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw metric series response (`/metrics/{resource}/raw`, `/cost`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricGetResponse {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub granularity: Option<String>,
    #[serde(default)]
    pub series: Vec<MetricSeriesData>,
}

/// One series per node / pod; `key` is the member name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricSeriesData {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub points: Vec<MetricPoint>,
    #[serde(default)]
    pub running_hours: Option<f64>,
    #[serde(default)]
    pub cost_summary: Option<CostMetric>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricPoint {
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cpu_memory: CommonMetricValues,
    #[serde(default)]
    pub filesystem: Option<FilesystemMetric>,
    #[serde(default)]
    pub network: Option<NetworkMetric>,
    #[serde(default)]
    pub cost: Option<CostMetric>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommonMetricValues {
    #[serde(default)]
    pub cpu_usage_nano_cores: Option<f64>,
    #[serde(default)]
    pub cpu_usage_core_nano_seconds: Option<f64>,
    #[serde(default)]
    pub memory_usage_bytes: Option<f64>,
    #[serde(default)]
    pub memory_working_set_bytes: Option<f64>,
    #[serde(default)]
    pub memory_rss_bytes: Option<f64>,
    #[serde(default)]
    pub memory_page_faults: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilesystemMetric {
    #[serde(default)]
    pub used_bytes: Option<f64>,
    #[serde(default)]
    pub capacity_bytes: Option<f64>,
    #[serde(default)]
    pub inodes_used: Option<f64>,
    #[serde(default)]
    pub inodes: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NetworkMetric {
    #[serde(default)]
    pub rx_bytes: Option<f64>,
    #[serde(default)]
    pub tx_bytes: Option<f64>,
    #[serde(default)]
    pub rx_errors: Option<f64>,
    #[serde(default)]
    pub tx_errors: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CostMetric {
    #[serde(default)]
    pub total_cost_usd: Option<f64>,
    #[serde(default)]
    pub cpu_cost_usd: Option<f64>,
    #[serde(default)]
    pub memory_cost_usd: Option<f64>,
    #[serde(default)]
    pub storage_cost_usd: Option<f64>,
}

/// Response of `/metrics/{resource}/raw/summary`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricRawSummaryResponse {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub granularity: Option<String>,
    #[serde(default)]
    pub summary: MetricRawSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricRawSummary {
    #[serde(default)]
    pub avg_cpu_cores: f64,
    #[serde(default)]
    pub max_cpu_cores: f64,
    #[serde(default)]
    pub avg_memory_gb: f64,
    #[serde(default)]
    pub max_memory_gb: f64,
    #[serde(default)]
    pub avg_storage_gb: f64,
    #[serde(default)]
    pub max_storage_gb: f64,
    #[serde(default)]
    pub avg_network_gb: f64,
    #[serde(default)]
    pub max_network_gb: f64,
    #[serde(default)]
    pub node_count: usize,
}

/// Response of `/metrics/{resource}/raw/efficiency`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricRawEfficiencyResponse {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub granularity: Option<String>,
    #[serde(default)]
    pub efficiency: MetricRawEfficiency,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricRawEfficiency {
    #[serde(default)]
    pub cpu_efficiency: f64,
    #[serde(default)]
    pub memory_efficiency: f64,
    #[serde(default)]
    pub storage_efficiency: f64,
    #[serde(default)]
    pub overall_efficiency: f64,
    #[serde(default)]
    pub total_cpu_allocatable_cores: f64,
    #[serde(default)]
    pub total_memory_allocatable_gb: f64,
    #[serde(default)]
    pub total_storage_allocatable_gb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_sparse_series_payload() {
        let raw = json!({
            "granularity": "hour",
            "series": [{
                "key": "node-a",
                "points": [{
                    "time": "2026-08-01T00:00:00Z",
                    "cpu_memory": { "cpu_usage_nano_cores": 500_000_000.0 },
                    "cost": { "total_cost_usd": 1.25 },
                    "unknown_field": true
                }]
            }]
        });

        let decoded: MetricGetResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(decoded.series.len(), 1);
        let point = &decoded.series[0].points[0];
        assert_eq!(point.cpu_memory.cpu_usage_nano_cores, Some(500_000_000.0));
        assert_eq!(point.cpu_memory.memory_usage_bytes, None);
        assert_eq!(point.cost.as_ref().unwrap().total_cost_usd, Some(1.25));
    }

    #[test]
    fn decodes_empty_object_as_defaults() {
        let decoded: MetricRawSummaryResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(decoded.summary.node_count, 0);
        assert_eq!(decoded.summary.avg_cpu_cores, 0.0);
    }
}
