//! Typed query parameters for the metrics endpoints.
//!
//! The struct enumerates exactly the parameters the backend recognizes;
//! anything else cannot be expressed, so unrecognized fields never leak
//! into a request or a cache key.

use serde::{Deserialize, Serialize};

use crate::api::http::DEFAULT_PAGE_SIZE;
use crate::core::util::date::default_date_range;

pub const DEFAULT_RANGE_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsQueryParams {
    /// ISO-8601, second precision. Absent means "no lower bound".
    pub start: Option<String>,
    /// ISO-8601, second precision. Absent means "no upper bound".
    pub end: Option<String>,
    pub limit: Option<u32>,
    /// `<field>:asc|desc`.
    pub sort: Option<String>,
    pub namespace: Option<String>,
    /// Repeated metric-name filter; empty means "all metrics".
    pub metric: Vec<String>,
}

impl MetricsQueryParams {
    /// The dashboard's defaults: last seven days, one page, sorted by CPU
    /// usage, cpu + memory series only.
    pub fn default_range() -> Self {
        let (start, end) = default_date_range(DEFAULT_RANGE_DAYS);
        Self {
            start: Some(start),
            end: Some(end),
            limit: Some(DEFAULT_PAGE_SIZE),
            sort: Some("cpu_usage_nano_cores:desc".to_string()),
            namespace: None,
            metric: vec!["cpu_usage".to_string(), "memory_usage".to_string()],
        }
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Pairs for the HTTP query string; `metric` repeats, absent fields
    /// are omitted entirely.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = &self.start {
            pairs.push(("start", start.clone()));
        }
        if let Some(end) = &self.end {
            pairs.push(("end", end.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        if let Some(namespace) = &self.namespace {
            pairs.push(("namespace", namespace.clone()));
        }
        for metric in &self.metric {
            pairs.push(("metric", metric.clone()));
        }
        pairs
    }

    /// Flat rendering used as a dependency value by query handles.
    pub fn dep_value(&self) -> String {
        let pairs = self.query_pairs();
        let mut out = String::new();
        for (idx, (name, value)) in pairs.iter().enumerate() {
            if idx > 0 {
                out.push('&');
            }
            out.push_str(name);
            out.push('=');
            out.push_str(value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_produce_no_pairs() {
        let params = MetricsQueryParams::default();
        assert!(params.query_pairs().is_empty());
        assert_eq!(params.dep_value(), "");
    }

    #[test]
    fn metric_filter_repeats() {
        let params = MetricsQueryParams {
            limit: Some(50),
            metric: vec!["cpu_usage".into(), "memory_usage".into()],
            ..Default::default()
        };
        assert_eq!(
            params.query_pairs(),
            vec![
                ("limit", "50".to_string()),
                ("metric", "cpu_usage".to_string()),
                ("metric", "memory_usage".to_string()),
            ]
        );
    }

    #[test]
    fn default_range_is_fully_populated() {
        let params = MetricsQueryParams::default_range();
        assert!(params.start.is_some());
        assert!(params.end.is_some());
        assert_eq!(params.limit, Some(DEFAULT_PAGE_SIZE));
        assert_eq!(params.sort.as_deref(), Some("cpu_usage_nano_cores:desc"));
    }
}
