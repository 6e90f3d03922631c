//! View models produced by the transform stage.
//!
//! Display numerics are plain `f64`, defaulted to zero at the transform
//! boundary so formatting code never meets NaN or a missing value. The
//! only `Option` fields are those where "no data" means something
//! different from zero.

use serde::Serialize;

/// One table row of the summary panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetric {
    pub id: String,
    pub name: String,
    /// Millicores; converted from nanocore counters at the transform
    /// boundary.
    pub cpu_usage: f64,
    /// Bytes.
    pub memory_usage: f64,
    pub total_cost: f64,
}

/// One sampled point of the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendMetricPoint {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub cpu_millicores: Option<f64>,
    pub memory_bytes: Option<f64>,
    pub total_cost: Option<f64>,
}

/// One row of the efficiency table. Scores are percentages, 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyMetric {
    pub id: String,
    pub name: String,
    pub efficiency_score: f64,
    pub cpu_efficiency: f64,
    pub memory_efficiency: f64,
    pub cost_efficiency: f64,
    /// Absent when the backend could not compute a saving estimate;
    /// distinct from an estimate of zero.
    pub potential_savings: Option<f64>,
}
