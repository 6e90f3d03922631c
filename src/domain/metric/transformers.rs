//! Pure transforms from raw backend payloads to view models.
//!
//! Every function here accepts whatever the wire produced, including
//! nothing at all, and answers with a (possibly empty) list. A malformed
//! series must never take down unrelated dashboard panels, so there is no
//! error path: unknown shapes degrade to empty output, unknown fields are
//! ignored.
//!
//! Unit conversion happens here exactly once. Backend counters arrive in
//! nanocores and bytes (snake_case); already-normalized dashboard payloads
//! carry millicores and percentages (camelCase). No other layer repeats
//! the conversion.

use serde_json::Value;

use crate::core::util::format::clamp;
use crate::domain::metric::model::{EfficiencyMetric, SummaryMetric, TrendMetricPoint};

const NANO_PER_MILLI: f64 = 1_000_000.0;

fn number(item: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| item.get(*key).and_then(Value::as_f64))
}

fn string(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Millicores from either an already-normalized field or a nanocore
/// counter.
fn milli_cores(item: &Value) -> Option<f64> {
    number(item, &["cpuUsage", "cpu_usage_milli_cores", "cpu_millicores"])
        .or_else(|| number(item, &["cpu_usage_nano_cores"]).map(|nano| nano / NANO_PER_MILLI))
}

fn memory_bytes(item: &Value) -> Option<f64> {
    number(
        item,
        &["memoryUsage", "memory_usage_bytes", "memory_bytes"],
    )
}

fn total_cost(item: &Value) -> Option<f64> {
    number(item, &["totalCost", "total_cost_usd", "total_cost"])
}

/// Percentage from either a percent-valued dashboard field or a 0..=1
/// backend fraction.
fn percent(item: &Value, percent_keys: &[&str], fraction_keys: &[&str]) -> Option<f64> {
    number(item, percent_keys)
        .or_else(|| number(item, fraction_keys).map(|fraction| fraction * 100.0))
        .map(|value| clamp(value, 0.0, 100.0))
}

fn identity(item: &Value) -> Option<(String, String)> {
    let id = string(item, &["id", "key", "name"])?;
    let name = string(item, &["name", "id", "key"]).unwrap_or_else(|| id.clone());
    Some((id, name))
}

fn latest_point(series: &Value) -> Option<&Value> {
    series.get("points")?.as_array()?.last()
}

fn summary_from_flat(item: &Value) -> Option<SummaryMetric> {
    let (id, name) = identity(item)?;
    Some(SummaryMetric {
        id,
        name,
        cpu_usage: milli_cores(item).unwrap_or(0.0),
        memory_usage: memory_bytes(item).unwrap_or(0.0),
        total_cost: total_cost(item).unwrap_or(0.0),
    })
}

fn summary_from_series(series: &Value) -> Option<SummaryMetric> {
    let key = series.get("key")?.as_str()?.to_string();
    let point = latest_point(series);

    let cpu = point
        .and_then(|p| p.get("cpu_memory"))
        .and_then(milli_cores)
        .unwrap_or(0.0);
    let memory = point
        .and_then(|p| p.get("cpu_memory"))
        .and_then(memory_bytes)
        .unwrap_or(0.0);
    let cost = series
        .get("cost_summary")
        .and_then(total_cost)
        .or_else(|| point.and_then(|p| p.get("cost")).and_then(total_cost))
        .unwrap_or(0.0);

    Some(SummaryMetric {
        id: key.clone(),
        name: key,
        cpu_usage: cpu,
        memory_usage: memory,
        total_cost: cost,
    })
}

/// Summary table rows. Accepts a flattened `summary` array or the raw
/// `series` shape; anything else is empty.
pub fn to_summary_metrics(raw: Option<&Value>) -> Vec<SummaryMetric> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    if let Some(items) = raw.get("summary").and_then(Value::as_array) {
        return items.iter().filter_map(summary_from_flat).collect();
    }

    if let Some(series) = raw.get("series").and_then(Value::as_array) {
        return series.iter().filter_map(summary_from_series).collect();
    }

    Vec::new()
}

fn trend_from_flat(item: &Value) -> Option<TrendMetricPoint> {
    let timestamp = string(item, &["timestamp", "time"])?;
    Some(TrendMetricPoint {
        timestamp,
        cpu_millicores: milli_cores(item),
        memory_bytes: memory_bytes(item),
        total_cost: total_cost(item),
    })
}

fn trend_from_point(point: &Value) -> Option<TrendMetricPoint> {
    let timestamp = string(point, &["time", "timestamp"])?;
    let values = point.get("cpu_memory").unwrap_or(point);
    Some(TrendMetricPoint {
        timestamp,
        cpu_millicores: milli_cores(values),
        memory_bytes: memory_bytes(values),
        total_cost: point.get("cost").and_then(total_cost),
    })
}

/// Chronologically sorted chart points from a flattened `trends` array or
/// the raw `series` shape.
pub fn to_trend_metrics(raw: Option<&Value>) -> Vec<TrendMetricPoint> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let mut points: Vec<TrendMetricPoint> =
        if let Some(items) = raw.get("trends").and_then(Value::as_array) {
            items.iter().filter_map(trend_from_flat).collect()
        } else if let Some(series) = raw.get("series").and_then(Value::as_array) {
            series
                .iter()
                .filter_map(|s| s.get("points").and_then(Value::as_array))
                .flatten()
                .filter_map(trend_from_point)
                .collect()
        } else {
            Vec::new()
        };

    // RFC 3339 timestamps sort correctly as strings.
    points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    points
}

fn efficiency_from_item(item: &Value, fallback_id: Option<&str>) -> Option<EfficiencyMetric> {
    let (id, name) = identity(item).or_else(|| {
        fallback_id.map(|id| (id.to_string(), id.to_string()))
    })?;

    Some(EfficiencyMetric {
        id,
        name,
        efficiency_score: percent(
            item,
            &["efficiencyScore"],
            &["efficiency_score", "overall_efficiency"],
        )
        .unwrap_or(0.0),
        cpu_efficiency: percent(item, &["cpuEfficiency"], &["cpu_efficiency"]).unwrap_or(0.0),
        memory_efficiency: percent(item, &["memoryEfficiency"], &["memory_efficiency"])
            .unwrap_or(0.0),
        cost_efficiency: percent(item, &["costEfficiency"], &["cost_efficiency"]).unwrap_or(0.0),
        potential_savings: number(
            item,
            &["potentialSavings", "potential_savings", "potential_savings_usd"],
        ),
    })
}

/// Efficiency table rows. A per-entity array maps row by row; the
/// backend's single cluster-wide efficiency object becomes one row.
pub fn to_efficiency_metrics(raw: Option<&Value>) -> Vec<EfficiencyMetric> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match raw.get("efficiency") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| efficiency_from_item(item, None))
            .collect(),
        Some(item @ Value::Object(_)) => efficiency_from_item(item, Some("cluster"))
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}
