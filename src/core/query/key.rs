//! Stable cache-key derivation.
//!
//! A key is `{resource}:{series}:{params}` where `params` is the parameter
//! set serialized with names sorted lexicographically and values
//! percent-encoded. Sorting makes the key independent of the order the
//! caller assembled the parameters in, so logically equal queries always
//! share one cache entry.

use std::fmt;

/// Opaque string identity for a cacheable request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the key for `(resource, series, params)`. Pure: identical
/// logical input yields an identical string across calls and consumers.
/// Absent parameters must simply not appear in `params`.
pub fn build_key(resource: &str, series: &str, params: &[(&str, String)]) -> QueryKey {
    let mut pairs: Vec<&(&str, String)> = params.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(&b.1)));

    let mut out = String::with_capacity(resource.len() + series.len() + 16 * pairs.len());
    out.push_str(resource);
    out.push(':');
    out.push_str(series);
    out.push(':');

    for (idx, (name, value)) in pairs.iter().enumerate() {
        if idx > 0 {
            out.push('&');
        }
        out.push_str(name);
        out.push('=');
        out.push_str(&urlencoding::encode(value));
    }

    QueryKey(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_does_not_change_the_key() {
        let a = build_key(
            "nodes",
            "raw",
            &[
                ("start", "2026-08-01T00:00:00".to_string()),
                ("limit", "50".to_string()),
                ("sort", "cpu_usage_nano_cores:desc".to_string()),
            ],
        );
        let b = build_key(
            "nodes",
            "raw",
            &[
                ("sort", "cpu_usage_nano_cores:desc".to_string()),
                ("start", "2026-08-01T00:00:00".to_string()),
                ("limit", "50".to_string()),
            ],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn absent_parameters_are_not_serialized() {
        let with_empty = build_key("nodes", "raw", &[]);
        assert_eq!(with_empty.as_str(), "nodes:raw:");
    }

    #[test]
    fn different_series_yield_different_keys() {
        let raw = build_key("nodes", "raw", &[]);
        let cost = build_key("nodes", "cost", &[]);
        assert_ne!(raw, cost);
    }

    #[test]
    fn values_are_percent_encoded() {
        let key = build_key(
            "pods",
            "raw",
            &[("namespace", "kube system".to_string())],
        );
        assert_eq!(key.as_str(), "pods:raw:namespace=kube%20system");
    }

    #[test]
    fn repeated_names_keep_a_stable_value_order() {
        let a = build_key(
            "nodes",
            "raw",
            &[
                ("metric", "memory_usage".to_string()),
                ("metric", "cpu_usage".to_string()),
            ],
        );
        let b = build_key(
            "nodes",
            "raw",
            &[
                ("metric", "cpu_usage".to_string()),
                ("metric", "memory_usage".to_string()),
            ],
        );
        assert_eq!(a, b);
    }
}
