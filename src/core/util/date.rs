//! Date helpers for query parameter defaults.

use chrono::{DateTime, Duration, Utc};

const ISO_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// Second-precision ISO-8601 rendering, the format the metrics endpoints
/// accept for `start` / `end`.
pub fn to_iso_date_time(value: DateTime<Utc>) -> String {
    value.format(ISO_SECONDS).to_string()
}

pub fn to_iso_date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// The dashboard's default window: the last `days` days, ending now.
pub fn default_date_range(days: i64) -> (String, String) {
    let end = Utc::now();
    let start = end - Duration::days(days);
    (to_iso_date_time(start), to_iso_date_time(end))
}
