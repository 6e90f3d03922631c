//! Display formatting and aggregate-safe folds shared by the dashboard.

const DEFAULT_FRACTION_DIGITS: usize = 1;

/// Fold that treats absent values as zero; an empty input sums to `0.0`.
pub fn sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().sum()
}

/// Average over present values' positions; empty input averages to `0.0`,
/// never NaN.
pub fn average<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut total = 0.0;
    let mut count = 0usize;
    for value in values {
        total += value.unwrap_or(0.0);
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return min;
    }
    value.clamp(min, max)
}

pub fn format_bytes(bytes: f64) -> String {
    format_bytes_with(bytes, DEFAULT_FRACTION_DIGITS)
}

pub fn format_bytes_with(bytes: f64, fraction_digits: usize) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut value = bytes;
    let mut index = 0;
    while value >= 1024.0 && index < UNITS.len() - 1 {
        value /= 1024.0;
        index += 1;
    }

    format!("{:.prec$} {}", value, UNITS[index], prec = fraction_digits)
}

/// Millicore display, e.g. `512.0 mC`.
pub fn format_cpu(milli_cores: f64) -> String {
    format!("{:.prec$} mC", milli_cores, prec = DEFAULT_FRACTION_DIGITS)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.prec$}%", value, prec = DEFAULT_FRACTION_DIGITS)
}

pub fn format_currency(value: f64, currency: &str) -> String {
    format!("{value:.2} {currency}")
}
