//! Utility functions for sample averaging and formatting
use serde_json::Value;
use time::{format_description, OffsetDateTime};

use crate::models::Sample;

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    match format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]") {
        Ok(format) => dt.format(&format).unwrap_or_else(|_| dt.to_string()),
        Err(_) => dt.to_string(),
    }
}

/// Round to `digits` decimals, ties to even
///
/// Rounds the exact decimal value of the float, so 0.15 (stored as
/// 0.1499999...) goes down while an exact tie such as 45.25 goes to 45.2.
pub fn round_half_even(value: f64, digits: usize) -> f64 {
    format!("{:.*}", digits, value)
        .parse()
        .unwrap_or(value)
}

/// Mean of one field across a sample batch
///
/// Samples missing the field, or carrying a non-numeric value, count as 0.0
/// and stay in the denominator. Returns 0.0 for an empty batch.
pub fn average_field(samples: &[Sample], field: &str) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: f64 = samples
        .iter()
        .map(|s| s.get(field).and_then(Value::as_f64).unwrap_or(0.0))
        .sum();

    round_half_even(sum / samples.len() as f64, 1)
}

fn whole(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Integer held by a JSON number or numeric string
///
/// Floats are accepted only when they have no fractional part.
pub fn whole_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    }
}

/// Timestamp of the last sample in the batch, in the order received
pub fn latest_timestamp(samples: &[Sample]) -> Option<i64> {
    samples
        .last()
        .and_then(|s| s.get("timestamp"))
        .and_then(whole_number)
}
