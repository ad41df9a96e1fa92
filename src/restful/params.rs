use super::models::ProductType;
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Widest window the history endpoint accepts for an absolute time range.
pub const MAX_TIME_RANGE_DAYS: i64 = 90;
pub const DEFAULT_LIMIT: u32 = 20;
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 100;

/// One bound of a query time range: either an absolute instant or a value
/// already expressed in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    Instant(DateTime<Utc>),
    Millis(i64),
}

impl TimeBound {
    pub fn into_millis(self) -> i64 {
        match self {
            TimeBound::Instant(t) => t.timestamp_millis(),
            TimeBound::Millis(ms) => ms,
        }
    }
}

impl From<DateTime<Utc>> for TimeBound {
    fn from(t: DateTime<Utc>) -> Self {
        TimeBound::Instant(t)
    }
}

impl From<i64> for TimeBound {
    fn from(ms: i64) -> Self {
        TimeBound::Millis(ms)
    }
}

/// Checks membership against the exchange vocabulary and hands the value back
/// unchanged. Runs before any other normalization so an invalid product type
/// never produces a partially built request.
pub fn validate_product_type(value: &str) -> Result<&str> {
    value.parse::<ProductType>()?;
    Ok(value)
}

/// Canonical wire form of an instrument identifier: lowercase, alphanumeric
/// only. Tokens carrying a `usdt` quote drop their trailing 4 characters and
/// get `usdt` re-appended, so `BTC/USDT`, `BTC-USDT` and ` btcusdt ` all
/// collapse to `btcusdt`. No existence check is performed.
pub fn clean_symbol(symbol: &str) -> String {
    let cleaned: String = symbol
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if cleaned.contains("usdt") {
        format!("{}usdt", &cleaned[..cleaned.len() - 4])
    } else {
        cleaned
    }
}

/// Resolves both bounds to epoch milliseconds. When both are absolute
/// instants and the span exceeds 90 days, the start is silently advanced so
/// the span becomes exactly 90 days; the end bound is authoritative. Raw
/// millisecond inputs are never clamped, and partial ranges pass through.
pub fn resolve_time_range(
    start: Option<TimeBound>,
    end: Option<TimeBound>,
) -> (Option<i64>, Option<i64>) {
    if let (Some(TimeBound::Instant(s)), Some(TimeBound::Instant(e))) = (start, end) {
        let max_span = Duration::days(MAX_TIME_RANGE_DAYS);
        let s = if e - s > max_span { e - max_span } else { s };
        return (Some(s.timestamp_millis()), Some(e.timestamp_millis()));
    }
    (
        start.map(TimeBound::into_millis),
        end.map(TimeBound::into_millis),
    )
}

/// Page-size clamp: default 20, silently held to [1, 100]. Oversized requests
/// are reduced, never rejected.
pub fn clamp_limit(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(MIN_LIMIT, MAX_LIMIT)
}

/// Inserts `key` only when a value is present; absent fields never reach the
/// wire.
pub fn push_opt<V: ToString>(params: &mut BTreeMap<String, String>, key: &str, value: Option<V>) {
    if let Some(v) = value {
        params.insert(key.to_string(), v.to_string());
    }
}
