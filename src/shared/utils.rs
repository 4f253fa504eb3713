//! Utility functions and helpers

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Placeholder shown for values that are absent or not applicable.
pub const NOT_AVAILABLE: &str = "N/A";

/// Round a decimal string to two places, half away from zero.
/// `"0.00"` when it does not parse.
pub fn to_fixed2(value: &str) -> String {
    match Decimal::from_str(value.trim()) {
        Ok(num) => {
            let rounded = num.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.2}", rounded)
        }
        Err(_) => "0.00".to_string(),
    }
}

/// UTC calendar date and clock time for a unix timestamp.
///
/// Returns `("N/A", "N/A")` for zero or out-of-range timestamps.
pub fn format_utc_date_time(timestamp: u64) -> (String, String) {
    if timestamp == 0 {
        return (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string());
    }
    let parsed = i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    match parsed {
        Some(dt) => (
            dt.format("%m/%d/%Y").to_string(),
            dt.format("%H:%M:%S").to_string(),
        ),
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    }
}

/// Current unix time in seconds
pub fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Current unix time in milliseconds
pub fn unix_now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Shorten an address or hash for log lines
pub fn short_hex(value: &str) -> String {
    if value.len() <= 14 {
        return value.to_string();
    }
    format!("{}...{}", &value[..8], &value[value.len() - 6..])
}
