// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of CarbION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Timestamp format used in forecast responses and log files (local wall time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Single observation of the forecasted quantity.
///
/// Timestamps are stored in UTC internally; conversion to the configured
/// reference timezone happens at the calendar/display boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Parse a frequency code into a fixed step duration.
///
/// Accepts an optional integer multiplier followed by a unit: "h" (hours),
/// "d" (days), "min"/"t" (minutes). E.g. "h", "30min", "2h", "d".
pub fn parse_freq(code: &str) -> Option<Duration> {
    let code = code.trim().to_lowercase();
    let split = code
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)?;
    let (count, unit) = code.split_at(split);
    let count: i64 = if count.is_empty() {
        1
    } else {
        count.parse().ok()?
    };
    if count <= 0 {
        return None;
    }
    match unit {
        "h" => Some(Duration::hours(count)),
        "d" => Some(Duration::days(count)),
        "min" | "t" => Some(Duration::minutes(count)),
        _ => None,
    }
}

/// Parse a timestamp string as found in requests, HA responses and log files.
///
/// Tries RFC 3339 first; timezone-naive timestamps are treated as already
/// being in UTC (reference-zone convention for scoring comparisons).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", TIMESTAMP_FORMAT] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Format a UTC timestamp as wall time in the given reference zone.
pub fn format_in_zone(timestamp: DateTime<Utc>, tz: Tz) -> String {
    timestamp
        .with_timezone(&tz)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_freq_units() {
        assert_eq!(parse_freq("h"), Some(Duration::hours(1)));
        assert_eq!(parse_freq("H"), Some(Duration::hours(1)));
        assert_eq!(parse_freq("2h"), Some(Duration::hours(2)));
        assert_eq!(parse_freq("30min"), Some(Duration::minutes(30)));
        assert_eq!(parse_freq("15T"), Some(Duration::minutes(15)));
        assert_eq!(parse_freq("d"), Some(Duration::days(1)));
    }

    #[test]
    fn test_parse_freq_rejects_garbage() {
        assert_eq!(parse_freq(""), None);
        assert_eq!(parse_freq("0h"), None);
        assert_eq!(parse_freq("fortnight"), None);
        assert_eq!(parse_freq("42"), None);
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = parse_timestamp("2025-06-01T12:00:00-04:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 6, 1, 16, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_naive_is_utc() {
        let ts = parse_timestamp("2025-06-01 12:00:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());

        let ts = parse_timestamp("2025-06-01T12:00:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_format_in_zone() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 16, 0, 0).unwrap();
        assert_eq!(
            format_in_zone(ts, chrono_tz::America::Santiago),
            "2025-06-01 12:00:00"
        );
    }
}
