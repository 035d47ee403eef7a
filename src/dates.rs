//! Local-time helpers for due dates and date-range filters.
//!
//! All stored timestamps are milliseconds since the Unix epoch. Calendar
//! boundaries (end of day, start of week) are computed in the server's
//! local time zone.

use crate::error::{ApiError, ApiResult};
use crate::types::TimeInput;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};

/// Accepted naive format for incoming dates (interpreted as local time).
pub const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse an incoming date string into epoch milliseconds.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS` (local time) or RFC 3339.
pub fn parse_timestamp(field: &str, value: &str) -> ApiResult<i64> {
    let value = value.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, LOCAL_FORMAT) {
        return local_to_ms(naive).ok_or_else(|| {
            ApiError::invalid_value(field, "date does not exist in the local time zone")
        });
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| {
            ApiError::invalid_value(
                field,
                &format!(
                    "{} must be YYYY-MM-DDTHH:MM:SS or RFC 3339, got '{}'",
                    field, value
                ),
            )
        })
}

/// Resolve a client timestamp. Epoch milliseconds pass through unchanged.
pub fn resolve_time(field: &str, value: &TimeInput) -> ApiResult<i64> {
    match value {
        TimeInput::Millis(ms) => Ok(*ms),
        TimeInput::Text(text) => parse_timestamp(field, text),
    }
}

fn local_to_ms(naive: NaiveDateTime) -> Option<i64> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// 23:59:00 local time on the day of `now`.
pub fn end_of_day(now: DateTime<Local>) -> i64 {
    now.date_naive()
        .and_hms_opt(23, 59, 0)
        .and_then(local_to_ms)
        .unwrap_or_else(|| now.timestamp_millis())
}

fn start_of(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .and_then(local_to_ms)
        // Midnight can fall in a DST gap; the first valid hour is close enough.
        .or_else(|| date.and_hms_opt(1, 0, 0).and_then(local_to_ms))
        .unwrap_or_default()
}

/// Midnight local time on the day of `now`.
pub fn start_of_day(now: DateTime<Local>) -> i64 {
    start_of(now.date_naive())
}

/// Midnight local time on the Sunday starting the week of `now`.
pub fn start_of_week(now: DateTime<Local>) -> i64 {
    let days_from_sunday = now.weekday().num_days_from_sunday() as i64;
    start_of(now.date_naive() - Duration::days(days_from_sunday))
}

/// Midnight local time on the first day of the month of `now`.
pub fn start_of_month(now: DateTime<Local>) -> i64 {
    let first = now.date_naive().with_day(1).unwrap_or(now.date_naive());
    start_of(first)
}

/// Whether `ms` falls on the same local calendar day as `now`.
pub fn is_same_local_day(ms: i64, now: DateTime<Local>) -> bool {
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.date_naive() == now.date_naive(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).earliest().unwrap()
    }

    #[test]
    fn test_end_of_day_is_2359_same_day() {
        let now = local(2024, 3, 14, 9, 30);
        let eod = Local.timestamp_millis_opt(end_of_day(now)).unwrap();
        assert_eq!(eod.date_naive(), now.date_naive());
        assert_eq!((eod.hour(), eod.minute(), eod.second()), (23, 59, 0));
    }

    #[test]
    fn test_parse_local_format() {
        let ms = parse_timestamp("dueDate", "2024-03-14T18:00:00").unwrap();
        assert_eq!(ms, local(2024, 3, 14, 18, 0).timestamp_millis());
    }

    #[test]
    fn test_parse_rfc3339() {
        let ms = parse_timestamp("dueDate", "2024-03-14T18:00:00Z").unwrap();
        assert_eq!(ms, 1_710_439_200_000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_timestamp("dueDate", "next tuesday").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("dueDate"));
        assert!(parse_timestamp("dueDate", "2024-03-14").is_err());
    }

    #[test]
    fn test_resolve_time_passes_millis_through() {
        assert_eq!(
            resolve_time("dueDate", &TimeInput::Millis(1_714_557_600_000)).unwrap(),
            1_714_557_600_000
        );
        assert_eq!(
            resolve_time("dueDate", &"2024-03-14T18:00:00Z".into()).unwrap(),
            1_710_439_200_000
        );
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // 2024-03-14 is a Thursday
        let now = local(2024, 3, 14, 12, 0);
        assert_eq!(start_of_week(now), local(2024, 3, 10, 0, 0).timestamp_millis());
        assert_eq!(start_of_month(now), local(2024, 3, 1, 0, 0).timestamp_millis());
        assert_eq!(start_of_day(now), local(2024, 3, 14, 0, 0).timestamp_millis());
    }

    #[test]
    fn test_same_local_day() {
        let now = local(2024, 3, 14, 12, 0);
        assert!(is_same_local_day(local(2024, 3, 14, 23, 0).timestamp_millis(), now));
        assert!(!is_same_local_day(local(2024, 3, 15, 0, 30).timestamp_millis(), now));
    }
}
