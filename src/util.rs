use crate::error::{Result, UpliftError};
use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use std::time::Duration;

/// Parses an absolute date: RFC3339 or `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&datetime));
        }
    }

    Err(UpliftError::InvalidDate(format!("'{input}' is not RFC3339 or YYYY-MM-DD")))
}

/// Like [`parse_date`], but also accepts `<duration> ago` relative to `now`,
/// where the duration uses humantime syntax (`3 weeks ago`, `2months ago`).
pub fn parse_date_or_relative(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let Some(span) = input.trim().strip_suffix("ago") else {
        return parse_date(input);
    };

    let elapsed = humantime::parse_duration(span.trim())
        .map_err(|e| UpliftError::InvalidDate(format!("'{input}': {e}")))?;
    TimeDelta::from_std(elapsed)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .ok_or_else(|| UpliftError::InvalidDate(format!("'{input}' is too far in the past")))
}

/// Parses a pause such as `1s` or `500ms`.
pub fn parse_pause(input: &str) -> Result<Duration> {
    humantime::parse_duration(input.trim())
        .map_err(|e| UpliftError::Config(format!("Invalid pause '{input}': {e}")))
}

pub fn short_sha(sha: &str) -> &str {
    sha.get(..8).unwrap_or(sha)
}
