//! Date range arguments.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Parse RFC 3339, or `YYYY-MM-DD` as the start (or end) of that UTC day.
pub fn parse_date(value: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{value}': expected YYYY-MM-DD or RFC 3339"))?;
    let time = if end_of_day {
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
    } else {
        Some(NaiveTime::MIN)
    };
    let time = time.ok_or_else(|| format!("invalid date '{value}'"))?;
    Ok(date.and_time(time).and_utc())
}

/// `[from, to]`, defaulting to the last `default_days` days up to now.
pub fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    default_days: u32,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
    let end = match to {
        Some(v) => parse_date(v, true)?,
        None => now,
    };
    let start = match from {
        Some(v) => parse_date(v, false)?,
        None => end - Duration::days(i64::from(default_days)),
    };
    Ok((start, end))
}
