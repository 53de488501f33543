// Time label parsing and display shifting
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const SECONDS_PER_DAY: i64 = 86_400;

/// Parse a history label into an instant.
///
/// Accepts RFC 3339 (`2024-01-01T00:00:00Z`), offset-less ISO date-times
/// (read as UTC) and bare dates. Clock-only labels such as `12:30:00` have no
/// date and yield `None`.
pub fn parse_timestamp(label: &str) -> Option<DateTime<Utc>> {
    let label = label.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(label) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(label, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(label, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// ISO 8601 rendering with millisecond precision and a `Z` suffix.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Shift a label by whole hours and render it as `HH:MM:SS`.
///
/// Full timestamps are shifted as instants. Bare `HH:MM[:SS]` labels wrap
/// around midnight. Anything else is returned unchanged.
pub fn shift_time_label_by_hours(label: &str, offset_hours: i64) -> String {
    if let Some(instant) = parse_timestamp(label) {
        return match Duration::try_hours(offset_hours).and_then(|d| instant.checked_add_signed(d)) {
            Some(shifted) => shifted.format("%H:%M:%S").to_string(),
            None => label.to_string(),
        };
    }

    let shifted = clock_seconds(label)
        .and_then(|seconds| seconds.checked_add(offset_hours.checked_mul(3600)?));
    match shifted {
        Some(seconds) => format_clock(seconds),
        None => label.to_string(),
    }
}

/// Seconds since midnight for a bare `HH:MM[:SS]` label. Components too
/// large to add up in an `i64` yield `None`.
pub fn clock_seconds(label: &str) -> Option<i64> {
    let parts: Vec<&str> = label.split(':').collect();
    if parts.len() < 2 {
        return None;
    }

    let hours: i64 = parts[0].trim().parse().ok()?;
    let minutes: i64 = parts[1].trim().parse().ok()?;
    let seconds: i64 = match parts.get(2) {
        Some(s) => s.trim().parse().ok()?,
        None => 0,
    };

    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

fn format_clock(total_seconds: i64) -> String {
    let wrapped = total_seconds.rem_euclid(SECONDS_PER_DAY);
    format!(
        "{:02}:{:02}:{:02}",
        wrapped / 3600,
        (wrapped % 3600) / 60,
        wrapped % 60
    )
}
