use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use darzi_core::DarziError;

/// Parse a SQLite datetime TEXT value into a `DateTime<Utc>`.
///
/// Values come either from `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` defaults
/// (`2025-01-01T00:00:00.000Z`) or from [`format_datetime`].
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DarziError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    Err(DarziError::Storage(format!("failed to parse datetime: {s}")))
}

pub(crate) fn parse_datetime_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DarziError> {
    match s {
        Some(s) => Ok(Some(parse_datetime(s)?)),
        None => Ok(None),
    }
}

/// Format a datetime the way the schema defaults do, so TEXT comparisons
/// (ORDER BY, range predicates) stay consistent.
pub(crate) fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, DarziError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DarziError::Storage(format!("failed to parse date {s}: {e}")))
}

pub(crate) fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_default_format() {
        let dt = parse_datetime("2025-06-01T08:30:00.000Z").unwrap();
        assert_eq!(dt.timestamp(), 1748766600);
    }

    #[test]
    fn round_trips_formatted_values() {
        let now = Utc::now();
        let parsed = parse_datetime(&format_datetime(now)).unwrap();
        assert_eq!(parsed.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_datetime("yesterday").is_err());
    }
}
