use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

/// Calendar parts of a stored date value, computed in the fixed report
/// timezone. `month0` is 0-based (0 = January) and `day_of_week` counts from
/// Sunday, matching the stored report conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilDateParts {
    pub year: i32,
    pub month0: u32,
    pub day: u32,
    pub day_of_week: u32,
}

impl CivilDateParts {
    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
            day: date.day(),
            day_of_week: date.weekday().num_days_from_sunday(),
        }
    }
}

/// Parse a stored date value into civil-calendar parts.
///
/// A bare `YYYY-MM-DD` string carries no instant and is taken literally. A
/// full timestamp is converted into `tz` first, so an instant near a UTC
/// day boundary lands on the correct civil day (midnight UTC is still the
/// previous evening in a UTC-8 zone). Empty or unparseable input yields
/// `None`; callers treat that as "exclude this record".
pub fn parse_civil_date(raw: &str, tz: Tz) -> Option<CivilDateParts> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(CivilDateParts::from_naive(date));
    }
    let instant = DateTime::parse_from_rfc3339(raw).ok()?;
    Some(CivilDateParts::from_naive(instant.with_timezone(&tz).date_naive()))
}

/// The civil date a record created "now" would carry.
pub fn civil_today(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn parses_iso_timestamp_in_report_timezone() {
        // 2026-01-08T16:00:00Z is 8 AM PST on Thursday Jan 8
        let parts = parse_civil_date("2026-01-08T16:00:00.000Z", Los_Angeles).unwrap();
        assert_eq!(parts.year, 2026);
        assert_eq!(parts.month0, 0);
        assert_eq!(parts.day, 8);
        assert_eq!(parts.day_of_week, 4); // Thursday
    }

    #[test]
    fn parses_bare_date_literally() {
        let parts = parse_civil_date("2026-01-05", Los_Angeles).unwrap();
        assert_eq!(parts.year, 2026);
        assert_eq!(parts.month0, 0);
        assert_eq!(parts.day, 5);
        assert_eq!(parts.day_of_week, 1); // Monday
    }

    #[test]
    fn midnight_utc_is_previous_civil_day() {
        // Midnight UTC Jan 8 is 4 PM PST Jan 7
        let parts = parse_civil_date("2026-01-08T00:00:00.000Z", Los_Angeles).unwrap();
        assert_eq!(parts.day, 7);
        assert_eq!(parts.day_of_week, 3); // Wednesday
    }

    #[test]
    fn month_boundary_shifts_into_previous_month() {
        // 2 AM UTC on Feb 1 is still Jan 31 in Pacific
        let parts = parse_civil_date("2026-02-01T02:00:00Z", Los_Angeles).unwrap();
        assert_eq!(parts.month0, 0);
        assert_eq!(parts.day, 31);
    }

    #[test]
    fn empty_and_garbage_yield_none() {
        assert!(parse_civil_date("", Los_Angeles).is_none());
        assert!(parse_civil_date("   ", Los_Angeles).is_none());
        assert!(parse_civil_date("not-a-date", Los_Angeles).is_none());
        assert!(parse_civil_date("2026-13-40", Los_Angeles).is_none());
    }

    #[test]
    fn civil_today_respects_timezone() {
        let now = Utc.with_ymd_and_hms(2026, 1, 8, 1, 0, 0).unwrap();
        let today = civil_today(now, Los_Angeles);
        assert_eq!(today, NaiveDate::from_ymd_opt(2026, 1, 7).unwrap());
    }
}
