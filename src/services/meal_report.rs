//! The one canonical definition of the meal-report filter policies.
//!
//! Three surfaces consume these rules: the trend chart, the monthly PDF
//! figures, and the summary table. They historically re-implemented the same
//! filtering independently and drifted apart (bulk deliveries dropped from
//! the trend, RV day-groups losing records, shelter counted differently).
//! Everything here is pure computation over already-fetched records so each
//! surface sums the exact same numbers.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::models::meal::{MealCategory, MealRecord};
use crate::services::civil_date::{parse_civil_date, CivilDateParts};

/// Weekdays the center serves on-site meals (Sunday = 0): Mon, Wed, Fri, Sat.
pub const ONSITE_SERVICE_DAYS: [u32; 4] = [1, 3, 5, 6];

/// Named RV day-group buckets in the summary view.
pub const RV_WED_SAT_DAYS: [u32; 2] = [3, 6];
pub const RV_MON_THU_DAYS: [u32; 2] = [1, 4];

/// Days a given category is normally served on-site. Bulk categories have no
/// service-day schedule: deliveries can land on any weekday.
pub fn service_days(category: MealCategory) -> Option<&'static [u32]> {
    match category {
        MealCategory::Guest | MealCategory::Extra => Some(&ONSITE_SERVICE_DAYS),
        _ => None,
    }
}

/// Trend policy: month match, and non-bulk categories only on their service
/// days. Bulk records are never excluded by day-of-week — a Thursday RV
/// delivery belongs in the chart.
pub fn trend_keeps(parts: &CivilDateParts, year: i32, month0: u32, category: MealCategory) -> bool {
    if parts.year != year || parts.month0 != month0 {
        return false;
    }
    if category.is_bulk() {
        return true;
    }
    match service_days(category) {
        Some(days) => days.contains(&parts.day_of_week),
        None => true,
    }
}

/// PDF policy: everything delivered in the month, no day-of-week filtering.
pub fn pdf_keeps(parts: &CivilDateParts, year: i32, month0: u32) -> bool {
    parts.year == year && parts.month0 == month0
}

/// Summary policy: month match plus an optional explicit day-of-week set for
/// the bucket under computation.
pub fn summary_keeps(
    parts: &CivilDateParts,
    year: i32,
    month0: u32,
    days: Option<&[u32]>,
) -> bool {
    if parts.year != year || parts.month0 != month0 {
        return false;
    }
    match days {
        Some(days) => days.contains(&parts.day_of_week),
        None => true,
    }
}

fn record_category(record: &MealRecord) -> Option<MealCategory> {
    record.category.parse().ok()
}

/// Missing or negative counts contribute zero, never an error.
pub fn record_count(record: &MealRecord) -> i64 {
    i64::from(record.count.unwrap_or(0).max(0))
}

fn category_records<'a>(
    records: &'a [MealRecord],
    category: MealCategory,
) -> impl Iterator<Item = &'a MealRecord> {
    records
        .iter()
        .filter(move |r| record_category(r) == Some(category))
}

/// Sum one category under the trend policy. Records whose date fails to
/// parse are excluded, not errors.
pub fn trend_category_total(
    records: &[MealRecord],
    category: MealCategory,
    year: i32,
    month0: u32,
    tz: Tz,
) -> i64 {
    category_records(records, category)
        .filter_map(|r| parse_civil_date(&r.date, tz).map(|p| (p, r)))
        .filter(|(p, _)| trend_keeps(p, year, month0, category))
        .map(|(_, r)| record_count(r))
        .sum()
}

/// Sum one category under the PDF policy.
pub fn pdf_category_total(
    records: &[MealRecord],
    category: MealCategory,
    year: i32,
    month0: u32,
    tz: Tz,
) -> i64 {
    category_records(records, category)
        .filter_map(|r| parse_civil_date(&r.date, tz).map(|p| (p, r)))
        .filter(|(p, _)| pdf_keeps(p, year, month0))
        .map(|(_, r)| record_count(r))
        .sum()
}

/// Sum one category under the summary policy, optionally restricted to an
/// explicit day-of-week bucket.
pub fn summary_category_total(
    records: &[MealRecord],
    category: MealCategory,
    year: i32,
    month0: u32,
    days: Option<&[u32]>,
    tz: Tz,
) -> i64 {
    category_records(records, category)
        .filter_map(|r| parse_civil_date(&r.date, tz).map(|p| (p, r)))
        .filter(|(p, _)| summary_keeps(p, year, month0, days))
        .map(|(_, r)| record_count(r))
        .sum()
}

/// Month total under the trend policy across every category.
pub fn trend_total(records: &[MealRecord], year: i32, month0: u32, tz: Tz) -> i64 {
    MealCategory::ALL
        .iter()
        .map(|&c| trend_category_total(records, c, year, month0, tz))
        .sum()
}

/// Month total under the PDF policy across every category.
pub fn pdf_total(records: &[MealRecord], year: i32, month0: u32, tz: Tz) -> i64 {
    MealCategory::ALL
        .iter()
        .map(|&c| pdf_category_total(records, c, year, month0, tz))
        .sum()
}

/// The RV day-group buckets of the summary view. The catch-all is the
/// unfiltered RV total minus the named buckets, so an RV delivery on a day
/// no named bucket covers is still counted exactly once.
pub struct RvBuckets {
    pub wed_sat: i64,
    pub mon_thu: i64,
    pub other: i64,
}

pub fn rv_buckets(records: &[MealRecord], year: i32, month0: u32, tz: Tz) -> RvBuckets {
    let wed_sat =
        summary_category_total(records, MealCategory::Rv, year, month0, Some(&RV_WED_SAT_DAYS), tz);
    let mon_thu =
        summary_category_total(records, MealCategory::Rv, year, month0, Some(&RV_MON_THU_DAYS), tz);
    let all = summary_category_total(records, MealCategory::Rv, year, month0, None, tz);
    RvBuckets {
        wed_sat,
        mon_thu,
        other: all - wed_sat - mon_thu,
    }
}

/// Month total under the summary policy: day-filtered guest meals, bucketed
/// RV (named groups + catch-all), everything else unfiltered.
pub fn summary_total(records: &[MealRecord], year: i32, month0: u32, tz: Tz) -> i64 {
    let rv = rv_buckets(records, year, month0, tz);
    let guest = summary_category_total(
        records,
        MealCategory::Guest,
        year,
        month0,
        Some(&ONSITE_SERVICE_DAYS),
        tz,
    );
    let rest: i64 = [
        MealCategory::Extra,
        MealCategory::DayWorker,
        MealCategory::Shelter,
        MealCategory::UnitedEffort,
        MealCategory::LunchBag,
    ]
    .iter()
    .map(|&c| summary_category_total(records, c, year, month0, None, tz))
    .sum();
    guest + rv.wed_sat + rv.mon_thu + rv.other + rest
}

/// Daily totals for the trend chart, one point per civil day with a nonzero
/// (or zero) total, covering every day of the month.
pub fn trend_daily(records: &[MealRecord], year: i32, month0: u32, tz: Tz) -> Vec<(u32, i64)> {
    let last_day = days_in_month(year, month0);
    let mut days = vec![0_i64; last_day as usize];
    for r in records {
        let Some(category) = record_category(r) else {
            continue;
        };
        let Some(parts) = parse_civil_date(&r.date, tz) else {
            continue;
        };
        if trend_keeps(&parts, year, month0, category) {
            days[(parts.day - 1) as usize] += record_count(r);
        }
    }
    days.into_iter()
        .enumerate()
        .map(|(i, total)| (i as u32 + 1, total))
        .collect()
}

fn days_in_month(year: i32, month0: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or_default();
    let next = if month0 == 11 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month0 + 2, 1)
    }
    .unwrap_or_default();
    (next - first).num_days() as u32
}

/// Count configured service weekdays from day 1 of the month through `today`
/// when the month is in progress, or through month end otherwise. The
/// denominator for "average guests per service day" — dividing by days that
/// have not happened yet would dilute an in-progress month.
pub fn elapsed_service_days(year: i32, month0: u32, days: &[u32], today: NaiveDate) -> u32 {
    let last_day = days_in_month(year, month0);
    if last_day == 0 {
        return 0;
    }
    let end = if today.year() == year && today.month0() == month0 {
        today.day().min(last_day)
    } else {
        last_day
    };
    (1..=end)
        .filter_map(|d| NaiveDate::from_ymd_opt(year, month0 + 1, d))
        .filter(|d| days.contains(&d.weekday().num_days_from_sunday()))
        .count() as u32
}

/// Distinct guests with a checked-in guest meal in the month (trend policy,
/// so only service-day records count).
pub fn unique_guest_count(records: &[MealRecord], year: i32, month0: u32, tz: Tz) -> i64 {
    let guests: HashSet<Uuid> = category_records(records, MealCategory::Guest)
        .filter_map(|r| {
            let parts = parse_civil_date(&r.date, tz)?;
            if trend_keeps(&parts, year, month0, MealCategory::Guest) {
                r.guest_id
            } else {
                None
            }
        })
        .collect();
    guests.len() as i64
}

/// Guests with any meal activity within the trailing window (inclusive of
/// the boundary day). Drives the "recent guests" quick list at check-in.
pub fn recent_guest_ids(
    records: &[MealRecord],
    today: NaiveDate,
    window_days: i64,
    tz: Tz,
) -> HashSet<Uuid> {
    let cutoff = today - Duration::days(window_days);
    records
        .iter()
        .filter_map(|r| {
            let parts = parse_civil_date(&r.date, tz)?;
            let date = NaiveDate::from_ymd_opt(parts.year, parts.month0 + 1, parts.day)?;
            if date >= cutoff {
                r.guest_id
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::America::Los_Angeles;

    const TZ: Tz = Los_Angeles;
    const YEAR: i32 = 2026;
    const MONTH0: u32 = 0; // January

    fn record(category: MealCategory, date: &str, count: i32) -> MealRecord {
        MealRecord {
            id: Uuid::new_v4(),
            guest_id: None,
            category: category.to_string(),
            date: date.to_string(),
            count: Some(count),
            created_at: Utc::now(),
        }
    }

    fn guest_record(guest: Uuid, date: &str, count: i32) -> MealRecord {
        MealRecord {
            guest_id: Some(guest),
            ..record(MealCategory::Guest, date, count)
        }
    }

    /// January 2026 fixture: service days Mon/Wed/Fri/Sat, ISO timestamps as
    /// the datastore would hold them.
    fn january_2026() -> Vec<MealRecord> {
        vec![
            // Guest meals on Mon 5, Wed 7, Fri 9, Sat 10
            record(MealCategory::Guest, "2026-01-05T17:00:00.000Z", 120),
            record(MealCategory::Guest, "2026-01-07T17:00:00.000Z", 110),
            record(MealCategory::Guest, "2026-01-09T17:00:00.000Z", 100),
            record(MealCategory::Guest, "2026-01-10T17:00:00.000Z", 130),
            // Extras on Mon and Sat
            record(MealCategory::Extra, "2026-01-05T18:00:00.000Z", 10),
            record(MealCategory::Extra, "2026-01-10T18:00:00.000Z", 15),
            // RV on Mon, Wed, Thu (not a service day), Sat
            record(MealCategory::Rv, "2026-01-05T16:00:00.000Z", 100),
            record(MealCategory::Rv, "2026-01-07T16:00:00.000Z", 40),
            record(MealCategory::Rv, "2026-01-08T16:00:00.000Z", 100),
            record(MealCategory::Rv, "2026-01-10T16:00:00.000Z", 100),
            // Day worker on Sat
            record(MealCategory::DayWorker, "2026-01-10T16:00:00.000Z", 50),
            // Shelter on Tue (not a service day)
            record(MealCategory::Shelter, "2026-01-06T16:00:00.000Z", 20),
            // Lunch bags on Sat
            record(MealCategory::LunchBag, "2026-01-10T16:00:00.000Z", 100),
        ]
    }

    #[test]
    fn trend_includes_thursday_rv_deliveries() {
        let records = january_2026();
        assert_eq!(
            trend_category_total(&records, MealCategory::Rv, YEAR, MONTH0, TZ),
            340
        );
    }

    #[test]
    fn trend_includes_tuesday_shelter_meals() {
        let records = january_2026();
        assert_eq!(
            trend_category_total(&records, MealCategory::Shelter, YEAR, MONTH0, TZ),
            20
        );
    }

    #[test]
    fn trend_still_filters_guest_meals_by_service_day() {
        let mut records = january_2026();
        // A stray guest record on Tuesday must not count
        records.push(record(MealCategory::Guest, "2026-01-06T17:00:00Z", 999));
        assert_eq!(
            trend_category_total(&records, MealCategory::Guest, YEAR, MONTH0, TZ),
            460
        );
    }

    #[test]
    fn all_three_views_agree_on_the_month_total() {
        let records = january_2026();
        let trend = trend_total(&records, YEAR, MONTH0, TZ);
        let pdf = pdf_total(&records, YEAR, MONTH0, TZ);
        let summary = summary_total(&records, YEAR, MONTH0, TZ);
        assert_eq!(trend, pdf);
        assert_eq!(pdf, summary);
        // guest 460 + extra 25 + rv 340 + day worker 50 + shelter 20 + lunch bags 100
        assert_eq!(trend, 995);
    }

    #[test]
    fn records_from_other_months_are_ignored() {
        let mut records = january_2026();
        records.push(record(MealCategory::Rv, "2025-12-31T16:00:00Z", 500));
        records.push(record(MealCategory::Guest, "2026-02-02T17:00:00Z", 500));
        assert_eq!(trend_total(&records, YEAR, MONTH0, TZ), 995);
        assert_eq!(pdf_total(&records, YEAR, MONTH0, TZ), 995);
    }

    #[test]
    fn utc_month_boundary_record_lands_in_the_civil_month() {
        // 2 AM UTC Feb 1 is Jan 31 (Saturday) in Pacific
        let records = vec![record(MealCategory::Guest, "2026-02-01T02:00:00Z", 5)];
        assert_eq!(pdf_total(&records, YEAR, MONTH0, TZ), 5);
        assert_eq!(pdf_total(&records, YEAR, 1, TZ), 0);
    }

    #[test]
    fn unparseable_dates_are_excluded_not_errors() {
        let mut records = january_2026();
        records.push(record(MealCategory::Rv, "", 50));
        records.push(record(MealCategory::Rv, "garbage", 50));
        assert_eq!(trend_total(&records, YEAR, MONTH0, TZ), 995);
    }

    #[test]
    fn missing_and_negative_counts_sum_as_zero() {
        let mut bad = record(MealCategory::Rv, "2026-01-05T16:00:00Z", 0);
        bad.count = None;
        let negative = record(MealCategory::Rv, "2026-01-07T16:00:00Z", -40);
        assert_eq!(pdf_total(&[bad, negative], YEAR, MONTH0, TZ), 0);
    }

    #[test]
    fn rv_catch_all_is_zero_when_named_buckets_cover_everything() {
        let records = january_2026();
        let rv = rv_buckets(&records, YEAR, MONTH0, TZ);
        assert_eq!(rv.wed_sat, 140); // Wed 40 + Sat 100
        assert_eq!(rv.mon_thu, 200); // Mon 100 + Thu 100
        assert_eq!(rv.other, 0);
        assert_eq!(rv.wed_sat + rv.mon_thu + rv.other, 340);
    }

    #[test]
    fn rv_catch_all_captures_uncovered_days() {
        let mut records = january_2026();
        // Friday RV delivery: no named bucket covers Friday
        records.push(record(MealCategory::Rv, "2026-01-09T16:00:00.000Z", 30));
        let rv = rv_buckets(&records, YEAR, MONTH0, TZ);
        assert_eq!(rv.other, 30);
        let all = summary_category_total(&records, MealCategory::Rv, YEAR, MONTH0, None, TZ);
        assert_eq!(rv.wed_sat + rv.mon_thu + rv.other, all);
    }

    #[test]
    fn shelter_contributes_once_and_combines_with_rv_in_pdf() {
        let records = january_2026();
        let rv = pdf_category_total(&records, MealCategory::Rv, YEAR, MONTH0, TZ);
        let shelter = pdf_category_total(&records, MealCategory::Shelter, YEAR, MONTH0, TZ);
        assert_eq!(rv + shelter, 360);
    }

    #[test]
    fn trend_daily_buckets_by_civil_day() {
        let records = january_2026();
        let daily = trend_daily(&records, YEAR, MONTH0, TZ);
        assert_eq!(daily.len(), 31);
        // Sat Jan 10: 130 guest + 15 extra + 100 rv + 50 day worker + 100 lunch bags
        assert_eq!(daily[9], (10, 395));
        // Thu Jan 8: the RV delivery alone
        assert_eq!(daily[7], (8, 100));
        let month_total: i64 = daily.iter().map(|&(_, t)| t).sum();
        assert_eq!(month_total, trend_total(&records, YEAR, MONTH0, TZ));
    }

    #[test]
    fn elapsed_service_days_mid_month() {
        // Through Thu Jan 8: Mon 5 + Wed 7 counted, plus Fri 2 and Sat 3
        let today = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        assert_eq!(elapsed_service_days(YEAR, MONTH0, &ONSITE_SERVICE_DAYS, today), 4);
    }

    #[test]
    fn elapsed_service_days_caps_at_full_month() {
        // January 2026: Fri x5, Sat x5, Mon x4, Wed x4 = 18 service days
        let later = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let full = elapsed_service_days(YEAR, MONTH0, &ONSITE_SERVICE_DAYS, later);
        assert_eq!(full, 18);

        // Monotonic: every in-month day is <= the full count, with equality
        // from the last service day onward.
        let mut last = 0;
        for day in 1..=31 {
            let today = NaiveDate::from_ymd_opt(2026, 1, day).unwrap();
            let elapsed = elapsed_service_days(YEAR, MONTH0, &ONSITE_SERVICE_DAYS, today);
            assert!(elapsed >= last);
            assert!(elapsed <= full);
            last = elapsed;
        }
        assert_eq!(last, full);
    }

    #[test]
    fn unique_guests_deduplicates_and_day_filters() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let records = vec![
            guest_record(a, "2026-01-05T17:00:00Z", 1),
            guest_record(a, "2026-01-07T17:00:00Z", 1),
            guest_record(b, "2026-01-10T17:00:00Z", 1),
            // Tuesday record: outside service days, must not count
            guest_record(Uuid::new_v4(), "2026-01-06T17:00:00Z", 1),
        ];
        assert_eq!(unique_guest_count(&records, YEAR, MONTH0, TZ), 2);
    }

    #[test]
    fn recent_window_includes_boundary_day() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let fresh = Uuid::new_v4();
        let boundary = Uuid::new_v4();
        let stale = Uuid::new_v4();
        let records = vec![
            guest_record(fresh, "2026-01-19T10:00:00Z", 1),
            guest_record(boundary, "2026-01-13T10:00:00Z", 1), // exactly 7 days ago
            guest_record(stale, "2026-01-10T10:00:00Z", 1),
        ];
        let recent = recent_guest_ids(&records, today, 7, TZ);
        assert!(recent.contains(&fresh));
        assert!(recent.contains(&boundary));
        assert!(!recent.contains(&stale));
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn recent_window_deduplicates_guests() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let g = Uuid::new_v4();
        let records = vec![
            guest_record(g, "2026-01-19T10:00:00Z", 1),
            guest_record(g, "2026-01-18T10:00:00Z", 1),
            guest_record(g, "2026-01-17T10:00:00Z", 1),
        ];
        assert_eq!(recent_guest_ids(&records, today, 7, TZ).len(), 1);
    }
}
