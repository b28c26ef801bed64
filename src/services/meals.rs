use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::meal::{
        BatchMealRequest, BulkDeleteOutcome, LogGuestMealRequest, MealCategory, MealRecord,
        MAX_BASE_MEALS_PER_DAY, MAX_EXTRA_MEALS_PER_DAY, MAX_TOTAL_MEALS_PER_DAY,
    },
    services::civil_date::{civil_today, parse_civil_date},
    services::meal_report::record_count,
};

#[derive(Debug, Error)]
pub enum MealError {
    #[error("guest has reached the {kind} meal limit for today ({limit})")]
    DailyLimit { kind: &'static str, limit: i64 },
    #[error("{0} meals are logged per checked-in guest, not as a batch")]
    NotABatchCategory(MealCategory),
    #[error("{0} meals are batch entries, not per-guest logs")]
    NotAGuestCategory(MealCategory),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Text-comparable bounds enclosing every stored date string that can land
/// in the requested civil month, with one day of slack on each side. Precise
/// bucketing is always done by the civil-date parser afterwards.
pub fn month_window(year: i32, month0: u32) -> (String, String) {
    let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or_default();
    let lower = first - Duration::days(1);
    let upper = first
        .checked_add_months(Months::new(1))
        .unwrap_or(first)
        + Duration::days(1);
    (
        lower.format("%Y-%m-%d").to_string(),
        upper.format("%Y-%m-%d").to_string(),
    )
}

/// The daily-limit gate for one more guest log: `base` and `extra` are what
/// the guest already has today, `count` is the increment being requested.
fn check_daily_limits(
    category: MealCategory,
    base: i64,
    extra: i64,
    count: i64,
) -> Result<(), MealError> {
    match category {
        MealCategory::Guest if base + count > MAX_BASE_MEALS_PER_DAY => {
            return Err(MealError::DailyLimit { kind: "base", limit: MAX_BASE_MEALS_PER_DAY })
        }
        MealCategory::Extra if extra + count > MAX_EXTRA_MEALS_PER_DAY => {
            return Err(MealError::DailyLimit { kind: "extra", limit: MAX_EXTRA_MEALS_PER_DAY })
        }
        _ => {}
    }
    if base + extra + count > MAX_TOTAL_MEALS_PER_DAY {
        return Err(MealError::DailyLimit { kind: "total", limit: MAX_TOTAL_MEALS_PER_DAY });
    }
    Ok(())
}

/// Meals already logged for one guest on one civil day, split base/extra.
fn todays_totals(records: &[MealRecord], today: NaiveDate, tz: Tz) -> (i64, i64) {
    let mut base = 0;
    let mut extra = 0;
    for r in records {
        let Some(parts) = parse_civil_date(&r.date, tz) else {
            continue;
        };
        let Some(date) = NaiveDate::from_ymd_opt(parts.year, parts.month0 + 1, parts.day) else {
            continue;
        };
        if date != today {
            continue;
        }
        match r.category.parse() {
            Ok(MealCategory::Guest) => base += record_count(r),
            Ok(MealCategory::Extra) => extra += record_count(r),
            _ => {}
        }
    }
    (base, extra)
}

pub struct MealService;

impl MealService {
    /// Fetch-all-for-period: everything that can fall in the civil month.
    pub async fn list_for_month(
        pool: &PgPool,
        year: i32,
        month0: u32,
    ) -> anyhow::Result<Vec<MealRecord>> {
        let (lower, upper) = month_window(year, month0);
        let records = sqlx::query_as::<_, MealRecord>(
            "SELECT * FROM meal_records WHERE date >= $1 AND date < $2 ORDER BY date",
        )
        .bind(lower)
        .bind(upper)
        .fetch_all(pool)
        .await?;
        Ok(records)
    }

    /// Log a base or extra meal for a checked-in guest, enforcing the daily
    /// limits (2 base + 2 extra, 4 total).
    pub async fn log_guest_meal(
        pool: &PgPool,
        tz: Tz,
        req: &LogGuestMealRequest,
        now: DateTime<Utc>,
    ) -> Result<MealRecord, MealError> {
        let category = req.category.unwrap_or(MealCategory::Guest);
        if category.is_bulk() {
            return Err(MealError::NotAGuestCategory(category));
        }
        let count = i64::from(req.count.unwrap_or(1).max(0));

        // Recent records are enough to cover today in any configured zone.
        let recent = sqlx::query_as::<_, MealRecord>(
            "SELECT * FROM meal_records WHERE guest_id = $1 AND created_at >= $2",
        )
        .bind(req.guest_id)
        .bind(now - Duration::days(2))
        .fetch_all(pool)
        .await?;

        let today = civil_today(now, tz);
        let (base, extra) = todays_totals(&recent, today, tz);
        check_daily_limits(category, base, extra, count)?;

        let record = sqlx::query_as::<_, MealRecord>(
            "INSERT INTO meal_records (guest_id, category, date, count)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(req.guest_id)
        .bind(category.to_string())
        .bind(now.to_rfc3339())
        .bind(count as i32)
        .fetch_one(pool)
        .await?;
        Ok(record)
    }

    /// Staff entry for a bulk category (RV, day worker, shelter, united
    /// effort, lunch bags). The date defaults to today's civil date.
    pub async fn add_batch(
        pool: &PgPool,
        tz: Tz,
        req: &BatchMealRequest,
        now: DateTime<Utc>,
    ) -> Result<MealRecord, MealError> {
        if !req.category.is_bulk() {
            return Err(MealError::NotABatchCategory(req.category));
        }
        let date = match &req.date {
            Some(d) => d.clone(),
            None => civil_today(now, tz).format("%Y-%m-%d").to_string(),
        };
        let record = sqlx::query_as::<_, MealRecord>(
            "INSERT INTO meal_records (category, date, count)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(req.category.to_string())
        .bind(date)
        .bind(req.count.max(0))
        .fetch_one(pool)
        .await?;
        Ok(record)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM meal_records WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete every record of one category in one civil month. Deletes are
    /// independent: an individual failure is logged and the batch continues,
    /// nothing already deleted is rolled back.
    pub async fn delete_bulk(
        pool: &PgPool,
        tz: Tz,
        category: MealCategory,
        year: i32,
        month0: u32,
    ) -> anyhow::Result<BulkDeleteOutcome> {
        let records = Self::list_for_month(pool, year, month0).await?;
        let ids: Vec<Uuid> = records
            .iter()
            .filter(|r| r.category.parse().ok() == Some(category))
            .filter(|r| {
                parse_civil_date(&r.date, tz)
                    .is_some_and(|p| p.year == year && p.month0 == month0)
            })
            .map(|r| r.id)
            .collect();

        let mut outcome = BulkDeleteOutcome { deleted: 0, failed: 0 };
        for id in ids {
            match sqlx::query("DELETE FROM meal_records WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
            {
                Ok(_) => outcome.deleted += 1,
                Err(e) => {
                    tracing::warn!("Bulk delete: failed to delete meal record {id}: {e}");
                    outcome.failed += 1;
                }
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;

    fn record(category: MealCategory, date: &str, count: i32) -> MealRecord {
        MealRecord {
            id: Uuid::new_v4(),
            guest_id: Some(Uuid::new_v4()),
            category: category.to_string(),
            date: date.to_string(),
            count: Some(count),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn month_window_has_slack_on_both_sides() {
        let (lower, upper) = month_window(2026, 0);
        assert_eq!(lower, "2025-12-31");
        assert_eq!(upper, "2026-02-02");
        // A UTC instant late on Feb 1 that is still Jan 31 in Pacific sorts
        // inside the window.
        assert!("2026-02-01T02:00:00.000Z".to_string() < upper);
    }

    #[test]
    fn month_window_wraps_december() {
        let (lower, upper) = month_window(2025, 11);
        assert_eq!(lower, "2025-11-30");
        assert_eq!(upper, "2026-01-02");
    }

    #[test]
    fn guest_meals_stop_at_the_base_limit() {
        assert!(check_daily_limits(MealCategory::Guest, 1, 0, 1).is_ok());
        let err = check_daily_limits(MealCategory::Guest, 2, 0, 1).unwrap_err();
        assert!(matches!(err, MealError::DailyLimit { kind: "base", .. }));
    }

    #[test]
    fn extras_stop_at_the_extra_limit() {
        assert!(check_daily_limits(MealCategory::Extra, 2, 1, 1).is_ok());
        let err = check_daily_limits(MealCategory::Extra, 0, 2, 1).unwrap_err();
        assert!(matches!(err, MealError::DailyLimit { kind: "extra", .. }));
    }

    #[test]
    fn combined_total_caps_at_four() {
        // 2 base + 2 extra is the full allowance
        assert!(check_daily_limits(MealCategory::Extra, 2, 1, 1).is_ok());
        // Historic over-logged extras trip the total cap even when the
        // per-kind check passes
        let err = check_daily_limits(MealCategory::Guest, 1, 3, 1).unwrap_err();
        assert!(matches!(err, MealError::DailyLimit { kind: "total", .. }));
    }

    #[test]
    fn todays_totals_only_counts_the_civil_day() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        let records = vec![
            record(MealCategory::Guest, "2026-01-08T17:00:00Z", 1),
            record(MealCategory::Extra, "2026-01-08T18:00:00Z", 2),
            // Midnight UTC Jan 8 is still Jan 7 in Pacific
            record(MealCategory::Guest, "2026-01-08T00:00:00Z", 1),
            record(MealCategory::Guest, "2026-01-07T17:00:00Z", 1),
        ];
        assert_eq!(todays_totals(&records, today, Los_Angeles), (1, 2));
    }
}
