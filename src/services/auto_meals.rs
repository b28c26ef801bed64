use chrono::{Timelike, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::models::meal::MealCategory;
use crate::services::civil_date::civil_today;

/// Hour (in the report timezone) at which meal service ends and the standing
/// bulk entries are posted for the day.
pub const SERVICE_END_HOUR: u32 = 10;

/// Standing bulk meal plan per service day. Days without a plan get nothing.
pub fn plan_for(day_of_week: u32) -> &'static [(MealCategory, i32)] {
    match day_of_week {
        // Monday
        1 => &[(MealCategory::Rv, 100), (MealCategory::LunchBag, 120)],
        // Wednesday
        3 => &[(MealCategory::Rv, 40), (MealCategory::LunchBag, 120)],
        // Saturday
        6 => &[
            (MealCategory::Rv, 100),
            (MealCategory::LunchBag, 220),
            (MealCategory::DayWorker, 50),
        ],
        _ => &[],
    }
}

/// Spawn a background task that wakes up daily at service end (10:00 in the
/// report timezone) and posts the day's standing bulk entries. An existing
/// entry of the same category and date makes the run a no-op, so restarts
/// never double-post.
pub fn start(pool: PgPool, tz: Tz) {
    tokio::spawn(async move {
        loop {
            let now = Utc::now().with_timezone(&tz);
            let secs_today = now.hour() * 3600 + now.minute() * 60 + now.second();
            let target_secs = SERVICE_END_HOUR * 3600;
            let sleep_secs = if secs_today < target_secs {
                u64::from(target_secs - secs_today)
            } else {
                u64::from(86400 - secs_today + target_secs)
            };
            tokio::time::sleep(tokio::time::Duration::from_secs(sleep_secs)).await;

            if let Err(e) = run_once(&pool, tz).await {
                warn!("Auto meals: posting failed: {e}");
            }
        }
    });
}

/// Post the standing entries for today's civil date, skipping any category
/// already on file for that date.
pub async fn run_once(pool: &PgPool, tz: Tz) -> anyhow::Result<()> {
    let today = civil_today(Utc::now(), tz);
    let date = today.format("%Y-%m-%d").to_string();
    let day_of_week = chrono::Datelike::weekday(&today).num_days_from_sunday();

    let plan = plan_for(day_of_week);
    if plan.is_empty() {
        return Ok(());
    }

    let mut posted = 0;
    for &(category, count) in plan {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM meal_records
                 WHERE category = $1 AND date = $2 AND guest_id IS NULL
             )",
        )
        .bind(category.to_string())
        .bind(&date)
        .fetch_one(pool)
        .await?;
        if exists {
            continue;
        }

        sqlx::query("INSERT INTO meal_records (category, date, count) VALUES ($1, $2, $3)")
            .bind(category.to_string())
            .bind(&date)
            .bind(count)
            .execute(pool)
            .await?;
        posted += 1;
    }

    if posted > 0 {
        info!("Auto meals: posted {posted} standing entr(ies) for {date}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monday_and_wednesday_plans_differ_only_in_rv() {
        assert_eq!(plan_for(1), &[(MealCategory::Rv, 100), (MealCategory::LunchBag, 120)]);
        assert_eq!(plan_for(3), &[(MealCategory::Rv, 40), (MealCategory::LunchBag, 120)]);
    }

    #[test]
    fn saturday_adds_day_worker_meals() {
        let plan = plan_for(6);
        assert_eq!(plan.len(), 3);
        assert!(plan.contains(&(MealCategory::DayWorker, 50)));
        assert!(plan.contains(&(MealCategory::LunchBag, 220)));
    }

    #[test]
    fn off_days_have_no_standing_entries() {
        for day in [0, 2, 4, 5] {
            assert!(plan_for(day).is_empty(), "day {day} should have no plan");
        }
    }
}
