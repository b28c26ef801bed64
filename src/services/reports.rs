use chrono::NaiveDate;
use chrono_tz::Tz;
use sqlx::PgPool;

use crate::{
    models::meal::MealCategory,
    models::report::{CategoryTotal, MonthlySummary, PdfReport, TrendPoint, TrendReport},
    services::meal_report::{
        elapsed_service_days, pdf_category_total, rv_buckets, summary_category_total,
        trend_category_total, trend_daily, unique_guest_count, ONSITE_SERVICE_DAYS,
    },
    services::meals::MealService,
};

pub struct ReportService;

impl ReportService {
    /// Trend chart data: per-category month totals under the trend policy
    /// plus the daily series.
    pub async fn trend(
        pool: &PgPool,
        tz: Tz,
        year: i32,
        month0: u32,
    ) -> anyhow::Result<TrendReport> {
        let records = MealService::list_for_month(pool, year, month0).await?;
        let categories: Vec<CategoryTotal> = MealCategory::ALL
            .iter()
            .map(|&category| CategoryTotal {
                category,
                total: trend_category_total(&records, category, year, month0, tz),
            })
            .collect();
        let total = categories.iter().map(|c| c.total).sum();
        let daily = trend_daily(&records, year, month0, tz)
            .into_iter()
            .map(|(day, total)| TrendPoint { day, total })
            .collect();
        Ok(TrendReport { year, month: month0, categories, daily, total })
    }

    /// PDF figures: the all-days policy, with RV and shelter combined into
    /// one line the way the printed report presents them.
    pub async fn pdf(pool: &PgPool, tz: Tz, year: i32, month0: u32) -> anyhow::Result<PdfReport> {
        let records = MealService::list_for_month(pool, year, month0).await?;
        let total_for = |c| pdf_category_total(&records, c, year, month0, tz);

        let guest_meals = total_for(MealCategory::Guest);
        let extra_meals = total_for(MealCategory::Extra);
        let rv_safe_park = total_for(MealCategory::Rv) + total_for(MealCategory::Shelter);
        let day_worker_meals = total_for(MealCategory::DayWorker);
        let united_effort_meals = total_for(MealCategory::UnitedEffort);
        let lunch_bags = total_for(MealCategory::LunchBag);
        let total = guest_meals
            + extra_meals
            + rv_safe_park
            + day_worker_meals
            + united_effort_meals
            + lunch_bags;

        Ok(PdfReport {
            year,
            month: month0,
            guest_meals,
            extra_meals,
            rv_safe_park,
            day_worker_meals,
            united_effort_meals,
            lunch_bags,
            total,
        })
    }

    /// Summary table: day-bucketed figures with the RV catch-all, the hot
    /// meal subtotal, and the per-service-day guest average.
    pub async fn summary(
        pool: &PgPool,
        tz: Tz,
        year: i32,
        month0: u32,
        today: NaiveDate,
    ) -> anyhow::Result<MonthlySummary> {
        let records = MealService::list_for_month(pool, year, month0).await?;

        let guest_meals = summary_category_total(
            &records,
            MealCategory::Guest,
            year,
            month0,
            Some(&ONSITE_SERVICE_DAYS),
            tz,
        );
        let unfiltered =
            |c| summary_category_total(&records, c, year, month0, None, tz);
        let extra_meals = unfiltered(MealCategory::Extra);
        let rv = rv_buckets(&records, year, month0, tz);
        let day_worker_meals = unfiltered(MealCategory::DayWorker);
        let shelter_meals = unfiltered(MealCategory::Shelter);
        let united_effort_meals = unfiltered(MealCategory::UnitedEffort);
        let lunch_bags = unfiltered(MealCategory::LunchBag);

        let total_hot_meals = guest_meals
            + extra_meals
            + rv.wed_sat
            + rv.mon_thu
            + rv.other
            + day_worker_meals
            + shelter_meals
            + united_effort_meals;
        let grand_total = total_hot_meals + lunch_bags;

        let service_days_elapsed =
            elapsed_service_days(year, month0, &ONSITE_SERVICE_DAYS, today);
        let unique_guests = unique_guest_count(&records, year, month0, tz);
        let avg_guests_per_service_day = if service_days_elapsed > 0 {
            unique_guests as f64 / f64::from(service_days_elapsed)
        } else {
            0.0
        };

        Ok(MonthlySummary {
            year,
            month: month0,
            guest_meals,
            extra_meals,
            rv_wed_sat: rv.wed_sat,
            rv_mon_thu: rv.mon_thu,
            rv_other: rv.other,
            day_worker_meals,
            shelter_meals,
            united_effort_meals,
            total_hot_meals,
            lunch_bags,
            grand_total,
            service_days_elapsed,
            unique_guests,
            avg_guests_per_service_day,
        })
    }
}

/// Render the monthly summary as a CSV download.
pub fn summary_csv(summary: &MonthlySummary) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["line_item", "total"])?;
    let rows: [(&str, i64); 11] = [
        ("Guest meals", summary.guest_meals),
        ("Extra meals", summary.extra_meals),
        ("RV (Wed/Sat)", summary.rv_wed_sat),
        ("RV (Mon/Thu)", summary.rv_mon_thu),
        ("RV (other days)", summary.rv_other),
        ("Day worker meals", summary.day_worker_meals),
        ("Shelter meals", summary.shelter_meals),
        ("United Effort meals", summary.united_effort_meals),
        ("Total hot meals", summary.total_hot_meals),
        ("Lunch bags", summary.lunch_bags),
        ("Grand total", summary.grand_total),
    ];
    for (label, total) in rows {
        wtr.write_record([label, &total.to_string()])?;
    }
    let bytes = wtr.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_csv_lists_every_line_item() {
        let summary = MonthlySummary {
            year: 2026,
            month: 0,
            guest_meals: 460,
            extra_meals: 25,
            rv_wed_sat: 140,
            rv_mon_thu: 200,
            rv_other: 0,
            day_worker_meals: 50,
            shelter_meals: 20,
            united_effort_meals: 0,
            total_hot_meals: 895,
            lunch_bags: 100,
            grand_total: 995,
            service_days_elapsed: 18,
            unique_guests: 120,
            avg_guests_per_service_day: 120.0 / 18.0,
        };
        let csv = summary_csv(&summary).unwrap();
        assert!(csv.starts_with("line_item,total\n"));
        assert!(csv.contains("Grand total,995\n"));
        assert!(csv.contains("RV (other days),0\n"));
        assert_eq!(csv.lines().count(), 12);
    }
}
