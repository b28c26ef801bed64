use serde::Serialize;

use super::meal::MealCategory;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryTotal {
    pub category: MealCategory,
    pub total: i64,
}

/// One bar of the monthly trend chart: meals served on one civil day.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrendPoint {
    pub day: u32,
    pub total: i64,
}

/// Trend view: month totals per category (trend policy) plus the daily series.
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub year: i32,
    pub month: u32,
    pub categories: Vec<CategoryTotal>,
    pub daily: Vec<TrendPoint>,
    pub total: i64,
}

/// PDF view: everything delivered in the month, no day-of-week filtering.
/// RV and shelter meals are reported under one combined figure here while the
/// summary view itemizes them; the numeric contribution is identical.
#[derive(Debug, Clone, Serialize)]
pub struct PdfReport {
    pub year: i32,
    pub month: u32,
    pub guest_meals: i64,
    pub extra_meals: i64,
    pub rv_safe_park: i64,
    pub day_worker_meals: i64,
    pub united_effort_meals: i64,
    pub lunch_bags: i64,
    pub total: i64,
}

/// Summary view: day-of-week bucketed table with the RV catch-all.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub guest_meals: i64,
    pub extra_meals: i64,
    pub rv_wed_sat: i64,
    pub rv_mon_thu: i64,
    /// Residual RV total for days no named bucket covers; keeps the summary
    /// from ever losing a record to a bucketing gap.
    pub rv_other: i64,
    pub day_worker_meals: i64,
    pub shelter_meals: i64,
    pub united_effort_meals: i64,
    pub total_hot_meals: i64,
    pub lunch_bags: i64,
    pub grand_total: i64,
    pub service_days_elapsed: u32,
    pub unique_guests: i64,
    pub avg_guests_per_service_day: f64,
}
