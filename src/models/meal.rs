use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-guest daily meal limits enforced at logging time.
pub const MAX_BASE_MEALS_PER_DAY: i64 = 2;
pub const MAX_EXTRA_MEALS_PER_DAY: i64 = 2;
pub const MAX_TOTAL_MEALS_PER_DAY: i64 = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MealCategory {
    Guest,
    Extra,
    Rv,
    DayWorker,
    Shelter,
    UnitedEffort,
    LunchBag,
}

impl MealCategory {
    pub const ALL: [MealCategory; 7] = [
        MealCategory::Guest,
        MealCategory::Extra,
        MealCategory::Rv,
        MealCategory::DayWorker,
        MealCategory::Shelter,
        MealCategory::UnitedEffort,
        MealCategory::LunchBag,
    ];

    /// Bulk categories are delivered or served in batch counts rather than
    /// logged against an individually checked-in guest. They are never
    /// excluded from a report by day-of-week.
    pub fn is_bulk(self) -> bool {
        !matches!(self, MealCategory::Guest | MealCategory::Extra)
    }
}

impl std::fmt::Display for MealCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MealCategory::Guest => "guest",
            MealCategory::Extra => "extra",
            MealCategory::Rv => "rv",
            MealCategory::DayWorker => "day_worker",
            MealCategory::Shelter => "shelter",
            MealCategory::UnitedEffort => "united_effort",
            MealCategory::LunchBag => "lunch_bag",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for MealCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(MealCategory::Guest),
            "extra" => Ok(MealCategory::Extra),
            "rv" => Ok(MealCategory::Rv),
            "day_worker" => Ok(MealCategory::DayWorker),
            "shelter" => Ok(MealCategory::Shelter),
            "united_effort" => Ok(MealCategory::UnitedEffort),
            "lunch_bag" => Ok(MealCategory::LunchBag),
            _ => Err(anyhow::anyhow!("Unknown meal category: {s}")),
        }
    }
}

/// DB row struct. `date` stays the stored string: imported rows carry either
/// a full ISO-8601 instant or a bare YYYY-MM-DD date, and calendar bucketing
/// always goes through the civil-date parser. `category` is TEXT, parsed at
/// the edge like user roles.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MealRecord {
    pub id: Uuid,
    pub guest_id: Option<Uuid>,
    pub category: String,
    pub date: String,
    pub count: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct LogGuestMealRequest {
    pub guest_id: Uuid,
    /// "guest" or "extra"; defaults to a base guest meal.
    pub category: Option<MealCategory>,
    pub count: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct BatchMealRequest {
    pub category: MealCategory,
    /// Bare calendar date or full timestamp; defaults to now.
    pub date: Option<String>,
    pub count: i32,
}

/// Query params for GET /meals and the report routes.
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    /// 0-based month, 0 = January (matches the stored report conventions).
    pub month: u32,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteQuery {
    pub category: MealCategory,
    pub year: i32,
    pub month: u32,
}

/// Aggregate outcome of a bulk delete: individual deletes are independent,
/// failures do not stop the batch and nothing is rolled back.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BulkDeleteOutcome {
    pub deleted: usize,
    pub failed: usize,
}
