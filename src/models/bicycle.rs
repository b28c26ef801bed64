use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Repair type marking a bicycle give-away, subject to the six-month rule.
pub const NEW_BICYCLE: &str = "New Bicycle";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BicycleRecord {
    pub id: Uuid,
    pub guest_id: Uuid,
    pub repair_types: Vec<String>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBicycleRequest {
    pub guest_id: Uuid,
    pub repair_types: Vec<String>,
    pub description: Option<String>,
}
