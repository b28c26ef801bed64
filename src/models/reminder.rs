use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Service scopes a reminder can target. "all" surfaces the reminder on
/// every service card.
pub const REMINDER_SERVICES: [&str; 5] = ["all", "meal", "shower", "laundry", "bicycle"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GuestReminder {
    pub id: Uuid,
    pub guest_id: Uuid,
    pub message: String,
    pub services: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl GuestReminder {
    pub fn is_active(&self) -> bool {
        self.dismissed_at.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub message: String,
    pub services: Option<Vec<String>>,
}
