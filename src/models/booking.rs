use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Shower,
    Laundry,
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServiceType::Shower => "shower",
            ServiceType::Laundry => "laundry",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ServiceType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shower" => Ok(ServiceType::Shower),
            "laundry" => Ok(ServiceType::Laundry),
            _ => Err(anyhow::anyhow!("Unknown service type: {s}")),
        }
    }
}

/// DB row struct. `time` is the slot label exactly as generated
/// ("07:30" for showers, "07:30 - 08:30" for laundry).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookingRecord {
    pub id: Uuid,
    pub service_type: String,
    pub guest_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl BookingRecord {
    pub fn is_cancelled(&self) -> bool {
        self.status == "cancelled"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlockedSlot {
    pub id: Uuid,
    pub service_type: String,
    pub date: NaiveDate,
    pub time: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub guest_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    /// Book into an already-booked slot, sharing it with the existing
    /// occupant (e.g. a guest and their partner taking one laundry slot).
    #[serde(default)]
    pub link: bool,
}

#[derive(Debug, Deserialize)]
pub struct NextAvailableRequest {
    pub guest_id: Uuid,
    /// Defaults to today in the report timezone.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct BlockSlotRequest {
    pub service_type: ServiceType,
    pub date: NaiveDate,
    pub time: String,
    /// Must be true to block a slot that already has active bookings.
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct UnblockSlotQuery {
    pub service_type: ServiceType,
    pub date: NaiveDate,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct SlotBoardQuery {
    pub date: NaiveDate,
}
