use chrono::{DateTime, Months, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::bicycle::{BicycleRecord, CreateBicycleRequest, NEW_BICYCLE};

#[derive(Debug, Error)]
pub enum BicycleError {
    #[error("guest is banned from bicycle services")]
    GuestBanned,
    #[error("guest received a new bicycle within the last 6 months")]
    NewBicycleTooSoon,
    #[error("guest not found")]
    GuestNotFound,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

pub struct BicycleService;

impl BicycleService {
    /// Pending repairs in first-come-first-served order.
    pub async fn queue(pool: &PgPool) -> anyhow::Result<Vec<BicycleRecord>> {
        let records = sqlx::query_as::<_, BicycleRecord>(
            "SELECT * FROM bicycle_records WHERE status = 'pending' ORDER BY created_at",
        )
        .fetch_all(pool)
        .await?;
        Ok(records)
    }

    pub async fn create(
        pool: &PgPool,
        req: &CreateBicycleRequest,
        now: DateTime<Utc>,
    ) -> Result<BicycleRecord, BicycleError> {
        let banned: Option<bool> =
            sqlx::query_scalar("SELECT banned_from_bicycle FROM guests WHERE id = $1")
                .bind(req.guest_id)
                .fetch_optional(pool)
                .await?;
        match banned {
            None => return Err(BicycleError::GuestNotFound),
            Some(true) => return Err(BicycleError::GuestBanned),
            Some(false) => {}
        }

        // One new bicycle per guest per six months; ordinary repairs do not
        // count toward the limit.
        if req.repair_types.iter().any(|t| t == NEW_BICYCLE) {
            let cutoff = now.checked_sub_months(Months::new(6)).unwrap_or(now);
            let recent: bool = sqlx::query_scalar(
                "SELECT EXISTS(
                     SELECT 1 FROM bicycle_records
                     WHERE guest_id = $1
                       AND $2 = ANY(repair_types)
                       AND status <> 'cancelled'
                       AND created_at >= $3
                 )",
            )
            .bind(req.guest_id)
            .bind(NEW_BICYCLE)
            .bind(cutoff)
            .fetch_one(pool)
            .await?;
            if recent {
                return Err(BicycleError::NewBicycleTooSoon);
            }
        }

        let description = req
            .description
            .as_deref()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty());

        let record = sqlx::query_as::<_, BicycleRecord>(
            "INSERT INTO bicycle_records (guest_id, repair_types, description)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(req.guest_id)
        .bind(&req.repair_types)
        .bind(description)
        .fetch_one(pool)
        .await?;
        Ok(record)
    }

    pub async fn complete(pool: &PgPool, id: Uuid) -> anyhow::Result<BicycleRecord> {
        let record = sqlx::query_as::<_, BicycleRecord>(
            "UPDATE bicycle_records
             SET status = 'completed', completed_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(record)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM bicycle_records WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
