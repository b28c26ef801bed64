use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::guest::{CreateGuestRequest, Guest, UpdateGuestRequest},
    models::meal::MealRecord,
    services::civil_date::civil_today,
    services::meal_report::recent_guest_ids,
};

/// Trailing window for the "recent guests" quick list at check-in.
const RECENT_WINDOW_DAYS: i64 = 7;

pub struct GuestService;

impl GuestService {
    pub async fn list(pool: &PgPool) -> anyhow::Result<Vec<Guest>> {
        let guests = sqlx::query_as::<_, Guest>(
            "SELECT * FROM guests WHERE is_active = TRUE ORDER BY last_name, first_name",
        )
        .fetch_all(pool)
        .await?;
        Ok(guests)
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Guest>> {
        let guest = sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(guest)
    }

    pub async fn create(pool: &PgPool, req: &CreateGuestRequest) -> anyhow::Result<Guest> {
        let guest = sqlx::query_as::<_, Guest>(
            "INSERT INTO guests (first_name, last_name, notes)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.notes)
        .fetch_one(pool)
        .await?;
        Ok(guest)
    }

    pub async fn update(pool: &PgPool, id: Uuid, req: &UpdateGuestRequest) -> anyhow::Result<Guest> {
        let guest = sqlx::query_as::<_, Guest>(
            "UPDATE guests
             SET first_name          = COALESCE($1, first_name),
                 last_name           = COALESCE($2, last_name),
                 notes               = COALESCE($3, notes),
                 banned_from_bicycle = COALESCE($4, banned_from_bicycle),
                 is_active           = COALESCE($5, is_active),
                 updated_at          = NOW()
             WHERE id = $6
             RETURNING *",
        )
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.notes)
        .bind(req.banned_from_bicycle)
        .bind(req.is_active)
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(guest)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM guests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Guests with meal activity in the trailing window. The created_at
    /// cutoff is generous by a day; the precise civil-day boundary comes from
    /// the report core.
    pub async fn recent(pool: &PgPool, tz: Tz, now: DateTime<Utc>) -> anyhow::Result<Vec<Guest>> {
        let cutoff = now - chrono::Duration::days(RECENT_WINDOW_DAYS + 1);
        let records = sqlx::query_as::<_, MealRecord>(
            "SELECT * FROM meal_records WHERE guest_id IS NOT NULL AND created_at >= $1",
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await?;

        let today = civil_today(now, tz);
        let ids: Vec<Uuid> = recent_guest_ids(&records, today, RECENT_WINDOW_DAYS, tz)
            .into_iter()
            .collect();

        let guests = sqlx::query_as::<_, Guest>(
            "SELECT * FROM guests
             WHERE id = ANY($1) AND is_active = TRUE
             ORDER BY last_name, first_name",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;
        Ok(guests)
    }
}
