use sqlx::PgPool;
use uuid::Uuid;

use crate::models::reminder::{CreateReminderRequest, GuestReminder, REMINDER_SERVICES};

pub struct ReminderService;

impl ReminderService {
    /// All reminders for a guest, dismissed ones included, newest first.
    pub async fn list_for_guest(pool: &PgPool, guest_id: Uuid) -> anyhow::Result<Vec<GuestReminder>> {
        let reminders = sqlx::query_as::<_, GuestReminder>(
            "SELECT * FROM guest_reminders WHERE guest_id = $1 ORDER BY created_at DESC",
        )
        .bind(guest_id)
        .fetch_all(pool)
        .await?;
        Ok(reminders)
    }

    /// Only the reminders that should still surface on service cards.
    pub async fn active_for_guest(
        pool: &PgPool,
        guest_id: Uuid,
    ) -> anyhow::Result<Vec<GuestReminder>> {
        let reminders = sqlx::query_as::<_, GuestReminder>(
            "SELECT * FROM guest_reminders
             WHERE guest_id = $1 AND dismissed_at IS NULL
             ORDER BY created_at DESC",
        )
        .bind(guest_id)
        .fetch_all(pool)
        .await?;
        Ok(reminders)
    }

    pub async fn add(
        pool: &PgPool,
        guest_id: Uuid,
        req: &CreateReminderRequest,
    ) -> anyhow::Result<GuestReminder> {
        let message = req.message.trim();
        anyhow::ensure!(!message.is_empty(), "Reminder message must not be empty");

        let services = match &req.services {
            Some(list) if !list.is_empty() => {
                for s in list {
                    anyhow::ensure!(
                        REMINDER_SERVICES.contains(&s.as_str()),
                        "Unknown reminder service: {s}"
                    );
                }
                list.clone()
            }
            _ => vec!["all".to_string()],
        };

        let reminder = sqlx::query_as::<_, GuestReminder>(
            "INSERT INTO guest_reminders (guest_id, message, services)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(guest_id)
        .bind(message)
        .bind(&services)
        .fetch_one(pool)
        .await?;
        Ok(reminder)
    }

    /// Dismiss keeps the row for history; delete removes it outright.
    pub async fn dismiss(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE guest_reminders SET dismissed_at = NOW()
             WHERE id = $1 AND dismissed_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM guest_reminders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
