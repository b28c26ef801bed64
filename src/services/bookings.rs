use chrono::NaiveDate;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::booking::{
        BlockSlotRequest, BlockedSlot, BookingRecord, CreateBookingRequest, ServiceType,
    },
    services::slots::{self, Slot, SlotWithStatus},
};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("no open {service} slots remain for {date}")]
    Exhausted { service: ServiceType, date: NaiveDate },
    #[error("slot {time} is not open for booking")]
    SlotUnavailable { time: String },
    #[error("slot {time} has {active} active booking(s); confirmation required")]
    ConfirmationRequired { time: String, active: u32 },
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}

/// Blocking over live bookings needs an explicit confirmation from the
/// caller; declining leaves every booking and the slot untouched.
fn needs_confirmation(confirm: bool, active: u32) -> bool {
    !confirm && active > 0
}

pub struct BookingService;

impl BookingService {
    pub async fn list_for_date(
        pool: &PgPool,
        service: ServiceType,
        date: NaiveDate,
    ) -> Result<Vec<BookingRecord>, sqlx::Error> {
        let bookings = sqlx::query_as::<_, BookingRecord>(
            "SELECT * FROM booking_records
             WHERE service_type = $1 AND date = $2
             ORDER BY time",
        )
        .bind(service.to_string())
        .bind(date)
        .fetch_all(pool)
        .await?;
        Ok(bookings)
    }

    pub async fn blocked_for_date(
        pool: &PgPool,
        service: ServiceType,
        date: NaiveDate,
    ) -> Result<Vec<BlockedSlot>, sqlx::Error> {
        let blocked = sqlx::query_as::<_, BlockedSlot>(
            "SELECT * FROM blocked_slots WHERE service_type = $1 AND date = $2",
        )
        .bind(service.to_string())
        .bind(date)
        .fetch_all(pool)
        .await?;
        Ok(blocked)
    }

    /// The full slot board for one service and date: every generated slot
    /// with its Open / Booked / Blocked status.
    pub async fn board(
        pool: &PgPool,
        service: ServiceType,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<SlotWithStatus>> {
        let bookings = Self::list_for_date(pool, service, date).await?;
        let blocked = Self::blocked_for_date(pool, service, date).await?;
        Ok(slots::slot_board(service, date, &bookings, &blocked))
    }

    /// Book a specific slot (staff manual grid). The slot must exist in the
    /// day's grid and admit the booking — Open always does, a Booked slot
    /// only for a linked booking sharing it. The partial unique index
    /// backstops two clients racing to book the same guest into one slot.
    pub async fn book(
        pool: &PgPool,
        service: ServiceType,
        req: &CreateBookingRequest,
    ) -> Result<BookingRecord, BookingError> {
        let grid = slots::generate_slots(service, req.date);
        if !grid.iter().any(|s| s.label == req.time) {
            return Err(BookingError::SlotUnavailable { time: req.time.clone() });
        }

        let bookings = Self::list_for_date(pool, service, req.date).await?;
        let blocked = Self::blocked_for_date(pool, service, req.date).await?;
        let status = slots::resolve_status(service, req.date, &req.time, &bookings, &blocked);
        if !slots::accepts_booking(status, req.link) {
            return Err(BookingError::SlotUnavailable { time: req.time.clone() });
        }

        Self::insert(pool, service, req.guest_id, req.date, &req.time).await
    }

    /// The check-in quick action: find the earliest open slot and book it.
    /// Exhaustion is reported to the caller, never papered over.
    pub async fn book_next_available(
        pool: &PgPool,
        service: ServiceType,
        guest_id: Uuid,
        date: NaiveDate,
    ) -> Result<(BookingRecord, Slot), BookingError> {
        let bookings = Self::list_for_date(pool, service, date).await?;
        let blocked = Self::blocked_for_date(pool, service, date).await?;
        let slot = slots::next_available(service, date, &bookings, &blocked)
            .ok_or(BookingError::Exhausted { service, date })?;
        let record = Self::insert(pool, service, guest_id, date, &slot.label).await?;
        Ok((record, slot))
    }

    async fn insert(
        pool: &PgPool,
        service: ServiceType,
        guest_id: Uuid,
        date: NaiveDate,
        time: &str,
    ) -> Result<BookingRecord, BookingError> {
        sqlx::query_as::<_, BookingRecord>(
            "INSERT INTO booking_records (service_type, guest_id, date, time)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(service.to_string())
        .bind(guest_id)
        .bind(date)
        .bind(time)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            // The guest already holds this slot (two clients racing the same
            // check-in): surface it as unavailable so the caller refreshes.
            if is_unique_violation(&e) {
                BookingError::SlotUnavailable { time: time.to_string() }
            } else {
                BookingError::Db(e)
            }
        })
    }

    pub async fn cancel(pool: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE booking_records SET status = 'cancelled' WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Administratively close a slot. Blocking a slot that already has
    /// active bookings needs an explicit confirmation signal from the
    /// caller; without it the request is rejected with the booking count and
    /// nothing changes.
    pub async fn block_slot(
        pool: &PgPool,
        req: &BlockSlotRequest,
    ) -> Result<BlockedSlot, BookingError> {
        let bookings = Self::list_for_date(pool, req.service_type, req.date).await?;
        let active =
            slots::active_booking_count(req.service_type, req.date, &req.time, &bookings);
        if needs_confirmation(req.confirm, active) {
            return Err(BookingError::ConfirmationRequired {
                time: req.time.clone(),
                active,
            });
        }

        let blocked = sqlx::query_as::<_, BlockedSlot>(
            "INSERT INTO blocked_slots (service_type, date, time)
             VALUES ($1, $2, $3)
             ON CONFLICT (service_type, date, time) DO UPDATE SET time = EXCLUDED.time
             RETURNING *",
        )
        .bind(req.service_type.to_string())
        .bind(req.date)
        .bind(&req.time)
        .fetch_one(pool)
        .await?;
        Ok(blocked)
    }

    pub async fn unblock_slot(
        pool: &PgPool,
        service: ServiceType,
        date: NaiveDate,
        time: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "DELETE FROM blocked_slots WHERE service_type = $1 AND date = $2 AND time = $3",
        )
        .bind(service.to_string())
        .bind(date)
        .bind(time)
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocking_a_live_slot_without_confirming_is_rejected() {
        assert!(needs_confirmation(false, 1));
        assert!(needs_confirmation(false, 3));
    }

    #[test]
    fn confirming_or_an_empty_slot_goes_through() {
        assert!(!needs_confirmation(false, 0));
        assert!(!needs_confirmation(true, 1));
        assert!(!needs_confirmation(true, 0));
    }
}
