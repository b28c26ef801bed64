//! Service-slot generation and availability resolution for shower and
//! laundry bookings. Pure functions over already-fetched records: the slot
//! grid for a day is entirely determined by (service type, weekday vs
//! Saturday), and availability combines that grid with same-date bookings
//! and administrative blocks.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::models::booking::{BlockedSlot, BookingRecord, ServiceType};

struct SlotGrid {
    start_hour: u32,
    start_minute: u32,
    slot_minutes: u32,
    count: u32,
    /// Laundry labels span the whole slot ("07:30 - 08:30"); shower labels
    /// are just the start time.
    range_labels: bool,
}

fn grid_for(service: ServiceType, saturday: bool) -> SlotGrid {
    match (service, saturday) {
        (ServiceType::Shower, false) => SlotGrid {
            start_hour: 7,
            start_minute: 30,
            slot_minutes: 30,
            count: 8,
            range_labels: false,
        },
        (ServiceType::Shower, true) => SlotGrid {
            start_hour: 8,
            start_minute: 30,
            slot_minutes: 30,
            count: 6,
            range_labels: false,
        },
        (ServiceType::Laundry, false) => SlotGrid {
            start_hour: 7,
            start_minute: 30,
            slot_minutes: 60,
            count: 5,
            range_labels: true,
        },
        (ServiceType::Laundry, true) => SlotGrid {
            start_hour: 8,
            start_minute: 30,
            slot_minutes: 60,
            count: 4,
            range_labels: true,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    /// Canonical label stored on bookings and blocks ("08:00" or
    /// "07:30 - 08:30").
    pub label: String,
    /// 12-hour rendering for display ("8:00 AM", "7:30 AM - 8:30 AM").
    pub display_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotStatus {
    Open,
    Booked { count: u32 },
    Blocked,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotWithStatus {
    #[serde(flatten)]
    pub slot: Slot,
    #[serde(flatten)]
    pub status: SlotStatus,
}

fn hhmm(total_minutes: u32) -> String {
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// "07:30" -> "7:30 AM", "13:00" -> "1:00 PM". Unparseable labels pass
/// through unchanged.
pub fn format_time_12h(label: &str) -> String {
    let Some((h, m)) = label.split_once(':') else {
        return label.to_string();
    };
    let (Ok(h), Ok(m)) = (h.parse::<u32>(), m.parse::<u32>()) else {
        return label.to_string();
    };
    let suffix = if h < 12 { "AM" } else { "PM" };
    let hour12 = match h % 12 {
        0 => 12,
        other => other,
    };
    format!("{hour12}:{m:02} {suffix}")
}

/// Format a stored slot label (single time or range) for display.
pub fn format_slot_label(label: &str) -> String {
    match label.split_once(" - ") {
        Some((start, end)) => format!("{} - {}", format_time_12h(start), format_time_12h(end)),
        None => format_time_12h(label),
    }
}

/// The ordered, non-empty slot list for one service on one calendar day.
pub fn generate_slots(service: ServiceType, date: NaiveDate) -> Vec<Slot> {
    let grid = grid_for(service, date.weekday() == Weekday::Sat);
    (0..grid.count)
        .map(|i| {
            let start = grid.start_hour * 60 + grid.start_minute + i * grid.slot_minutes;
            let label = if grid.range_labels {
                format!("{} - {}", hhmm(start), hhmm(start + grid.slot_minutes))
            } else {
                hhmm(start)
            };
            let display_label = format_slot_label(&label);
            Slot { label, display_label }
        })
        .collect()
}

/// Active (non-cancelled) bookings occupying one slot on one date. Bookings
/// from any other date never occupy a slot, and linked bookings may share
/// one slot, hence a count rather than a flag.
pub fn active_booking_count(
    service: ServiceType,
    date: NaiveDate,
    label: &str,
    bookings: &[BookingRecord],
) -> u32 {
    bookings
        .iter()
        .filter(|b| {
            b.service_type == service.to_string()
                && b.date == date
                && b.time == label
                && !b.is_cancelled()
        })
        .count() as u32
}

pub fn is_blocked(
    service: ServiceType,
    date: NaiveDate,
    label: &str,
    blocks: &[BlockedSlot],
) -> bool {
    blocks
        .iter()
        .any(|s| s.service_type == service.to_string() && s.date == date && s.time == label)
}

/// An administrative block closes the slot regardless of bookings.
pub fn resolve_status(
    service: ServiceType,
    date: NaiveDate,
    label: &str,
    bookings: &[BookingRecord],
    blocks: &[BlockedSlot],
) -> SlotStatus {
    if is_blocked(service, date, label, blocks) {
        return SlotStatus::Blocked;
    }
    match active_booking_count(service, date, label, bookings) {
        0 => SlotStatus::Open,
        count => SlotStatus::Booked { count },
    }
}

/// Every slot of the day with its resolved status, in label order.
pub fn slot_board(
    service: ServiceType,
    date: NaiveDate,
    bookings: &[BookingRecord],
    blocks: &[BlockedSlot],
) -> Vec<SlotWithStatus> {
    generate_slots(service, date)
        .into_iter()
        .map(|slot| {
            let status = resolve_status(service, date, &slot.label, bookings, blocks);
            SlotWithStatus { slot, status }
        })
        .collect()
}

/// Whether a slot can take one more manual booking. Open slots always can;
/// a Booked slot only when the new booking is linked to the occupant and
/// shares it; a Blocked slot never, links included.
pub fn accepts_booking(status: SlotStatus, link: bool) -> bool {
    match status {
        SlotStatus::Open => true,
        SlotStatus::Booked { .. } => link,
        SlotStatus::Blocked => false,
    }
}

/// The earliest Open slot of the day, or `None` when every slot is booked or
/// blocked — exhaustion is reported, never guessed around.
pub fn next_available(
    service: ServiceType,
    date: NaiveDate,
    bookings: &[BookingRecord],
    blocks: &[BlockedSlot],
) -> Option<Slot> {
    slot_board(service, date, bookings, blocks)
        .into_iter()
        .find(|s| s.status == SlotStatus::Open)
        .map(|s| s.slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
    }

    fn booking(service: ServiceType, date: NaiveDate, time: &str, status: &str) -> BookingRecord {
        BookingRecord {
            id: Uuid::new_v4(),
            service_type: service.to_string(),
            guest_id: Uuid::new_v4(),
            date,
            time: time.to_string(),
            status: status.to_string(),
            created_at: Utc::now(),
        }
    }

    fn block(service: ServiceType, date: NaiveDate, time: &str) -> BlockedSlot {
        BlockedSlot {
            id: Uuid::new_v4(),
            service_type: service.to_string(),
            date,
            time: time.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn weekday_shower_slots_start_earlier_than_saturday() {
        let weekday = generate_slots(ServiceType::Shower, monday());
        let sat = generate_slots(ServiceType::Shower, saturday());
        assert_eq!(weekday[0].label, "07:30");
        assert_eq!(sat[0].label, "08:30");
        assert_ne!(weekday[0].label, sat[0].label);
        assert_eq!(weekday.len(), 8);
        assert_eq!(sat.len(), 6);
    }

    #[test]
    fn laundry_slots_are_hour_ranges_and_vary_by_day() {
        let weekday = generate_slots(ServiceType::Laundry, monday());
        let sat = generate_slots(ServiceType::Laundry, saturday());
        assert_eq!(weekday.len(), 5);
        assert_eq!(weekday[0].label, "07:30 - 08:30");
        assert_eq!(weekday[0].display_label, "7:30 AM - 8:30 AM");
        assert_ne!(weekday[0].label, sat[0].label);
        assert_eq!(sat[0].label, "08:30 - 09:30");
    }

    #[test]
    fn shower_slots_are_ordered_half_hours() {
        let slots = generate_slots(ServiceType::Shower, monday());
        let labels: Vec<&str> = slots.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            ["07:30", "08:00", "08:30", "09:00", "09:30", "10:00", "10:30", "11:00"]
        );
    }

    #[test]
    fn twelve_hour_formatting() {
        assert_eq!(format_time_12h("07:30"), "7:30 AM");
        assert_eq!(format_time_12h("00:15"), "12:15 AM");
        assert_eq!(format_time_12h("12:00"), "12:00 PM");
        assert_eq!(format_time_12h("13:30"), "1:30 PM");
        assert_eq!(format_slot_label("07:30 - 08:30"), "7:30 AM - 8:30 AM");
    }

    #[test]
    fn next_available_skips_booked_and_blocked() {
        let date = monday();
        let bookings = vec![booking(ServiceType::Shower, date, "07:30", "booked")];
        let blocks = vec![block(ServiceType::Shower, date, "08:00")];
        let next = next_available(ServiceType::Shower, date, &bookings, &blocks).unwrap();
        assert_eq!(next.label, "08:30");
    }

    #[test]
    fn cancelled_bookings_do_not_occupy_slots() {
        let date = monday();
        let bookings = vec![booking(ServiceType::Shower, date, "07:30", "cancelled")];
        let next = next_available(ServiceType::Shower, date, &bookings, &[]).unwrap();
        assert_eq!(next.label, "07:30");
    }

    #[test]
    fn bookings_from_other_dates_never_occupy_slots() {
        let past = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let bookings = vec![booking(ServiceType::Laundry, past, "07:30 - 08:30", "done")];
        let next = next_available(ServiceType::Laundry, monday(), &bookings, &[]).unwrap();
        assert_eq!(next.label, "07:30 - 08:30");
    }

    #[test]
    fn bookings_from_other_services_never_occupy_slots() {
        let date = monday();
        let bookings = vec![booking(ServiceType::Laundry, date, "07:30", "booked")];
        assert_eq!(
            resolve_status(ServiceType::Shower, date, "07:30", &bookings, &[]),
            SlotStatus::Open
        );
    }

    #[test]
    fn exhaustion_is_reported_not_guessed() {
        let date = monday();
        let bookings: Vec<BookingRecord> = generate_slots(ServiceType::Shower, date)
            .iter()
            .map(|s| booking(ServiceType::Shower, date, &s.label, "booked"))
            .collect();
        assert!(next_available(ServiceType::Shower, date, &bookings, &[]).is_none());
    }

    #[test]
    fn linked_bookings_share_a_slot_with_a_count() {
        let date = monday();
        let bookings = vec![
            booking(ServiceType::Shower, date, "09:00", "booked"),
            booking(ServiceType::Shower, date, "09:00", "booked"),
        ];
        assert_eq!(
            resolve_status(ServiceType::Shower, date, "09:00", &bookings, &[]),
            SlotStatus::Booked { count: 2 }
        );
    }

    #[test]
    fn booked_slots_admit_only_linked_bookings() {
        assert!(accepts_booking(SlotStatus::Open, false));
        assert!(accepts_booking(SlotStatus::Open, true));
        assert!(!accepts_booking(SlotStatus::Booked { count: 1 }, false));
        assert!(accepts_booking(SlotStatus::Booked { count: 1 }, true));
    }

    #[test]
    fn blocked_slots_admit_nothing_links_included() {
        assert!(!accepts_booking(SlotStatus::Blocked, false));
        assert!(!accepts_booking(SlotStatus::Blocked, true));
    }

    #[test]
    fn a_block_closes_the_slot_even_with_bookings() {
        let date = monday();
        let bookings = vec![booking(ServiceType::Shower, date, "09:00", "booked")];
        let blocks = vec![block(ServiceType::Shower, date, "09:00")];
        assert_eq!(
            resolve_status(ServiceType::Shower, date, "09:00", &bookings, &blocks),
            SlotStatus::Blocked
        );
    }

    #[test]
    fn slot_board_defaults_to_all_open() {
        let board = slot_board(ServiceType::Shower, monday(), &[], &[]);
        assert_eq!(board.len(), 8);
        assert!(board.iter().all(|s| s.status == SlotStatus::Open));
    }
}
