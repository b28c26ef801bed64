pub mod auth;
pub mod bicycles;
pub mod blocked_slots;
pub mod bookings;
pub mod guests;
pub mod health;
pub mod meals;
pub mod metrics;
pub mod reminders;
pub mod reports;
