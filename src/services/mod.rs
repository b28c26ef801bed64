pub mod auth;
pub mod auto_meals;
pub mod bicycles;
pub mod bookings;
pub mod civil_date;
pub mod guests;
pub mod meal_report;
pub mod meals;
pub mod metrics;
pub mod reminders;
pub mod reports;
pub mod slots;
