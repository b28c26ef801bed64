pub mod auth;
pub mod bicycle;
pub mod booking;
pub mod guest;
pub mod meal;
pub mod reminder;
pub mod report;
pub mod user;
