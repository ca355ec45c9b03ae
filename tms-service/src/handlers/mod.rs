//! HTTP request handlers.

pub mod audit;
pub mod channels;
pub mod extraction;
pub mod health;
pub mod jobs;
pub mod notifications;
pub mod recipients;
pub mod reminders;
pub mod schedules;
pub mod stations;
pub mod statistics;
pub mod taxes;
