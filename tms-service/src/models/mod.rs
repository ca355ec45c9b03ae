//! Domain models for tms-service.

mod audit_log;
mod channel;
mod recipient;
mod reminder;
mod schedule;
mod station;
mod tax;

pub use audit_log::{AuditAction, AuditLog, CreateAuditLog};
pub use channel::{CreateChannel, OutboundChannel, UpdateChannel};
pub use recipient::{CreateRecipient, EmailRecipient, UpdateRecipient};
pub use reminder::{AutoReminderKey, CreateReminder, Reminder, ReminderType};
pub use schedule::{CreateSchedule, ReminderSchedule, UpdateSchedule};
pub use station::{CreateStation, Station, StationStatus, UpdateStation};
pub use tax::{CreateTax, ListTaxesFilter, Tax, TaxStatus, TaxType, UpdateTax};
