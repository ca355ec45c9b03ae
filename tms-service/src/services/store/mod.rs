//! Persistence seam.
//!
//! `PgStore` is the production backend; `MemoryStore` backs local runs
//! and the integration tests. Handlers and batch jobs only see the
//! trait.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{
    AuditLog, AutoReminderKey, CreateAuditLog, CreateChannel, CreateRecipient, CreateReminder,
    CreateSchedule, CreateStation, CreateTax, EmailRecipient, ListTaxesFilter, OutboundChannel,
    Reminder, ReminderSchedule, ReminderType, Station, Tax, TaxStatus, UpdateChannel,
    UpdateRecipient, UpdateSchedule, UpdateStation, UpdateTax,
};

#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;

    // Charging stations
    async fn create_station(&self, input: &CreateStation) -> Result<Station, AppError>;
    async fn list_stations(&self) -> Result<Vec<Station>, AppError>;
    async fn get_station(&self, station_id: Uuid) -> Result<Option<Station>, AppError>;
    async fn update_station(
        &self,
        station_id: Uuid,
        input: &UpdateStation,
    ) -> Result<Option<Station>, AppError>;
    async fn delete_station(&self, station_id: Uuid) -> Result<bool, AppError>;
    /// Obligations referencing the station; deletion is blocked while
    /// this is non-zero.
    async fn count_taxes_for_station(&self, station_id: Uuid) -> Result<i64, AppError>;

    // Tax obligations
    async fn create_tax(&self, input: &CreateTax) -> Result<Tax, AppError>;
    async fn list_taxes(&self, filter: &ListTaxesFilter) -> Result<Vec<Tax>, AppError>;
    async fn get_tax(&self, tax_id: Uuid) -> Result<Option<Tax>, AppError>;
    async fn update_tax(&self, tax_id: Uuid, input: &UpdateTax) -> Result<Option<Tax>, AppError>;
    async fn update_tax_status(
        &self,
        tax_id: Uuid,
        status: TaxStatus,
    ) -> Result<Option<Tax>, AppError>;
    async fn delete_tax(&self, tax_id: Uuid) -> Result<bool, AppError>;
    /// Non-completed obligations that have a due date, for the
    /// generator.
    async fn list_open_taxes_with_due_date(&self) -> Result<Vec<Tax>, AppError>;
    /// Non-completed obligations due on exactly this date, for the
    /// dispatcher sweep.
    async fn list_open_taxes_due_on(&self, due: NaiveDate) -> Result<Vec<Tax>, AppError>;

    // Reminder schedules
    async fn create_schedule(&self, input: &CreateSchedule) -> Result<ReminderSchedule, AppError>;
    async fn list_schedules(&self) -> Result<Vec<ReminderSchedule>, AppError>;
    async fn list_active_schedules(&self) -> Result<Vec<ReminderSchedule>, AppError>;
    async fn update_schedule(
        &self,
        schedule_id: Uuid,
        input: &UpdateSchedule,
    ) -> Result<Option<ReminderSchedule>, AppError>;
    async fn delete_schedule(&self, schedule_id: Uuid) -> Result<bool, AppError>;

    // Outbound channels
    async fn create_channel(&self, input: &CreateChannel) -> Result<OutboundChannel, AppError>;
    async fn list_channels(&self) -> Result<Vec<OutboundChannel>, AppError>;
    async fn list_active_channels(&self) -> Result<Vec<OutboundChannel>, AppError>;
    async fn list_active_channels_by_ids(
        &self,
        channel_ids: &[Uuid],
    ) -> Result<Vec<OutboundChannel>, AppError>;
    async fn get_channel(&self, channel_id: Uuid) -> Result<Option<OutboundChannel>, AppError>;
    async fn update_channel(
        &self,
        channel_id: Uuid,
        input: &UpdateChannel,
    ) -> Result<Option<OutboundChannel>, AppError>;
    async fn delete_channel(&self, channel_id: Uuid) -> Result<bool, AppError>;

    // Email recipients
    async fn create_recipient(&self, input: &CreateRecipient) -> Result<EmailRecipient, AppError>;
    async fn list_recipients(&self) -> Result<Vec<EmailRecipient>, AppError>;
    async fn list_active_recipients(&self) -> Result<Vec<EmailRecipient>, AppError>;
    async fn update_recipient(
        &self,
        recipient_id: Uuid,
        input: &UpdateRecipient,
    ) -> Result<Option<EmailRecipient>, AppError>;
    async fn delete_recipient(&self, recipient_id: Uuid) -> Result<bool, AppError>;

    // Reminders
    async fn create_reminder(&self, input: &CreateReminder) -> Result<Reminder, AppError>;
    async fn list_reminders(
        &self,
        notification_type: Option<ReminderType>,
        is_sent: Option<bool>,
    ) -> Result<Vec<Reminder>, AppError>;
    async fn get_reminder(&self, reminder_id: Uuid) -> Result<Option<Reminder>, AppError>;
    async fn delete_reminder(&self, reminder_id: Uuid) -> Result<bool, AppError>;
    /// True when an auto reminder already exists for this key.
    async fn auto_reminder_exists(&self, key: &AutoReminderKey) -> Result<bool, AppError>;
    /// Unsent manual reminders scheduled on exactly this date.
    async fn list_due_manual_reminders(&self, date: NaiveDate) -> Result<Vec<Reminder>, AppError>;
    async fn mark_reminder_sent(
        &self,
        reminder_id: Uuid,
        sent_utc: DateTime<Utc>,
    ) -> Result<(), AppError>;

    // Audit trail
    async fn insert_audit_log(&self, input: &CreateAuditLog) -> Result<AuditLog, AppError>;
    async fn list_audit_logs(&self, limit: i64) -> Result<Vec<AuditLog>, AppError>;
}
