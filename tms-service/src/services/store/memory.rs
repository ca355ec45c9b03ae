//! In-memory store for local runs and tests.
//!
//! Mirrors the PostgreSQL semantics the handlers rely on, including
//! the cascade behavior of the reminder foreign keys. Data is lost
//! when the store is dropped.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    AuditLog, AutoReminderKey, CreateAuditLog, CreateChannel, CreateRecipient, CreateReminder,
    CreateSchedule, CreateStation, CreateTax, EmailRecipient, ListTaxesFilter, OutboundChannel,
    Reminder, ReminderSchedule, ReminderType, Station, Tax, TaxStatus, UpdateChannel,
    UpdateRecipient, UpdateSchedule, UpdateStation, UpdateTax,
};
use crate::services::store::Store;

#[derive(Default)]
struct Tables {
    stations: HashMap<Uuid, Station>,
    taxes: HashMap<Uuid, Tax>,
    schedules: HashMap<Uuid, ReminderSchedule>,
    channels: HashMap<Uuid, OutboundChannel>,
    recipients: HashMap<Uuid, EmailRecipient>,
    reminders: HashMap<Uuid, Reminder>,
    audit_logs: Vec<AuditLog>,
}

/// Thread-safe and cheaply cloneable.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(mut rows: Vec<T>, created: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.sort_by_key(|r| std::cmp::Reverse(created(r)));
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_station(&self, input: &CreateStation) -> Result<Station, AppError> {
        let now = Utc::now();
        let station = Station {
            station_id: Uuid::new_v4(),
            station_name: input.station_name.clone(),
            location: input.location.clone(),
            address: input.address.clone(),
            status: input.status.as_str().to_string(),
            created_utc: now,
            updated_utc: now,
        };
        let mut tables = self.tables.write().await;
        tables.stations.insert(station.station_id, station.clone());
        Ok(station)
    }

    async fn list_stations(&self) -> Result<Vec<Station>, AppError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.stations.values().cloned().collect(),
            |s| s.created_utc,
        ))
    }

    async fn get_station(&self, station_id: Uuid) -> Result<Option<Station>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.stations.get(&station_id).cloned())
    }

    async fn update_station(
        &self,
        station_id: Uuid,
        input: &UpdateStation,
    ) -> Result<Option<Station>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(station) = tables.stations.get_mut(&station_id) else {
            return Ok(None);
        };
        station.station_name = input.station_name.clone();
        station.location = input.location.clone();
        station.address = input.address.clone();
        station.status = input.status.as_str().to_string();
        station.updated_utc = Utc::now();
        Ok(Some(station.clone()))
    }

    async fn delete_station(&self, station_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.stations.remove(&station_id).is_some())
    }

    async fn count_taxes_for_station(&self, station_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .taxes
            .values()
            .filter(|t| t.station_id == Some(station_id))
            .count() as i64)
    }

    async fn create_tax(&self, input: &CreateTax) -> Result<Tax, AppError> {
        let now = Utc::now();
        let tax = Tax {
            tax_id: Uuid::new_v4(),
            station_id: input.station_id,
            tax_type: input.tax_type.as_str().to_string(),
            tax_amount: input.tax_amount,
            due_date: input.due_date,
            tax_notice_number: input.tax_notice_number.clone(),
            tax_year: input.tax_year,
            tax_period: input.tax_period.clone(),
            notes: input.notes.clone(),
            status: input.status.as_str().to_string(),
            created_utc: now,
            updated_utc: now,
        };
        let mut tables = self.tables.write().await;
        tables.taxes.insert(tax.tax_id, tax.clone());
        Ok(tax)
    }

    async fn list_taxes(&self, filter: &ListTaxesFilter) -> Result<Vec<Tax>, AppError> {
        let tables = self.tables.read().await;
        let mut taxes: Vec<Tax> = tables
            .taxes
            .values()
            .filter(|t| {
                filter.station_id.is_none_or(|id| t.station_id == Some(id))
                    && filter.status.is_none_or(|s| t.status == s.as_str())
                    && filter.tax_type.is_none_or(|ty| t.tax_type == ty.as_str())
                    && filter
                        .due_after
                        .is_none_or(|d| t.due_date.is_some_and(|due| due >= d))
                    && filter
                        .due_before
                        .is_none_or(|d| t.due_date.is_some_and(|due| due <= d))
            })
            .cloned()
            .collect();
        // due_date ascending with NULLs last, then newest first
        taxes.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y).then(b.created_utc.cmp(&a.created_utc)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.created_utc.cmp(&a.created_utc),
        });
        Ok(taxes)
    }

    async fn get_tax(&self, tax_id: Uuid) -> Result<Option<Tax>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.taxes.get(&tax_id).cloned())
    }

    async fn update_tax(&self, tax_id: Uuid, input: &UpdateTax) -> Result<Option<Tax>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(tax) = tables.taxes.get_mut(&tax_id) else {
            return Ok(None);
        };
        tax.station_id = input.station_id;
        tax.tax_type = input.tax_type.as_str().to_string();
        tax.tax_amount = input.tax_amount;
        tax.due_date = input.due_date;
        tax.tax_notice_number = input.tax_notice_number.clone();
        tax.tax_year = input.tax_year;
        tax.tax_period = input.tax_period.clone();
        tax.notes = input.notes.clone();
        tax.updated_utc = Utc::now();
        Ok(Some(tax.clone()))
    }

    async fn update_tax_status(
        &self,
        tax_id: Uuid,
        status: TaxStatus,
    ) -> Result<Option<Tax>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(tax) = tables.taxes.get_mut(&tax_id) else {
            return Ok(None);
        };
        tax.status = status.as_str().to_string();
        tax.updated_utc = Utc::now();
        Ok(Some(tax.clone()))
    }

    async fn delete_tax(&self, tax_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let removed = tables.taxes.remove(&tax_id).is_some();
        if removed {
            // reminders.tax_id is ON DELETE CASCADE
            tables.reminders.retain(|_, r| r.tax_id != Some(tax_id));
        }
        Ok(removed)
    }

    async fn list_open_taxes_with_due_date(&self) -> Result<Vec<Tax>, AppError> {
        let tables = self.tables.read().await;
        let mut taxes: Vec<Tax> = tables
            .taxes
            .values()
            .filter(|t| t.status != TaxStatus::PaymentCompleted.as_str() && t.due_date.is_some())
            .cloned()
            .collect();
        taxes.sort_by_key(|t| t.due_date);
        Ok(taxes)
    }

    async fn list_open_taxes_due_on(&self, due: NaiveDate) -> Result<Vec<Tax>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .taxes
            .values()
            .filter(|t| {
                t.status != TaxStatus::PaymentCompleted.as_str() && t.due_date == Some(due)
            })
            .cloned()
            .collect())
    }

    async fn create_schedule(&self, input: &CreateSchedule) -> Result<ReminderSchedule, AppError> {
        let schedule = ReminderSchedule {
            schedule_id: Uuid::new_v4(),
            schedule_name: input.schedule_name.clone(),
            days_before: input.days_before,
            notification_time: input.notification_time,
            is_active: input.is_active,
            created_utc: Utc::now(),
        };
        let mut tables = self.tables.write().await;
        tables.schedules.insert(schedule.schedule_id, schedule.clone());
        Ok(schedule)
    }

    async fn list_schedules(&self) -> Result<Vec<ReminderSchedule>, AppError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.schedules.values().cloned().collect(),
            |s| s.created_utc,
        ))
    }

    async fn list_active_schedules(&self) -> Result<Vec<ReminderSchedule>, AppError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .schedules
                .values()
                .filter(|s| s.is_active)
                .cloned()
                .collect(),
            |s| s.created_utc,
        ))
    }

    async fn update_schedule(
        &self,
        schedule_id: Uuid,
        input: &UpdateSchedule,
    ) -> Result<Option<ReminderSchedule>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(schedule) = tables.schedules.get_mut(&schedule_id) else {
            return Ok(None);
        };
        schedule.schedule_name = input.schedule_name.clone();
        schedule.days_before = input.days_before;
        schedule.notification_time = input.notification_time;
        schedule.is_active = input.is_active;
        Ok(Some(schedule.clone()))
    }

    async fn delete_schedule(&self, schedule_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let removed = tables.schedules.remove(&schedule_id).is_some();
        if removed {
            // reminders.schedule_id is ON DELETE SET NULL
            for reminder in tables.reminders.values_mut() {
                if reminder.schedule_id == Some(schedule_id) {
                    reminder.schedule_id = None;
                }
            }
        }
        Ok(removed)
    }

    async fn create_channel(&self, input: &CreateChannel) -> Result<OutboundChannel, AppError> {
        let channel = OutboundChannel {
            channel_id: Uuid::new_v4(),
            channel_name: input.channel_name.clone(),
            webhook_url: input.webhook_url.clone(),
            is_active: input.is_active,
            created_utc: Utc::now(),
        };
        let mut tables = self.tables.write().await;
        tables.channels.insert(channel.channel_id, channel.clone());
        Ok(channel)
    }

    async fn list_channels(&self) -> Result<Vec<OutboundChannel>, AppError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.channels.values().cloned().collect(),
            |c| c.created_utc,
        ))
    }

    async fn list_active_channels(&self) -> Result<Vec<OutboundChannel>, AppError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .channels
                .values()
                .filter(|c| c.is_active)
                .cloned()
                .collect(),
            |c| c.created_utc,
        ))
    }

    async fn list_active_channels_by_ids(
        &self,
        channel_ids: &[Uuid],
    ) -> Result<Vec<OutboundChannel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .channels
            .values()
            .filter(|c| c.is_active && channel_ids.contains(&c.channel_id))
            .cloned()
            .collect())
    }

    async fn get_channel(&self, channel_id: Uuid) -> Result<Option<OutboundChannel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.channels.get(&channel_id).cloned())
    }

    async fn update_channel(
        &self,
        channel_id: Uuid,
        input: &UpdateChannel,
    ) -> Result<Option<OutboundChannel>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(channel) = tables.channels.get_mut(&channel_id) else {
            return Ok(None);
        };
        channel.channel_name = input.channel_name.clone();
        channel.webhook_url = input.webhook_url.clone();
        channel.is_active = input.is_active;
        Ok(Some(channel.clone()))
    }

    async fn delete_channel(&self, channel_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let removed = tables.channels.remove(&channel_id).is_some();
        if removed {
            // reminders.channel_id is ON DELETE SET NULL
            for reminder in tables.reminders.values_mut() {
                if reminder.channel_id == Some(channel_id) {
                    reminder.channel_id = None;
                }
            }
        }
        Ok(removed)
    }

    async fn create_recipient(&self, input: &CreateRecipient) -> Result<EmailRecipient, AppError> {
        let recipient = EmailRecipient {
            recipient_id: Uuid::new_v4(),
            email: input.email.clone(),
            name: input.name.clone(),
            is_active: input.is_active,
            created_utc: Utc::now(),
        };
        let mut tables = self.tables.write().await;
        tables
            .recipients
            .insert(recipient.recipient_id, recipient.clone());
        Ok(recipient)
    }

    async fn list_recipients(&self) -> Result<Vec<EmailRecipient>, AppError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.recipients.values().cloned().collect(),
            |r| r.created_utc,
        ))
    }

    async fn list_active_recipients(&self) -> Result<Vec<EmailRecipient>, AppError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .recipients
                .values()
                .filter(|r| r.is_active)
                .cloned()
                .collect(),
            |r| r.created_utc,
        ))
    }

    async fn update_recipient(
        &self,
        recipient_id: Uuid,
        input: &UpdateRecipient,
    ) -> Result<Option<EmailRecipient>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(recipient) = tables.recipients.get_mut(&recipient_id) else {
            return Ok(None);
        };
        recipient.email = input.email.clone();
        recipient.name = input.name.clone();
        recipient.is_active = input.is_active;
        Ok(Some(recipient.clone()))
    }

    async fn delete_recipient(&self, recipient_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.recipients.remove(&recipient_id).is_some())
    }

    async fn create_reminder(&self, input: &CreateReminder) -> Result<Reminder, AppError> {
        let reminder = Reminder {
            reminder_id: Uuid::new_v4(),
            tax_id: input.tax_id,
            notification_type: input.notification_type.as_str().to_string(),
            schedule_id: input.schedule_id,
            notification_date: input.notification_date,
            notification_time: input.notification_time,
            message: input.message.clone(),
            is_sent: false,
            sent_utc: None,
            channel_id: input.channel_id,
            created_utc: Utc::now(),
        };
        let mut tables = self.tables.write().await;
        tables.reminders.insert(reminder.reminder_id, reminder.clone());
        Ok(reminder)
    }

    async fn list_reminders(
        &self,
        notification_type: Option<ReminderType>,
        is_sent: Option<bool>,
    ) -> Result<Vec<Reminder>, AppError> {
        let tables = self.tables.read().await;
        let mut reminders: Vec<Reminder> = tables
            .reminders
            .values()
            .filter(|r| {
                notification_type.is_none_or(|t| r.notification_type == t.as_str())
                    && is_sent.is_none_or(|sent| r.is_sent == sent)
            })
            .cloned()
            .collect();
        reminders.sort_by_key(|r| (r.notification_date, r.notification_time));
        Ok(reminders)
    }

    async fn get_reminder(&self, reminder_id: Uuid) -> Result<Option<Reminder>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.reminders.get(&reminder_id).cloned())
    }

    async fn delete_reminder(&self, reminder_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.reminders.remove(&reminder_id).is_some())
    }

    async fn auto_reminder_exists(&self, key: &AutoReminderKey) -> Result<bool, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.reminders.values().any(|r| {
            r.notification_type == ReminderType::Auto.as_str()
                && r.tax_id == Some(key.tax_id)
                && r.schedule_id == Some(key.schedule_id)
                && r.notification_date == key.notification_date
                && r.notification_time == key.notification_time
        }))
    }

    async fn list_due_manual_reminders(&self, date: NaiveDate) -> Result<Vec<Reminder>, AppError> {
        let tables = self.tables.read().await;
        let mut reminders: Vec<Reminder> = tables
            .reminders
            .values()
            .filter(|r| {
                r.notification_type == ReminderType::Manual.as_str()
                    && !r.is_sent
                    && r.notification_date == date
            })
            .cloned()
            .collect();
        reminders.sort_by_key(|r| r.notification_time);
        Ok(reminders)
    }

    async fn mark_reminder_sent(
        &self,
        reminder_id: Uuid,
        sent_utc: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if let Some(reminder) = tables.reminders.get_mut(&reminder_id) {
            reminder.is_sent = true;
            reminder.sent_utc = Some(sent_utc);
        }
        Ok(())
    }

    async fn insert_audit_log(&self, input: &CreateAuditLog) -> Result<AuditLog, AppError> {
        let log = AuditLog {
            log_id: Uuid::new_v4(),
            menu: input.menu.clone(),
            action: input.action.as_str().to_string(),
            actor_id: input.actor_id.clone(),
            actor_name: input.actor_name.clone(),
            description: input.description.clone(),
            target_table: input.target_table.clone(),
            target_id: input.target_id.clone(),
            changes: input.changes.clone(),
            created_utc: Utc::now(),
        };
        let mut tables = self.tables.write().await;
        tables.audit_logs.push(log.clone());
        Ok(log)
    }

    async fn list_audit_logs(&self, limit: i64) -> Result<Vec<AuditLog>, AppError> {
        let tables = self.tables.read().await;
        let mut logs = tables.audit_logs.clone();
        logs.reverse();
        logs.truncate(limit.max(0) as usize);
        Ok(logs)
    }
}
