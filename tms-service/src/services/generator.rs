//! Reminder generation batch job.
//!
//! Walks every (active schedule, open obligation) pair and materializes
//! the missing future reminders. Scheduling math runs on the KST civil
//! calendar; `days_before` is pure calendar-day subtraction.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{AutoReminderKey, CreateReminder, ReminderType, TaxType};
use crate::services::clock::kst_civil_now;
use crate::services::metrics::REMINDERS_GENERATED_TOTAL;
use crate::services::store::Store;

/// Outcome of one generation pass.
#[derive(Debug, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub created: usize,
    pub skipped: usize,
    pub reason: Option<&'static str>,
}

impl GenerationOutcome {
    fn empty(reason: &'static str) -> Self {
        Self {
            created: 0,
            skipped: 0,
            reason: Some(reason),
        }
    }
}

pub fn reminder_target_date(due_date: NaiveDate, days_before: i32) -> NaiveDate {
    due_date - Duration::days(days_before as i64)
}

/// Comma-grouped KRW amount, e.g. 1250000 -> "1,250,000".
pub fn format_amount_krw(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Reminder text shown in chat channels. The station segment is
/// omitted when the obligation has no station.
pub fn format_reminder_message(
    station_name: Option<&str>,
    tax_type: TaxType,
    amount: i64,
    due_date: NaiveDate,
) -> String {
    let amount = format_amount_krw(amount);
    let due = due_date.format("%Y-%m-%d");
    match station_name {
        Some(name) => format!(
            "{} {} {}원 납부 기한 {} 리마인더",
            name,
            tax_type.label(),
            amount,
            due
        ),
        None => format!("{} {}원 납부 기한 {} 리마인더", tax_type.label(), amount, due),
    }
}

#[derive(Clone)]
pub struct ReminderGenerator {
    store: Arc<dyn Store>,
}

impl ReminderGenerator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Run one generation pass against the instant `now_utc`. Rows
    /// inserted before a store failure stay; the run itself fails.
    #[instrument(skip(self))]
    pub async fn run(&self, now_utc: DateTime<Utc>) -> Result<GenerationOutcome, AppError> {
        let schedules = self.store.list_active_schedules().await?;
        if schedules.is_empty() {
            info!("No active schedules, skipping reminder generation");
            return Ok(GenerationOutcome::empty("no_active_schedules"));
        }

        let taxes = self.store.list_open_taxes_with_due_date().await?;
        if taxes.is_empty() {
            info!("No open tax obligations, skipping reminder generation");
            return Ok(GenerationOutcome::empty("no_taxes"));
        }

        let station_names: HashMap<Uuid, String> = self
            .store
            .list_stations()
            .await?
            .into_iter()
            .map(|s| (s.station_id, s.station_name))
            .collect();

        let (today, now_time) = kst_civil_now(now_utc);
        let mut created = 0usize;
        let mut skipped = 0usize;

        for schedule in &schedules {
            for tax in &taxes {
                let Some(due_date) = tax.due_date else {
                    skipped += 1;
                    continue;
                };

                let target_date = reminder_target_date(due_date, schedule.days_before);
                let target_time = schedule.notification_time;

                // Strictly future only; past targets are never backfilled.
                let in_future = target_date > today
                    || (target_date == today && target_time > now_time);
                if !in_future {
                    skipped += 1;
                    continue;
                }

                let key = AutoReminderKey {
                    tax_id: tax.tax_id,
                    schedule_id: schedule.schedule_id,
                    notification_date: target_date,
                    notification_time: target_time,
                };
                if self.store.auto_reminder_exists(&key).await? {
                    skipped += 1;
                    continue;
                }

                let station_name = tax
                    .station_id
                    .and_then(|id| station_names.get(&id))
                    .map(String::as_str);
                let message = format_reminder_message(
                    station_name,
                    TaxType::from_string(&tax.tax_type),
                    tax.tax_amount,
                    due_date,
                );

                self.store
                    .create_reminder(&CreateReminder {
                        tax_id: Some(tax.tax_id),
                        notification_type: ReminderType::Auto,
                        schedule_id: Some(schedule.schedule_id),
                        notification_date: target_date,
                        notification_time: target_time,
                        message,
                        channel_id: None,
                    })
                    .await?;
                created += 1;
            }
        }

        REMINDERS_GENERATED_TOTAL
            .with_label_values(&["created"])
            .inc_by(created as f64);
        REMINDERS_GENERATED_TOTAL
            .with_label_values(&["skipped"])
            .inc_by(skipped as f64);

        info!(created, skipped, "Reminder generation completed");
        Ok(GenerationOutcome {
            created,
            skipped,
            reason: None,
        })
    }
}
