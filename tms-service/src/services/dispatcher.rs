//! Reminder dispatch batch job.
//!
//! Two sub-flows run on every invocation: the schedule-triggered sweep
//! over obligations whose due date matches a schedule window, and the
//! manual sweep over staff-created reminders due now. Delivery is
//! fire-and-forget; per-channel failures are counted, never retried.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures::future;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::models::OutboundChannel;
use crate::services::clock::kst_civil_now;
use crate::services::metrics::record_dispatch;
use crate::services::providers::WebhookProvider;
use crate::services::store::Store;

/// Outcome of one dispatch pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Obligations matched by the schedule sweep.
    pub dispatched: usize,
    /// Manual reminders marked sent.
    pub dispatched_manual: usize,
    /// Webhook deliveries that succeeded.
    pub delivered: usize,
    /// Webhook deliveries that failed.
    pub failed: usize,
}

/// Aggregate text for a schedule sweep hit.
pub fn format_sweep_message(count: usize, due_date: NaiveDate) -> String {
    format!(
        "세금 일정 알림\n대상 건수: {}건\n기한: {}",
        count,
        due_date.format("%Y-%m-%d")
    )
}

#[derive(Clone)]
pub struct ReminderDispatcher {
    store: Arc<dyn Store>,
    webhook: Arc<dyn WebhookProvider>,
}

impl ReminderDispatcher {
    pub fn new(store: Arc<dyn Store>, webhook: Arc<dyn WebhookProvider>) -> Self {
        Self { store, webhook }
    }

    /// Run one dispatch pass against the instant `now_utc`.
    #[instrument(skip(self))]
    pub async fn run(&self, now_utc: DateTime<Utc>) -> Result<DispatchOutcome, AppError> {
        let (today, now_time) = kst_civil_now(now_utc);
        let schedules = self.store.list_active_schedules().await?;
        let channels = self.store.list_active_channels().await?;
        let mut outcome = DispatchOutcome::default();

        for schedule in &schedules {
            let target = today + Duration::days(schedule.days_before as i64);
            let due_taxes = self.store.list_open_taxes_due_on(target).await?;
            if due_taxes.is_empty() {
                continue;
            }

            let message = format_sweep_message(due_taxes.len(), target);
            let (sent, failed) = self.broadcast(&channels, &message, "schedule").await;
            outcome.delivered += sent;
            outcome.failed += failed;
            outcome.dispatched += due_taxes.len();
        }

        let due_manual = self.store.list_due_manual_reminders(today).await?;
        for reminder in due_manual {
            // Not yet due; left unsent for a later pass
            if reminder.notification_time > now_time {
                continue;
            }

            // Specific channel if still active, else every active channel
            let targets: Vec<OutboundChannel> = match reminder
                .channel_id
                .and_then(|id| channels.iter().find(|c| c.channel_id == id))
            {
                Some(channel) => vec![channel.clone()],
                None => channels.clone(),
            };

            let (sent, failed) = self.broadcast(&targets, &reminder.message, "manual").await;
            outcome.delivered += sent;
            outcome.failed += failed;

            // Sent exactly once, whatever the per-channel outcomes were
            self.store
                .mark_reminder_sent(reminder.reminder_id, now_utc)
                .await?;
            outcome.dispatched_manual += 1;
        }

        info!(
            dispatched = outcome.dispatched,
            dispatched_manual = outcome.dispatched_manual,
            delivered = outcome.delivered,
            failed = outcome.failed,
            "Reminder dispatch completed"
        );
        Ok(outcome)
    }

    /// Deliver `text` to every channel in parallel. Returns
    /// (sent, failed).
    async fn broadcast(
        &self,
        channels: &[OutboundChannel],
        text: &str,
        flow: &str,
    ) -> (usize, usize) {
        let attempts = channels.iter().map(|channel| async move {
            match self.webhook.post_text(&channel.webhook_url, text).await {
                Ok(()) => {
                    record_dispatch(flow, "sent");
                    true
                }
                Err(e) => {
                    warn!(
                        channel = %channel.channel_name,
                        error = %e,
                        "Webhook delivery failed"
                    );
                    record_dispatch(flow, "failed");
                    false
                }
            }
        });

        let results = future::join_all(attempts).await;
        let sent = results.iter().filter(|delivered| **delivered).count();
        (sent, results.len() - sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CreateChannel, CreateReminder, CreateSchedule, CreateTax, ReminderType, TaxStatus, TaxType,
    };
    use crate::services::providers::MockWebhookProvider;
    use crate::services::store::MemoryStore;
    use chrono::{NaiveTime, TimeZone};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // 2025-06-01 09:00 KST
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    async fn seed_channel(store: &MemoryStore, name: &str, url: &str, active: bool) -> Uuid {
        store
            .create_channel(&CreateChannel {
                channel_name: name.to_string(),
                webhook_url: url.to_string(),
                is_active: active,
            })
            .await
            .unwrap()
            .channel_id
    }

    async fn seed_tax_due(store: &MemoryStore, due: NaiveDate, status: TaxStatus) {
        store
            .create_tax(&CreateTax {
                station_id: None,
                tax_type: TaxType::Property,
                tax_amount: 300_000,
                due_date: Some(due),
                tax_notice_number: None,
                tax_year: None,
                tax_period: None,
                notes: None,
                status,
            })
            .await
            .unwrap();
    }

    async fn seed_manual(
        store: &MemoryStore,
        on: NaiveDate,
        at: NaiveTime,
        channel_id: Option<Uuid>,
    ) -> Uuid {
        store
            .create_reminder(&CreateReminder {
                tax_id: None,
                notification_type: ReminderType::Manual,
                schedule_id: None,
                notification_date: on,
                notification_time: at,
                message: "수동 알림".to_string(),
                channel_id,
            })
            .await
            .unwrap()
            .reminder_id
    }

    fn dispatcher(
        store: &MemoryStore,
        webhook: &Arc<MockWebhookProvider>,
    ) -> ReminderDispatcher {
        ReminderDispatcher::new(Arc::new(store.clone()), webhook.clone())
    }

    #[tokio::test]
    async fn test_sweep_counts_matching_obligations() {
        let store = MemoryStore::new();
        seed_channel(&store, "운영방", "https://hooks.example.com/a", true).await;
        store
            .create_schedule(&CreateSchedule {
                schedule_name: "7일 전".to_string(),
                days_before: 7,
                notification_time: time(9, 0),
                is_active: true,
            })
            .await
            .unwrap();
        // Two open on the window, one completed, one off-window
        seed_tax_due(&store, date(2025, 6, 8), TaxStatus::PaymentScheduled).await;
        seed_tax_due(&store, date(2025, 6, 8), TaxStatus::PaymentScheduled).await;
        seed_tax_due(&store, date(2025, 6, 8), TaxStatus::PaymentCompleted).await;
        seed_tax_due(&store, date(2025, 6, 9), TaxStatus::PaymentScheduled).await;

        let webhook = Arc::new(MockWebhookProvider::new(true));
        let outcome = dispatcher(&store, &webhook).run(fixed_now()).await.unwrap();

        assert_eq!(outcome.dispatched, 2);
        assert_eq!(outcome.delivered, 1);

        let deliveries = webhook.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].1, "세금 일정 알림\n대상 건수: 2건\n기한: 2025-06-08");
    }

    #[tokio::test]
    async fn test_manual_reminder_sent_once() {
        let store = MemoryStore::new();
        seed_channel(&store, "운영방", "https://hooks.example.com/a", true).await;
        let id = seed_manual(&store, date(2025, 6, 1), time(8, 0), None).await;

        let webhook = Arc::new(MockWebhookProvider::new(true));
        let d = dispatcher(&store, &webhook);

        let first = d.run(fixed_now()).await.unwrap();
        assert_eq!(first.dispatched_manual, 1);
        let reminder = store.get_reminder(id).await.unwrap().unwrap();
        assert!(reminder.is_sent);
        assert!(reminder.sent_utc.is_some());

        let second = d.run(fixed_now()).await.unwrap();
        assert_eq!(second.dispatched_manual, 0);
        assert_eq!(webhook.send_count(), 1);
    }

    #[tokio::test]
    async fn test_future_time_left_for_later_pass() {
        let store = MemoryStore::new();
        seed_channel(&store, "운영방", "https://hooks.example.com/a", true).await;
        let id = seed_manual(&store, date(2025, 6, 1), time(10, 0), None).await;

        let webhook = Arc::new(MockWebhookProvider::new(true));
        let d = dispatcher(&store, &webhook);

        // 09:00 KST: not yet due
        let early = d.run(fixed_now()).await.unwrap();
        assert_eq!(early.dispatched_manual, 0);
        assert!(!store.get_reminder(id).await.unwrap().unwrap().is_sent);

        // 11:00 KST: due now
        let later_now = Utc.with_ymd_and_hms(2025, 6, 1, 2, 0, 0).unwrap();
        let later = d.run(later_now).await.unwrap();
        assert_eq!(later.dispatched_manual, 1);
        assert!(store.get_reminder(id).await.unwrap().unwrap().is_sent);
    }

    #[tokio::test]
    async fn test_specific_channel_targets_only_it() {
        let store = MemoryStore::new();
        seed_channel(&store, "A", "https://hooks.example.com/a", true).await;
        let b = seed_channel(&store, "B", "https://hooks.example.com/b", true).await;
        seed_manual(&store, date(2025, 6, 1), time(8, 0), Some(b)).await;

        let webhook = Arc::new(MockWebhookProvider::new(true));
        dispatcher(&store, &webhook).run(fixed_now()).await.unwrap();

        let deliveries = webhook.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "https://hooks.example.com/b");
    }

    #[tokio::test]
    async fn test_inactive_specific_channel_falls_back_to_all() {
        let store = MemoryStore::new();
        seed_channel(&store, "A", "https://hooks.example.com/a", true).await;
        let b = seed_channel(&store, "B", "https://hooks.example.com/b", false).await;
        seed_manual(&store, date(2025, 6, 1), time(8, 0), Some(b)).await;

        let webhook = Arc::new(MockWebhookProvider::new(true));
        let outcome = dispatcher(&store, &webhook).run(fixed_now()).await.unwrap();

        assert_eq!(outcome.dispatched_manual, 1);
        let deliveries = webhook.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "https://hooks.example.com/a");
    }

    #[tokio::test]
    async fn test_channel_failures_are_isolated() {
        let store = MemoryStore::new();
        seed_channel(&store, "좋은방", "https://hooks.example.com/ok", true).await;
        seed_channel(&store, "죽은방", "https://hooks.example.com/fail", true).await;
        let id = seed_manual(&store, date(2025, 6, 1), time(8, 0), None).await;

        let webhook = Arc::new(MockWebhookProvider::new(true));
        let outcome = dispatcher(&store, &webhook).run(fixed_now()).await.unwrap();

        assert_eq!(outcome.delivered, 1);
        assert_eq!(outcome.failed, 1);
        // Still marked sent despite the partial failure
        assert!(store.get_reminder(id).await.unwrap().unwrap().is_sent);
    }

    #[tokio::test]
    async fn test_both_flows_run_in_one_pass() {
        let store = MemoryStore::new();
        seed_channel(&store, "운영방", "https://hooks.example.com/a", true).await;
        store
            .create_schedule(&CreateSchedule {
                schedule_name: "당일".to_string(),
                days_before: 0,
                notification_time: time(9, 0),
                is_active: true,
            })
            .await
            .unwrap();
        seed_tax_due(&store, date(2025, 6, 1), TaxStatus::PaymentScheduled).await;
        seed_manual(&store, date(2025, 6, 1), time(8, 0), None).await;

        let webhook = Arc::new(MockWebhookProvider::new(true));
        let outcome = dispatcher(&store, &webhook).run(fixed_now()).await.unwrap();

        assert_eq!(outcome.dispatched, 1);
        assert_eq!(outcome.dispatched_manual, 1);
        assert_eq!(webhook.send_count(), 2);
    }
}
