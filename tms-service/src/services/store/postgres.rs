//! PostgreSQL store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::{
    AuditLog, AutoReminderKey, CreateAuditLog, CreateChannel, CreateRecipient, CreateReminder,
    CreateSchedule, CreateStation, CreateTax, EmailRecipient, ListTaxesFilter, OutboundChannel,
    Reminder, ReminderSchedule, ReminderType, Station, Tax, TaxStatus, UpdateChannel,
    UpdateRecipient, UpdateSchedule, UpdateStation, UpdateTax,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::Store;

const STATION_COLUMNS: &str =
    "station_id, station_name, location, address, status, created_utc, updated_utc";
const TAX_COLUMNS: &str = "tax_id, station_id, tax_type, tax_amount, due_date, \
     tax_notice_number, tax_year, tax_period, notes, status, created_utc, updated_utc";
const SCHEDULE_COLUMNS: &str =
    "schedule_id, schedule_name, days_before, notification_time, is_active, created_utc";
const CHANNEL_COLUMNS: &str = "channel_id, channel_name, webhook_url, is_active, created_utc";
const RECIPIENT_COLUMNS: &str = "recipient_id, email, name, is_active, created_utc";
const REMINDER_COLUMNS: &str = "reminder_id, tax_id, notification_type, schedule_id, \
     notification_date, notification_time, message, is_sent, sent_utc, channel_id, created_utc";
const AUDIT_COLUMNS: &str = "log_id, menu, action, actor_id, actor_name, description, \
     target_table, target_id, changes, created_utc";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new connection pool.
    #[instrument(skip(config), fields(service = "tms-service"))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self, input))]
    async fn create_station(&self, input: &CreateStation) -> Result<Station, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_station"])
            .start_timer();

        let station = sqlx::query_as::<_, Station>(&format!(
            "INSERT INTO charging_stations (station_id, station_name, location, address, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {STATION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.station_name)
        .bind(&input.location)
        .bind(&input.address)
        .bind(input.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create station: {}", e)))?;

        timer.observe_duration();
        Ok(station)
    }

    #[instrument(skip(self))]
    async fn list_stations(&self) -> Result<Vec<Station>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_stations"])
            .start_timer();

        let stations = sqlx::query_as::<_, Station>(&format!(
            "SELECT {STATION_COLUMNS} FROM charging_stations ORDER BY created_utc DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list stations: {}", e)))?;

        timer.observe_duration();
        Ok(stations)
    }

    #[instrument(skip(self))]
    async fn get_station(&self, station_id: Uuid) -> Result<Option<Station>, AppError> {
        let station = sqlx::query_as::<_, Station>(&format!(
            "SELECT {STATION_COLUMNS} FROM charging_stations WHERE station_id = $1"
        ))
        .bind(station_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get station: {}", e)))?;

        Ok(station)
    }

    #[instrument(skip(self, input))]
    async fn update_station(
        &self,
        station_id: Uuid,
        input: &UpdateStation,
    ) -> Result<Option<Station>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_station"])
            .start_timer();

        let station = sqlx::query_as::<_, Station>(&format!(
            "UPDATE charging_stations \
             SET station_name = $2, location = $3, address = $4, status = $5, updated_utc = NOW() \
             WHERE station_id = $1 RETURNING {STATION_COLUMNS}"
        ))
        .bind(station_id)
        .bind(&input.station_name)
        .bind(&input.location)
        .bind(&input.address)
        .bind(input.status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update station: {}", e)))?;

        timer.observe_duration();
        Ok(station)
    }

    #[instrument(skip(self))]
    async fn delete_station(&self, station_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM charging_stations WHERE station_id = $1")
            .bind(station_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete station: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn count_taxes_for_station(&self, station_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM taxes WHERE station_id = $1")
            .bind(station_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to count taxes: {}", e))
            })?;

        Ok(count)
    }

    #[instrument(skip(self, input))]
    async fn create_tax(&self, input: &CreateTax) -> Result<Tax, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_tax"])
            .start_timer();

        let tax = sqlx::query_as::<_, Tax>(&format!(
            "INSERT INTO taxes (tax_id, station_id, tax_type, tax_amount, due_date, \
             tax_notice_number, tax_year, tax_period, notes, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {TAX_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(input.station_id)
        .bind(input.tax_type.as_str())
        .bind(input.tax_amount)
        .bind(input.due_date)
        .bind(&input.tax_notice_number)
        .bind(input.tax_year)
        .bind(&input.tax_period)
        .bind(&input.notes)
        .bind(input.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create tax: {}", e)))?;

        timer.observe_duration();
        Ok(tax)
    }

    #[instrument(skip(self, filter))]
    async fn list_taxes(&self, filter: &ListTaxesFilter) -> Result<Vec<Tax>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_taxes"])
            .start_timer();

        let taxes = sqlx::query_as::<_, Tax>(&format!(
            "SELECT {TAX_COLUMNS} FROM taxes \
             WHERE ($1::uuid IS NULL OR station_id = $1) \
               AND ($2::text IS NULL OR status = $2) \
               AND ($3::text IS NULL OR tax_type = $3) \
               AND ($4::date IS NULL OR due_date >= $4) \
               AND ($5::date IS NULL OR due_date <= $5) \
             ORDER BY due_date ASC NULLS LAST, created_utc DESC"
        ))
        .bind(filter.station_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.tax_type.map(|t| t.as_str()))
        .bind(filter.due_after)
        .bind(filter.due_before)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list taxes: {}", e)))?;

        timer.observe_duration();
        Ok(taxes)
    }

    #[instrument(skip(self))]
    async fn get_tax(&self, tax_id: Uuid) -> Result<Option<Tax>, AppError> {
        let tax =
            sqlx::query_as::<_, Tax>(&format!("SELECT {TAX_COLUMNS} FROM taxes WHERE tax_id = $1"))
                .bind(tax_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to get tax: {}", e))
                })?;

        Ok(tax)
    }

    #[instrument(skip(self, input))]
    async fn update_tax(&self, tax_id: Uuid, input: &UpdateTax) -> Result<Option<Tax>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_tax"])
            .start_timer();

        let tax = sqlx::query_as::<_, Tax>(&format!(
            "UPDATE taxes \
             SET station_id = $2, tax_type = $3, tax_amount = $4, due_date = $5, \
                 tax_notice_number = $6, tax_year = $7, tax_period = $8, notes = $9, \
                 updated_utc = NOW() \
             WHERE tax_id = $1 RETURNING {TAX_COLUMNS}"
        ))
        .bind(tax_id)
        .bind(input.station_id)
        .bind(input.tax_type.as_str())
        .bind(input.tax_amount)
        .bind(input.due_date)
        .bind(&input.tax_notice_number)
        .bind(input.tax_year)
        .bind(&input.tax_period)
        .bind(&input.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update tax: {}", e)))?;

        timer.observe_duration();
        Ok(tax)
    }

    #[instrument(skip(self))]
    async fn update_tax_status(
        &self,
        tax_id: Uuid,
        status: TaxStatus,
    ) -> Result<Option<Tax>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_tax_status"])
            .start_timer();

        let tax = sqlx::query_as::<_, Tax>(&format!(
            "UPDATE taxes SET status = $2, updated_utc = NOW() \
             WHERE tax_id = $1 RETURNING {TAX_COLUMNS}"
        ))
        .bind(tax_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update tax status: {}", e))
        })?;

        timer.observe_duration();
        Ok(tax)
    }

    #[instrument(skip(self))]
    async fn delete_tax(&self, tax_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM taxes WHERE tax_id = $1")
            .bind(tax_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete tax: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list_open_taxes_with_due_date(&self) -> Result<Vec<Tax>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_open_taxes"])
            .start_timer();

        let taxes = sqlx::query_as::<_, Tax>(&format!(
            "SELECT {TAX_COLUMNS} FROM taxes \
             WHERE status <> $1 AND due_date IS NOT NULL ORDER BY due_date ASC"
        ))
        .bind(TaxStatus::PaymentCompleted.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list open taxes: {}", e))
        })?;

        timer.observe_duration();
        Ok(taxes)
    }

    #[instrument(skip(self))]
    async fn list_open_taxes_due_on(&self, due: NaiveDate) -> Result<Vec<Tax>, AppError> {
        let taxes = sqlx::query_as::<_, Tax>(&format!(
            "SELECT {TAX_COLUMNS} FROM taxes WHERE status <> $1 AND due_date = $2"
        ))
        .bind(TaxStatus::PaymentCompleted.as_str())
        .bind(due)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list taxes due: {}", e))
        })?;

        Ok(taxes)
    }

    #[instrument(skip(self, input))]
    async fn create_schedule(&self, input: &CreateSchedule) -> Result<ReminderSchedule, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_schedule"])
            .start_timer();

        let schedule = sqlx::query_as::<_, ReminderSchedule>(&format!(
            "INSERT INTO reminder_schedules (schedule_id, schedule_name, days_before, \
             notification_time, is_active) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.schedule_name)
        .bind(input.days_before)
        .bind(input.notification_time)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create schedule: {}", e))
        })?;

        timer.observe_duration();
        Ok(schedule)
    }

    #[instrument(skip(self))]
    async fn list_schedules(&self) -> Result<Vec<ReminderSchedule>, AppError> {
        let schedules = sqlx::query_as::<_, ReminderSchedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM reminder_schedules ORDER BY created_utc DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list schedules: {}", e))
        })?;

        Ok(schedules)
    }

    #[instrument(skip(self))]
    async fn list_active_schedules(&self) -> Result<Vec<ReminderSchedule>, AppError> {
        let schedules = sqlx::query_as::<_, ReminderSchedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM reminder_schedules \
             WHERE is_active = TRUE ORDER BY created_utc DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list active schedules: {}", e))
        })?;

        Ok(schedules)
    }

    #[instrument(skip(self, input))]
    async fn update_schedule(
        &self,
        schedule_id: Uuid,
        input: &UpdateSchedule,
    ) -> Result<Option<ReminderSchedule>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_schedule"])
            .start_timer();

        let schedule = sqlx::query_as::<_, ReminderSchedule>(&format!(
            "UPDATE reminder_schedules \
             SET schedule_name = $2, days_before = $3, notification_time = $4, is_active = $5 \
             WHERE schedule_id = $1 RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(schedule_id)
        .bind(&input.schedule_name)
        .bind(input.days_before)
        .bind(input.notification_time)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update schedule: {}", e))
        })?;

        timer.observe_duration();
        Ok(schedule)
    }

    #[instrument(skip(self))]
    async fn delete_schedule(&self, schedule_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reminder_schedules WHERE schedule_id = $1")
            .bind(schedule_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete schedule: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, input))]
    async fn create_channel(&self, input: &CreateChannel) -> Result<OutboundChannel, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_channel"])
            .start_timer();

        let channel = sqlx::query_as::<_, OutboundChannel>(&format!(
            "INSERT INTO outbound_channels (channel_id, channel_name, webhook_url, is_active) \
             VALUES ($1, $2, $3, $4) RETURNING {CHANNEL_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.channel_name)
        .bind(&input.webhook_url)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create channel: {}", e)))?;

        timer.observe_duration();
        Ok(channel)
    }

    #[instrument(skip(self))]
    async fn list_channels(&self) -> Result<Vec<OutboundChannel>, AppError> {
        let channels = sqlx::query_as::<_, OutboundChannel>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM outbound_channels ORDER BY created_utc DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list channels: {}", e)))?;

        Ok(channels)
    }

    #[instrument(skip(self))]
    async fn list_active_channels(&self) -> Result<Vec<OutboundChannel>, AppError> {
        let channels = sqlx::query_as::<_, OutboundChannel>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM outbound_channels \
             WHERE is_active = TRUE ORDER BY created_utc DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list active channels: {}", e))
        })?;

        Ok(channels)
    }

    #[instrument(skip(self))]
    async fn list_active_channels_by_ids(
        &self,
        channel_ids: &[Uuid],
    ) -> Result<Vec<OutboundChannel>, AppError> {
        let channels = sqlx::query_as::<_, OutboundChannel>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM outbound_channels \
             WHERE is_active = TRUE AND channel_id = ANY($1)"
        ))
        .bind(channel_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list channels by id: {}", e))
        })?;

        Ok(channels)
    }

    #[instrument(skip(self))]
    async fn get_channel(&self, channel_id: Uuid) -> Result<Option<OutboundChannel>, AppError> {
        let channel = sqlx::query_as::<_, OutboundChannel>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM outbound_channels WHERE channel_id = $1"
        ))
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get channel: {}", e)))?;

        Ok(channel)
    }

    #[instrument(skip(self, input))]
    async fn update_channel(
        &self,
        channel_id: Uuid,
        input: &UpdateChannel,
    ) -> Result<Option<OutboundChannel>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_channel"])
            .start_timer();

        let channel = sqlx::query_as::<_, OutboundChannel>(&format!(
            "UPDATE outbound_channels \
             SET channel_name = $2, webhook_url = $3, is_active = $4 \
             WHERE channel_id = $1 RETURNING {CHANNEL_COLUMNS}"
        ))
        .bind(channel_id)
        .bind(&input.channel_name)
        .bind(&input.webhook_url)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update channel: {}", e)))?;

        timer.observe_duration();
        Ok(channel)
    }

    #[instrument(skip(self))]
    async fn delete_channel(&self, channel_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM outbound_channels WHERE channel_id = $1")
            .bind(channel_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete channel: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, input))]
    async fn create_recipient(&self, input: &CreateRecipient) -> Result<EmailRecipient, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_recipient"])
            .start_timer();

        let recipient = sqlx::query_as::<_, EmailRecipient>(&format!(
            "INSERT INTO email_recipients (recipient_id, email, name, is_active) \
             VALUES ($1, $2, $3, $4) RETURNING {RECIPIENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.email)
        .bind(&input.name)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create recipient: {}", e))
        })?;

        timer.observe_duration();
        Ok(recipient)
    }

    #[instrument(skip(self))]
    async fn list_recipients(&self) -> Result<Vec<EmailRecipient>, AppError> {
        let recipients = sqlx::query_as::<_, EmailRecipient>(&format!(
            "SELECT {RECIPIENT_COLUMNS} FROM email_recipients ORDER BY created_utc DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list recipients: {}", e))
        })?;

        Ok(recipients)
    }

    #[instrument(skip(self))]
    async fn list_active_recipients(&self) -> Result<Vec<EmailRecipient>, AppError> {
        let recipients = sqlx::query_as::<_, EmailRecipient>(&format!(
            "SELECT {RECIPIENT_COLUMNS} FROM email_recipients \
             WHERE is_active = TRUE ORDER BY created_utc DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list active recipients: {}", e))
        })?;

        Ok(recipients)
    }

    #[instrument(skip(self, input))]
    async fn update_recipient(
        &self,
        recipient_id: Uuid,
        input: &UpdateRecipient,
    ) -> Result<Option<EmailRecipient>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_recipient"])
            .start_timer();

        let recipient = sqlx::query_as::<_, EmailRecipient>(&format!(
            "UPDATE email_recipients SET email = $2, name = $3, is_active = $4 \
             WHERE recipient_id = $1 RETURNING {RECIPIENT_COLUMNS}"
        ))
        .bind(recipient_id)
        .bind(&input.email)
        .bind(&input.name)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update recipient: {}", e))
        })?;

        timer.observe_duration();
        Ok(recipient)
    }

    #[instrument(skip(self))]
    async fn delete_recipient(&self, recipient_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM email_recipients WHERE recipient_id = $1")
            .bind(recipient_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete recipient: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, input))]
    async fn create_reminder(&self, input: &CreateReminder) -> Result<Reminder, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_reminder"])
            .start_timer();

        let reminder = sqlx::query_as::<_, Reminder>(&format!(
            "INSERT INTO reminders (reminder_id, tax_id, notification_type, schedule_id, \
             notification_date, notification_time, message, channel_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {REMINDER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(input.tax_id)
        .bind(input.notification_type.as_str())
        .bind(input.schedule_id)
        .bind(input.notification_date)
        .bind(input.notification_time)
        .bind(&input.message)
        .bind(input.channel_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create reminder: {}", e))
        })?;

        timer.observe_duration();
        Ok(reminder)
    }

    #[instrument(skip(self))]
    async fn list_reminders(
        &self,
        notification_type: Option<ReminderType>,
        is_sent: Option<bool>,
    ) -> Result<Vec<Reminder>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_reminders"])
            .start_timer();

        let reminders = sqlx::query_as::<_, Reminder>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders \
             WHERE ($1::text IS NULL OR notification_type = $1) \
               AND ($2::bool IS NULL OR is_sent = $2) \
             ORDER BY notification_date ASC, notification_time ASC"
        ))
        .bind(notification_type.map(|t| t.as_str()))
        .bind(is_sent)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list reminders: {}", e)))?;

        timer.observe_duration();
        Ok(reminders)
    }

    #[instrument(skip(self))]
    async fn get_reminder(&self, reminder_id: Uuid) -> Result<Option<Reminder>, AppError> {
        let reminder = sqlx::query_as::<_, Reminder>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE reminder_id = $1"
        ))
        .bind(reminder_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get reminder: {}", e)))?;

        Ok(reminder)
    }

    #[instrument(skip(self))]
    async fn delete_reminder(&self, reminder_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reminders WHERE reminder_id = $1")
            .bind(reminder_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete reminder: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, key))]
    async fn auto_reminder_exists(&self, key: &AutoReminderKey) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["auto_reminder_exists"])
            .start_timer();

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
               SELECT 1 FROM reminders \
               WHERE notification_type = $1 AND tax_id = $2 AND schedule_id = $3 \
                 AND notification_date = $4 AND notification_time = $5)",
        )
        .bind(ReminderType::Auto.as_str())
        .bind(key.tax_id)
        .bind(key.schedule_id)
        .bind(key.notification_date)
        .bind(key.notification_time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to check reminder existence: {}", e))
        })?;

        timer.observe_duration();
        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn list_due_manual_reminders(&self, date: NaiveDate) -> Result<Vec<Reminder>, AppError> {
        let reminders = sqlx::query_as::<_, Reminder>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders \
             WHERE notification_type = $1 AND is_sent = FALSE AND notification_date = $2 \
             ORDER BY notification_time ASC"
        ))
        .bind(ReminderType::Manual.as_str())
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list due reminders: {}", e))
        })?;

        Ok(reminders)
    }

    #[instrument(skip(self))]
    async fn mark_reminder_sent(
        &self,
        reminder_id: Uuid,
        sent_utc: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE reminders SET is_sent = TRUE, sent_utc = $2 WHERE reminder_id = $1")
            .bind(reminder_id)
            .bind(sent_utc)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to mark reminder sent: {}", e))
            })?;

        Ok(())
    }

    #[instrument(skip(self, input))]
    async fn insert_audit_log(&self, input: &CreateAuditLog) -> Result<AuditLog, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_audit_log"])
            .start_timer();

        let log = sqlx::query_as::<_, AuditLog>(&format!(
            "INSERT INTO audit_logs (log_id, menu, action, actor_id, actor_name, description, \
             target_table, target_id, changes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {AUDIT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.menu)
        .bind(input.action.as_str())
        .bind(&input.actor_id)
        .bind(&input.actor_name)
        .bind(&input.description)
        .bind(&input.target_table)
        .bind(&input.target_id)
        .bind(&input.changes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to insert audit log: {}", e))
        })?;

        timer.observe_duration();
        Ok(log)
    }

    #[instrument(skip(self))]
    async fn list_audit_logs(&self, limit: i64) -> Result<Vec<AuditLog>, AppError> {
        let logs = sqlx::query_as::<_, AuditLog>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs ORDER BY created_utc DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list audit logs: {}", e))
        })?;

        Ok(logs)
    }
}
