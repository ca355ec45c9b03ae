//! Application startup and lifecycle management.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::TmsConfig;
use crate::services::{
    init_metrics, AuditRecorder, EmailProvider, ExtractionService, GeminiVisionProvider,
    HttpWebhookProvider, MemoryStore, MockEmailProvider, MockVisionProvider, MockWebhookProvider,
    PgStore, ReminderDispatcher, ReminderGenerator, SendGridProvider, Store, VisionProvider,
    WebhookProvider,
};
use crate::{build_router, AppState};
use service_core::error::AppError;

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: TmsConfig) -> Result<Self, AppError> {
        init_metrics();

        let store: Arc<dyn Store> = if config.database.enabled {
            let store = PgStore::connect(&config.database).await.map_err(|e| {
                tracing::error!("Failed to connect to Postgres: {}", e);
                e
            })?;
            store.run_migrations().await.map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
            tracing::info!("Postgres store initialized");
            Arc::new(store)
        } else {
            tracing::info!("Database disabled, using in-memory store");
            Arc::new(MemoryStore::new())
        };

        let webhook: Arc<dyn WebhookProvider> = if config.webhook.enabled {
            tracing::info!("HTTP webhook provider initialized");
            Arc::new(HttpWebhookProvider::new(config.webhook.clone()))
        } else {
            tracing::info!("Webhook provider disabled, using mock webhook provider");
            Arc::new(MockWebhookProvider::new(true))
        };

        let email: Arc<dyn EmailProvider> = if config.email.enabled {
            tracing::info!("SendGrid email provider initialized");
            Arc::new(SendGridProvider::new(config.email.clone()))
        } else {
            tracing::info!("Email provider disabled, using mock email provider");
            Arc::new(MockEmailProvider::new(true))
        };

        let vision: Arc<dyn VisionProvider> = if config.genai.enabled {
            tracing::info!("Gemini vision provider initialized (model: {})", config.genai.model);
            Arc::new(GeminiVisionProvider::new(config.genai.clone()))
        } else {
            tracing::info!("GenAI provider disabled, using mock vision provider");
            Arc::new(MockVisionProvider::new(true))
        };

        let state = AppState {
            config: config.clone(),
            store: store.clone(),
            webhook: webhook.clone(),
            email,
            extraction: ExtractionService::new(vision),
            audit: AuditRecorder::new(store.clone()),
            generator: ReminderGenerator::new(store.clone()),
            dispatcher: ReminderDispatcher::new(store, webhook),
            generator_lock: Arc::new(tokio::sync::Mutex::new(())),
            dispatcher_lock: Arc::new(tokio::sync::Mutex::new(())),
        };

        // Port 0 binds a random port for testing.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("{} listening on port {}", config.service_name, port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a handle to the shared state, mainly for tests.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router).await
    }
}
