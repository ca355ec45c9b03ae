pub mod audit;
pub mod clock;
pub mod dispatcher;
pub mod extraction;
pub mod generator;
pub mod metrics;
pub mod providers;
pub mod statistics;
pub mod store;

pub use audit::AuditRecorder;
pub use dispatcher::ReminderDispatcher;
pub use extraction::ExtractionService;
pub use generator::ReminderGenerator;
pub use metrics::{get_metrics, init_metrics, record_dispatch, record_provider_call};
pub use providers::{
    EmailProvider, GeminiVisionProvider, HttpWebhookProvider, MockEmailProvider,
    MockVisionProvider, MockWebhookProvider, ProviderError, SendGridProvider, VisionProvider,
    WebhookProvider,
};
pub use store::{MemoryStore, PgStore, Store};
