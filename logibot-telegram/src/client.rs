//! Transport seam for the session manager.
//!
//! [`BotClient`] abstracts the Telegram client so lifecycle logic can be driven against
//! a mock in tests; [`TelegramClient`](crate::TelegramClient) is the production impl.

use std::sync::Arc;

use async_trait::async_trait;
use logibot_core::Result;

/// Bot identity metadata fetched at initialization. Required before webhook mode will
/// function correctly (command parsing needs the username).
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: String,
}

/// Subset of the webhook registration state surfaced to operators.
#[derive(Debug, Clone, Default)]
pub struct WebhookStatus {
    pub url: Option<String>,
    pub pending_update_count: u32,
    pub last_error_message: Option<String>,
}

/// Operations the session manager needs from a Telegram client.
#[async_trait]
pub trait BotClient: Send + Sync {
    /// Fetches the bot's own identity (`getMe`).
    async fn identity(&self) -> Result<BotIdentity>;

    /// Starts the long-poll loop fire-and-forget; returns once the loop task is
    /// running. Failures inside the loop are logged there, never returned here.
    async fn start_polling(&self) -> Result<()>;

    /// Gracefully stops background work (polling loop, in-flight dispatch).
    async fn shutdown(&self) -> Result<()>;

    async fn set_webhook(&self, url: &str) -> Result<()>;

    async fn delete_webhook(&self) -> Result<()>;

    async fn webhook_status(&self) -> Result<WebhookStatus>;

    /// Feeds one raw update payload into dispatch. Parse and handler failures
    /// propagate to the caller.
    async fn process_update(&self, update: serde_json::Value) -> Result<()>;
}

/// Builds a [`BotClient`] from a token. The production connector constructs a
/// [`TelegramClient`](crate::TelegramClient); tests inject a counting mock to assert
/// the manager constructs exactly one client.
pub trait BotConnector: Send + Sync {
    fn connect(&self, token: &str) -> Result<Arc<dyn BotClient>>;
}
