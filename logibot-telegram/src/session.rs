//! Bot session lifecycle: Uninitialized → Initialized → Running(webhook | polling) →
//! stopped. One manager owns at most one client; every operation other than
//! `initialize` fails fast with "Bot not initialized" until a client exists.

use std::sync::Arc;

use logibot_core::{LogibotError, Result};
use tracing::{error, info, warn};

use crate::client::{BotClient, BotConnector, BotIdentity, WebhookStatus};

/// How the session receives updates. Never both at once; `None` until a start call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotMode {
    Webhook,
    Polling,
}

/// Owns the lifecycle of a single bot client. Constructed once at process start and
/// passed to whatever needs it; tests build a fresh manager per case.
pub struct BotManager {
    connector: Box<dyn BotConnector>,
    client: Option<Arc<dyn BotClient>>,
    identity: Option<BotIdentity>,
    started: bool,
    mode: Option<BotMode>,
}

impl BotManager {
    pub fn new(connector: Box<dyn BotConnector>) -> Self {
        Self {
            connector,
            client: None,
            identity: None,
            started: false,
            mode: None,
        }
    }

    /// Connects the client and fetches the bot identity. Calling it again is a no-op
    /// with a warning; the first client stays in place.
    pub async fn initialize(&mut self, token: &str) -> Result<()> {
        if self.client.is_some() {
            warn!("bot already initialized, skipping");
            return Ok(());
        }

        let client = self.connector.connect(token)?;
        let identity = client.identity().await?;
        info!(bot_id = identity.id, username = ?identity.username, "bot initialized");

        self.client = Some(client);
        self.identity = Some(identity);
        Ok(())
    }

    fn client(&self) -> Result<&Arc<dyn BotClient>> {
        self.client.as_ref().ok_or(LogibotError::NotInitialized)
    }

    /// Starts the client's long-poll loop fire-and-forget. A startup failure is logged
    /// only; the loop owns its own retry, so the session still counts as running.
    pub async fn start_polling(&mut self) -> Result<()> {
        let client = self.client()?.clone();
        if let Err(e) = client.start_polling().await {
            error!(error = %e, "polling startup failed");
        }
        self.started = true;
        self.mode = Some(BotMode::Polling);
        info!("bot polling started");
        Ok(())
    }

    /// Awaits graceful shutdown of the client. When the session is not running this
    /// logs and no-ops; state flags are only cleared after a successful shutdown.
    pub async fn stop(&mut self) -> Result<()> {
        let client = self.client()?.clone();
        if !self.started {
            info!("bot is not running, nothing to stop");
            return Ok(());
        }

        client.shutdown().await?;
        self.started = false;
        self.mode = None;
        info!("bot stopped");
        Ok(())
    }

    /// Registers the webhook URL and marks the session running in webhook mode.
    pub async fn set_webhook(&mut self, url: &str) -> Result<()> {
        let client = self.client()?.clone();
        client.set_webhook(url).await?;
        self.started = true;
        self.mode = Some(BotMode::Webhook);
        info!(url, "webhook set");
        Ok(())
    }

    pub async fn delete_webhook(&mut self) -> Result<()> {
        self.client()?.delete_webhook().await?;
        info!("webhook deleted");
        Ok(())
    }

    pub async fn webhook_status(&self) -> Result<WebhookStatus> {
        self.client()?.webhook_status().await
    }

    /// Forwards a raw update payload to the client. Failures propagate to the caller;
    /// the HTTP layer above is expected to turn them into an error response.
    pub async fn handle_webhook_update(&self, update: serde_json::Value) -> Result<()> {
        self.client()?.process_update(update).await
    }

    pub fn is_initialized(&self) -> bool {
        self.client.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.started
    }

    pub fn mode(&self) -> Option<BotMode> {
        self.mode
    }

    pub fn identity(&self) -> Option<&BotIdentity> {
        self.identity.as_ref()
    }
}
