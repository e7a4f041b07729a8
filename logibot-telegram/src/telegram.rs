//! Production [`BotClient`] backed by teloxide.
//!
//! API calls go through a backon exponential retry policy (max 5 attempts, total delay
//! capped at 300 s); the long-poll loop runs in a spawned task cancelled cooperatively
//! on shutdown. The bot username is cached after `getMe` so command parsing works in
//! group chats.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use teloxide::payloads::GetUpdatesSetters as _;
use teloxide::prelude::*;
use teloxide::types::Update;
use teloxide::utils::command::BotCommands;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use logibot_core::{LogibotError, Result};

use crate::classify::{report, UpdateContext};
use crate::client::{BotClient, BotConnector, BotIdentity, WebhookStatus};
use crate::dispatch::{self, Command};

/// Teloxide-backed client owning the polling task and retry policy.
///
/// Each `start_polling` mints its own cancellation token and stores it next to the
/// task handle, so a stop-then-start cycle gets a live loop instead of one poisoned
/// by the previous cancellation.
pub struct TelegramClient {
    bot: Bot,
    username: Arc<RwLock<Option<String>>>,
    retry: ExponentialBuilder,
    poll_task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
            username: Arc::new(RwLock::new(None)),
            retry: ExponentialBuilder::default()
                .with_max_times(5)
                .with_total_delay(Some(Duration::from_secs(300))),
            poll_task: Mutex::new(None),
        }
    }
}

#[async_trait]
impl BotClient for TelegramClient {
    async fn identity(&self) -> Result<BotIdentity> {
        let me = (|| async { self.bot.get_me().await })
            .retry(self.retry.clone())
            .notify(|err, delay| warn!(error = %err, ?delay, "getMe failed, retrying"))
            .await
            .map_err(|e| LogibotError::Bot(e.to_string()))?;

        *self.username.write().await = me.user.username.clone();

        // Command list in the Telegram UI; best effort, identity is already known.
        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!(error = %e, "failed to publish command list");
        }

        Ok(BotIdentity {
            id: me.user.id.0 as i64,
            username: me.user.username.clone(),
            first_name: me.user.first_name.clone(),
        })
    }

    async fn start_polling(&self) -> Result<()> {
        let mut slot = self.poll_task.lock().await;
        if slot.is_some() {
            warn!("polling loop already running, skipping");
            return Ok(());
        }

        let bot = self.bot.clone();
        let username = self.username.clone();
        let token = CancellationToken::new();
        let cancel = token.clone();

        let handle = tokio::spawn(async move {
            info!("long-poll loop started");
            let mut offset: Option<i32> = None;

            loop {
                let batch = tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("long-poll loop stopping");
                        break;
                    }
                    result = poll_once(&bot, offset) => result,
                };

                match batch {
                    Ok(updates) => {
                        for update in updates {
                            offset = Some(update.id.0 as i32 + 1);
                            let context = UpdateContext::from_update(&update);
                            let name = username.read().await.clone();
                            if let Err(err) =
                                dispatch::dispatch(&bot, name.as_deref(), update).await
                            {
                                report(&err, &context);
                            }
                        }
                    }
                    Err(err) => {
                        report(&err, &UpdateContext::default());
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        *slot = Some((token, handle));
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        if let Some((cancel, handle)) = self.poll_task.lock().await.take() {
            cancel.cancel();
            if let Err(e) = handle.await {
                warn!(error = %e, "polling task did not shut down cleanly");
            }
        }
        Ok(())
    }

    async fn set_webhook(&self, url: &str) -> Result<()> {
        let target = url::Url::parse(url)
            .map_err(|e| LogibotError::Bot(format!("invalid webhook url {url}: {e}")))?;

        (|| async { self.bot.set_webhook(target.clone()).await })
            .retry(self.retry.clone())
            .notify(|err, delay| warn!(error = %err, ?delay, "setWebhook failed, retrying"))
            .await
            .map_err(|e| LogibotError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn delete_webhook(&self) -> Result<()> {
        (|| async { self.bot.delete_webhook().await })
            .retry(self.retry.clone())
            .notify(|err, delay| warn!(error = %err, ?delay, "deleteWebhook failed, retrying"))
            .await
            .map_err(|e| LogibotError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn webhook_status(&self) -> Result<WebhookStatus> {
        let info = (|| async { self.bot.get_webhook_info().await })
            .retry(self.retry.clone())
            .notify(|err, delay| warn!(error = %err, ?delay, "getWebhookInfo failed, retrying"))
            .await
            .map_err(|e| LogibotError::Bot(e.to_string()))?;

        Ok(WebhookStatus {
            url: info.url.as_ref().map(|u| u.to_string()),
            pending_update_count: info.pending_update_count,
            last_error_message: info.last_error_message.clone(),
        })
    }

    async fn process_update(&self, update: serde_json::Value) -> Result<()> {
        let update: Update = serde_json::from_value(update)
            .map_err(|e| LogibotError::Bot(format!("undecodable update payload: {e}")))?;
        let name = self.username.read().await.clone();
        dispatch::dispatch(&self.bot, name.as_deref(), update)
            .await
            .map_err(|e| LogibotError::Bot(e.to_string()))
    }
}

/// One getUpdates long poll. Telegram holds the request up to the timeout, so the
/// select in the loop stays responsive to cancellation.
async fn poll_once(
    bot: &Bot,
    offset: Option<i32>,
) -> std::result::Result<Vec<Update>, teloxide::RequestError> {
    let mut request = bot.get_updates().timeout(25);
    if let Some(offset) = offset {
        request = request.offset(offset);
    }
    request.await
}

/// Production connector: builds a [`TelegramClient`] from the token.
pub struct TelegramConnector;

impl BotConnector for TelegramConnector {
    fn connect(&self, token: &str) -> Result<Arc<dyn BotClient>> {
        Ok(Arc::new(TelegramClient::new(token)))
    }
}
