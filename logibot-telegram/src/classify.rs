//! Telegram API error taxonomy: a pure classification function plus a log-only sink.
//!
//! Classification is separated from acting so it can be unit-tested without I/O. The
//! sink never retries or alters control flow; transport-level retry already handles
//! transient failures.

use std::time::Duration;

use teloxide::types::{Update, UpdateKind};
use teloxide::{ApiError, RequestError};
use tracing::{error, warn};

/// Classified error category for one failed Telegram API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The bot was blocked or kicked, or the chat/user is gone. Expected churn.
    Blocked,
    /// Telegram asked us to slow down; the hint is how long it wants us to wait.
    RateLimited { retry_after: Duration },
    /// We sent something Telegram rejected as malformed.
    Malformed { description: String },
    /// Any other Telegram API error.
    Api { description: String },
    /// Network/transport failure: connection, IO, or an undecodable response body.
    Transport,
}

/// Maps a teloxide request error onto [`ApiErrorKind`]. Pure; no logging.
pub fn classify(err: &RequestError) -> ApiErrorKind {
    match err {
        RequestError::Api(api) => classify_api(api),
        RequestError::RetryAfter(seconds) => ApiErrorKind::RateLimited {
            retry_after: seconds.duration(),
        },
        RequestError::Network(_) | RequestError::InvalidJson { .. } | RequestError::Io(_) => {
            ApiErrorKind::Transport
        }
        _ => ApiErrorKind::Api {
            description: err.to_string(),
        },
    }
}

fn classify_api(api: &ApiError) -> ApiErrorKind {
    match api {
        ApiError::BotBlocked
        | ApiError::BotKicked
        | ApiError::BotKickedFromSupergroup
        | ApiError::ChatNotFound
        | ApiError::UserNotFound
        | ApiError::UserDeactivated
        | ApiError::CantInitiateConversation
        | ApiError::CantTalkWithBots => ApiErrorKind::Blocked,
        ApiError::MessageTextIsEmpty => ApiErrorKind::Malformed {
            description: api.to_string(),
        },
        ApiError::Unknown(description) if description.contains("Bad Request") => {
            ApiErrorKind::Malformed {
                description: description.clone(),
            }
        }
        other => ApiErrorKind::Api {
            description: other.to_string(),
        },
    }
}

/// Context extracted from the update that triggered the failure, when available.
#[derive(Debug, Clone, Default)]
pub struct UpdateContext {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub chat_id: Option<i64>,
    pub chat_type: Option<&'static str>,
}

impl UpdateContext {
    pub fn from_update(update: &Update) -> Self {
        let mut ctx = Self::default();
        match &update.kind {
            UpdateKind::Message(msg) => {
                if let Some(user) = &msg.from {
                    ctx.user_id = Some(user.id.0 as i64);
                    ctx.username = user.username.clone();
                }
                ctx.chat_id = Some(msg.chat.id.0);
                ctx.chat_type = Some(chat_type_name(&msg.chat));
            }
            UpdateKind::CallbackQuery(query) => {
                ctx.user_id = Some(query.from.id.0 as i64);
                ctx.username = query.from.username.clone();
                if let Some(message) = &query.message {
                    let chat = message.chat();
                    ctx.chat_id = Some(chat.id.0);
                    ctx.chat_type = Some(chat_type_name(chat));
                }
            }
            _ => {}
        }
        ctx
    }
}

fn chat_type_name(chat: &teloxide::types::Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_group() {
        "group"
    } else if chat.is_supergroup() {
        "supergroup"
    } else {
        "channel"
    }
}

/// Logging sink: classifies `err` and logs it at the severity its category warrants.
/// Never retries, recovers, or changes control flow.
pub fn report(err: &RequestError, ctx: &UpdateContext) {
    match classify(err) {
        ApiErrorKind::Blocked => {
            warn!(
                user_id = ?ctx.user_id,
                chat_id = ?ctx.chat_id,
                error = %err,
                "chat unavailable, dropping"
            );
        }
        ApiErrorKind::RateLimited { retry_after } => {
            warn!(
                retry_after_secs = retry_after.as_secs(),
                error = %err,
                "rate limited by telegram"
            );
        }
        ApiErrorKind::Malformed { description } => {
            error!(%description, "telegram rejected the request as malformed");
        }
        ApiErrorKind::Api { description } => {
            error!(%description, raw = ?err, "telegram api error");
        }
        ApiErrorKind::Transport => {
            error!(
                user_id = ?ctx.user_id,
                username = ?ctx.username,
                chat_id = ?ctx.chat_id,
                chat_type = ?ctx.chat_type,
                error = %err,
                "transport error talking to telegram"
            );
        }
    }
}
