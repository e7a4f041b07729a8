//! # logibot-telegram
//!
//! Telegram session layer for the logistics bot: [`BotManager`] owns the lifecycle of a
//! single [`BotClient`], the teloxide-backed [`TelegramClient`] is the production
//! transport, and [`classify`]/[`report`] turn API errors into log-level actions.

mod classify;
mod client;
mod dispatch;
mod session;
mod telegram;

pub use classify::{classify, report, ApiErrorKind, UpdateContext};
pub use client::{BotClient, BotConnector, BotIdentity, WebhookStatus};
pub use dispatch::Command;
pub use session::{BotManager, BotMode};
pub use telegram::{TelegramClient, TelegramConnector};
