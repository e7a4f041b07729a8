//! logibot binary: run the customer-facing Telegram bot in long-poll mode, or manage
//! its webhook registration. Config comes from env (`.env` supported); the bot token
//! can be overridden on the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use logibot_core::init_tracing;
use logibot_telegram::{BotManager, TelegramConnector};

mod config;
use config::Config;

#[derive(Parser)]
#[command(name = "logibot")]
#[command(about = "Logistics Telegram bot: run polling or manage the webhook", long_about = None)]
#[command(version)]
struct Cli {
    /// Bot token override (falls back to BOT_TOKEN).
    #[arg(short, long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot in long-poll mode until Ctrl-C.
    Run,
    /// Manage the Telegram webhook registration.
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },
}

#[derive(Subcommand)]
enum WebhookAction {
    /// Register the webhook URL (argument, or WEBHOOK_URL from the environment).
    Set { url: Option<String> },
    /// Remove the webhook registration.
    Delete,
    /// Show the current webhook status.
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(cli.token.clone())?;
    config.validate()?;

    if let Some(parent) = std::path::Path::new(&config.log_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    init_tracing(&config.log_file)?;

    let mut manager = BotManager::new(Box::new(TelegramConnector));
    manager.initialize(&config.bot_token).await?;

    match cli.command {
        Commands::Run => {
            manager.start_polling().await?;
            info!("bot running, press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            manager.stop().await?;
        }
        Commands::Webhook { action } => match action {
            WebhookAction::Set { url } => {
                let url = url
                    .or_else(|| config.webhook_url.clone())
                    .ok_or_else(|| {
                        anyhow::anyhow!("webhook url required (argument or WEBHOOK_URL)")
                    })?;
                manager.set_webhook(&url).await?;
                println!("webhook set to {url}");
            }
            WebhookAction::Delete => {
                manager.delete_webhook().await?;
                println!("webhook deleted");
            }
            WebhookAction::Info => {
                let status = manager.webhook_status().await?;
                println!("url: {}", status.url.as_deref().unwrap_or("<none>"));
                println!("pending updates: {}", status.pending_update_count);
                if let Some(last_error) = status.last_error_message {
                    println!("last error: {last_error}");
                }
            }
        },
    }

    Ok(())
}
