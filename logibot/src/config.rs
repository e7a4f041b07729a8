//! Runtime configuration from environment variables.

use anyhow::Result;
use std::env;

pub struct Config {
    pub bot_token: String,
    pub log_file: String,
    /// Default webhook target for `logibot webhook set` when no URL argument is given.
    pub webhook_url: Option<String>,
}

impl Config {
    /// Loads config from the environment. An explicit `token` (CLI arg) overrides
    /// BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/logibot.log".to_string());
        let webhook_url = env::var("WEBHOOK_URL").ok();

        Ok(Self {
            bot_token,
            log_file,
            webhook_url,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("BOT_TOKEN must not be empty");
        }
        if let Some(url) = &self.webhook_url {
            if !url.starts_with("https://") {
                anyhow::bail!("WEBHOOK_URL must be https (Telegram requirement)");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_with_token_override() {
        env::remove_var("BOT_TOKEN");
        env::remove_var("LOG_FILE");
        env::remove_var("WEBHOOK_URL");

        let config = Config::load(Some("override-token".to_string())).unwrap();
        assert_eq!(config.bot_token, "override-token");
        assert_eq!(config.log_file, "logs/logibot.log");
        assert!(config.webhook_url.is_none());
    }

    #[test]
    #[serial]
    fn test_load_requires_token() {
        env::remove_var("BOT_TOKEN");
        assert!(Config::load(None).is_err());

        env::set_var("BOT_TOKEN", "env-token");
        let config = Config::load(None).unwrap();
        assert_eq!(config.bot_token, "env-token");
        env::remove_var("BOT_TOKEN");
    }

    #[test]
    #[serial]
    fn test_validate_rejects_plain_http_webhook() {
        let config = Config {
            bot_token: "t".to_string(),
            log_file: "logs/test.log".to_string(),
            webhook_url: Some("http://example.com/hook".to_string()),
        };
        assert!(config.validate().is_err());

        let config = Config {
            webhook_url: Some("https://example.com/hook".to_string()),
            ..config
        };
        assert!(config.validate().is_ok());
    }
}
