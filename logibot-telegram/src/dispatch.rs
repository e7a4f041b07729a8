//! Update dispatch for the customer-facing bot: command messages and the inline-menu
//! callback queries. Errors are returned as raw `RequestError` so callers can run them
//! through the classification sink or propagate them, depending on the entrypoint.

use teloxide::prelude::*;
use teloxide::types::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update, UpdateKind,
};
use teloxide::utils::command::BotCommands;
use teloxide::RequestError;
use tracing::{debug, info};

const WELCOME: &str = "Welcome to the cargo desk!\n\
Use /track <order number> to follow a shipment, or pick an option below.";

const TRACK_PROMPT: &str = "Send /track followed by your order number, e.g. /track TRK-1042.";

/// Commands offered to customers.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "greeting and main menu")]
    Start,
    #[command(description = "list available commands")]
    Help,
    #[command(description = "track a cargo order by its number")]
    Track(String),
}

fn menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Track cargo", "menu:track"),
        InlineKeyboardButton::callback("Help", "menu:help"),
    ]])
}

/// Routes one update: command messages and callback queries; everything else is
/// ignored. `bot_username` comes from the identity fetched at initialization.
pub(crate) async fn dispatch(
    bot: &Bot,
    bot_username: Option<&str>,
    update: Update,
) -> Result<(), RequestError> {
    match &update.kind {
        UpdateKind::Message(message) => handle_message(bot, bot_username, message).await,
        UpdateKind::CallbackQuery(query) => handle_callback(bot, query).await,
        _ => Ok(()),
    }
}

async fn handle_message(
    bot: &Bot,
    bot_username: Option<&str>,
    message: &Message,
) -> Result<(), RequestError> {
    let Some(text) = message.text() else {
        return Ok(());
    };

    let command = match Command::parse(text, bot_username.unwrap_or_default()) {
        Ok(command) => command,
        // Non-command chatter; the web app owns the actual order forms.
        Err(_) => return Ok(()),
    };

    info!(
        chat_id = message.chat.id.0,
        command = ?command,
        "command received"
    );

    match command {
        Command::Start => {
            bot.send_message(message.chat.id, WELCOME)
                .reply_markup(menu_keyboard())
                .await?;
        }
        Command::Help => {
            bot.send_message(message.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Track(order_number) => {
            let reply = track_reply(&order_number);
            bot.send_message(message.chat.id, reply).await?;
        }
    }

    Ok(())
}

fn track_reply(order_number: &str) -> String {
    let order_number = order_number.trim();
    if order_number.is_empty() {
        TRACK_PROMPT.to_string()
    } else {
        format!(
            "Looking up cargo {order_number}. You will get a status message here as soon as \
             the dispatch desk confirms it."
        )
    }
}

async fn handle_callback(bot: &Bot, query: &CallbackQuery) -> Result<(), RequestError> {
    // Always ack so the client stops showing the spinner.
    bot.answer_callback_query(query.id.clone()).await?;

    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };
    let Some(chat_id) = query.message.as_ref().map(|message| message.chat().id) else {
        debug!(data, "callback without an accessible message, ignoring");
        return Ok(());
    };

    match data {
        "menu:track" => {
            bot.send_message(chat_id, TRACK_PROMPT).await?;
        }
        "menu:help" => {
            bot.send_message(chat_id, Command::descriptions().to_string())
                .await?;
        }
        other => {
            debug!(data = other, "unknown callback data, ignoring");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        let cmd = Command::parse("/track TRK-1042", "logibot").unwrap();
        assert_eq!(cmd, Command::Track("TRK-1042".to_string()));

        let cmd = Command::parse("/start@logibot", "logibot").unwrap();
        assert_eq!(cmd, Command::Start);

        assert!(Command::parse("hello there", "logibot").is_err());
    }

    #[test]
    fn test_track_reply_prompts_on_missing_number() {
        assert_eq!(track_reply("  "), TRACK_PROMPT);
        assert!(track_reply("TRK-7").contains("TRK-7"));
    }

    #[test]
    fn test_descriptions_list_all_commands() {
        let descriptions = Command::descriptions().to_string();
        assert!(descriptions.contains("/start"));
        assert!(descriptions.contains("/help"));
        assert!(descriptions.contains("/track"));
    }
}
