//! Telegram message formatting and delivery.

use pricewatch_core::{AlertEvent, ThresholdKind};
use pricewatch_engine::format_amount;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),
    #[error("invalid chat id: {0}")]
    InvalidChatId(String),
}

/// Thin wrapper around a teloxide bot bound to one chat.
#[derive(Debug)]
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    /// Create a notifier for the given bot token and chat id.
    pub fn new(token: &str, chat_id: &str) -> Result<Self, TelegramError> {
        let id: i64 = chat_id
            .parse()
            .map_err(|_| TelegramError::InvalidChatId(chat_id.to_string()))?;
        Ok(Self {
            bot: Bot::new(token),
            chat_id: ChatId(id),
        })
    }

    /// Send one HTML-formatted message to the configured chat.
    pub async fn send(&self, text: &str) -> Result<(), TelegramError> {
        self.bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}

/// Format a threshold breach as an individual alert message.
pub fn format_alert_message(event: &AlertEvent) -> String {
    let (emoji, headline) = match event.kind {
        ThresholdKind::High => ("\u{1F534}", "SELL ALERT"),
        ThresholdKind::Low => ("\u{1F7E2}", "BUY ALERT"),
    };

    let mut msg = format!(
        "\u{1F6A8} {} <b>{}</b>\n\n\
         <b>{}</b>\n\
         Price: {}\n\
         Target: {}\n\
         Variation: {:+.2}%",
        emoji,
        headline,
        event.instrument.display_name(),
        format_amount(event.currency, event.price),
        format_amount(event.currency, event.threshold),
        event.variation_pct()
    );

    let now = chrono::Utc::now();
    msg.push_str(&format!("\n\n\u{23F0} {}", now.format("%Y-%m-%d %H:%M:%S UTC")));

    msg
}
