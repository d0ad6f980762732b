//! Alert delivery

use crate::config::TelegramConfig;
use crate::error::{RadarError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Pushes alerts to a Telegram chat through the Bot API
pub struct TelegramNotifier {
    http: Client,
    bot_token: String,
    chat_id: String,
    parse_mode: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            http: Client::new(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            parse_mode: config.parse_mode.clone(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );

        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: &self.parse_mode,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RadarError::Notify(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RadarError::Notify(format!("telegram returned {}: {}", status, body)));
        }
        Ok(())
    }
}

/// Writes alerts to the log when no chat is configured
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        tracing::info!("ALERT\n{}", text);
        Ok(())
    }
}
