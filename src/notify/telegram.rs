// src/notify/telegram.rs
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{pause_between, DeliveryResult, Dispatcher, SEND_PAUSE};
use crate::digest::RenderedDigest;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Chat-bot channel: one `sendMessage` call per configured chat id.
pub struct TelegramDispatcher {
    token: String,
    chat_ids: Vec<String>,
    api_base: String,
    client: Client,
    pause: Duration,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// The bot API wraps errors in a 200-or-400 JSON envelope; success is
/// only the `ok` field, not the HTTP status.
#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramDispatcher {
    pub fn new(token: String, chat_ids: Vec<String>) -> Self {
        Self {
            token,
            chat_ids,
            api_base: DEFAULT_API_BASE.to_string(),
            client: Client::new(),
            pause: SEND_PAUSE,
        }
    }

    pub fn with_api_base(mut self, base: String) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    async fn send_to(&self, chat_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let payload = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("sendMessage request")?;

        let status = resp.status();
        let body: ApiResponse = resp
            .json()
            .await
            .with_context(|| format!("sendMessage response body (HTTP {status})"))?;

        if !body.ok {
            return Err(anyhow!(
                "bot API rejected message (HTTP {status}): {}",
                body.description.unwrap_or_else(|| "no description".to_string())
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Dispatcher for TelegramDispatcher {
    fn channel_id(&self) -> &'static str {
        "telegram"
    }

    async fn dispatch(&self, digest: &RenderedDigest) -> Vec<DeliveryResult> {
        let mut results = Vec::with_capacity(self.chat_ids.len());
        for (idx, chat_id) in self.chat_ids.iter().enumerate() {
            pause_between(idx, self.pause).await;
            results.push(match self.send_to(chat_id, &digest.chat).await {
                Ok(()) => DeliveryResult::sent(self.channel_id(), chat_id),
                Err(e) => DeliveryResult::failed(self.channel_id(), chat_id, &e),
            });
        }
        results
    }
}
