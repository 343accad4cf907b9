// src/notify/email.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{pause_between, DeliveryResult, Dispatcher, SEND_PAUSE};
use crate::digest::RenderedDigest;

pub const DEFAULT_API_BASE: &str = "https://api.sendgrid.com";

/// Transactional-mail channel. One API call per recipient so a single
/// bad address cannot take down the whole batch.
pub struct EmailDispatcher {
    api_key: String,
    from: String,
    recipients: Vec<String>,
    api_base: String,
    client: Client,
    pause: Duration,
}

#[derive(Serialize)]
struct MailSend<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    content: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
    subject: &'a str,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

impl EmailDispatcher {
    pub fn new(api_key: String, from: String, recipients: Vec<String>) -> Self {
        Self {
            api_key,
            from,
            recipients,
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

    async fn send_to(&self, recipient: &str, subject: &str, html: &str) -> Result<()> {
        let url = format!("{}/v3/mail/send", self.api_base);
        let payload = MailSend {
            personalizations: [Personalization {
                to: [Address { email: recipient }],
                subject,
            }],
            from: Address { email: &self.from },
            content: [Content {
                content_type: "text/html",
                value: html,
            }],
        };

        self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("mail send request")?
            .error_for_status()
            .context("mail API non-2xx")?;
        Ok(())
    }
}

#[async_trait]
impl Dispatcher for EmailDispatcher {
    fn channel_id(&self) -> &'static str {
        "email"
    }

    async fn dispatch(&self, digest: &RenderedDigest) -> Vec<DeliveryResult> {
        let mut results = Vec::with_capacity(self.recipients.len());
        for (idx, recipient) in self.recipients.iter().enumerate() {
            pause_between(idx, self.pause).await;
            results.push(
                match self
                    .send_to(recipient, &digest.email_subject, &digest.email_html)
                    .await
                {
                    Ok(()) => DeliveryResult::sent(self.channel_id(), recipient),
                    Err(e) => DeliveryResult::failed(self.channel_id(), recipient, &e),
                },
            );
        }
        results
    }
}
