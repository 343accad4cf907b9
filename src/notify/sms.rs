// src/notify/sms.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use super::{pause_between, DeliveryResult, Dispatcher, SEND_PAUSE};
use crate::digest::RenderedDigest;

pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";

/// SMS / chat-gateway channel (Twilio-style): form-encoded POST per
/// recipient number, basic auth with account credentials.
pub struct SmsDispatcher {
    account_sid: String,
    auth_token: String,
    from: String,
    recipients: Vec<String>,
    api_base: String,
    client: Client,
    pause: Duration,
}

impl SmsDispatcher {
    pub fn new(
        account_sid: String,
        auth_token: String,
        from: String,
        recipients: Vec<String>,
    ) -> Self {
        Self {
            account_sid,
            auth_token,
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

    async fn send_to(&self, to: &str, body: &str) -> Result<()> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        );
        let form = [("From", self.from.as_str()), ("To", to), ("Body", body)];

        self.client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .context("gateway send request")?
            .error_for_status()
            .context("gateway non-2xx")?;
        Ok(())
    }
}

#[async_trait]
impl Dispatcher for SmsDispatcher {
    fn channel_id(&self) -> &'static str {
        "sms"
    }

    async fn dispatch(&self, digest: &RenderedDigest) -> Vec<DeliveryResult> {
        let mut results = Vec::with_capacity(self.recipients.len());
        for (idx, to) in self.recipients.iter().enumerate() {
            pause_between(idx, self.pause).await;
            results.push(match self.send_to(to, &digest.sms).await {
                Ok(()) => DeliveryResult::sent(self.channel_id(), to),
                Err(e) => DeliveryResult::failed(self.channel_id(), to, &e),
            });
        }
        results
    }
}
