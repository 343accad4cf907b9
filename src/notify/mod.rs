// src/notify/mod.rs
//! Delivery channels. Each dispatcher owns its destinations and attempts
//! every one independently; a failed send is recorded, never raised.

pub mod email;
pub mod sms;
pub mod telegram;

pub use email::EmailDispatcher;
pub use sms::SmsDispatcher;
pub use telegram::TelegramDispatcher;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::digest::RenderedDigest;

/// Pause between consecutive sends on the same channel, to stay clear of
/// bursty rate limiting.
pub const SEND_PAUSE: Duration = Duration::from_secs(1);

/// Outcome of one delivery attempt to one destination.
#[derive(Debug, Clone)]
pub struct DeliveryResult {
    pub channel: &'static str,
    pub destination: String,
    pub ok: bool,
    pub detail: String,
}

impl DeliveryResult {
    pub(crate) fn sent(channel: &'static str, destination: &str) -> Self {
        Self {
            channel,
            destination: destination.to_string(),
            ok: true,
            detail: "sent".to_string(),
        }
    }

    pub(crate) fn failed(channel: &'static str, destination: &str, error: &anyhow::Error) -> Self {
        Self {
            channel,
            destination: destination.to_string(),
            ok: false,
            detail: format!("{error:#}"),
        }
    }
}

/// One notification channel. `dispatch` attempts every configured
/// destination and reports per-destination outcomes.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    fn channel_id(&self) -> &'static str;

    async fn dispatch(&self, digest: &RenderedDigest) -> Vec<DeliveryResult>;
}

/// Send the digest through every configured channel in order, absorbing
/// failures into the result list.
pub async fn dispatch_all(
    channels: &[Box<dyn Dispatcher>],
    digest: &RenderedDigest,
) -> Vec<DeliveryResult> {
    let mut results = Vec::new();

    for channel in channels {
        let mut outcomes = channel.dispatch(digest).await;
        for outcome in &outcomes {
            if outcome.ok {
                info!(
                    channel = outcome.channel,
                    destination = %outcome.destination,
                    "delivered"
                );
            } else {
                warn!(
                    channel = outcome.channel,
                    destination = %outcome.destination,
                    detail = %outcome.detail,
                    "delivery failed"
                );
            }
        }
        results.append(&mut outcomes);
    }

    results
}

pub(crate) async fn pause_between(idx: usize, pause: Duration) {
    if idx > 0 && !pause.is_zero() {
        tokio::time::sleep(pause).await;
    }
}
