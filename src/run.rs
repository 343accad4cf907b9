// src/run.rs
//! One end-to-end run: fetch → aggregate → format → dispatch → report.
//! Linear pipeline; the only early exit is the (normal) empty-headlines
//! case.

use chrono::Utc;
use tracing::{info, warn};

use crate::aggregate::{collect_headlines, FeedFailure};
use crate::config::Config;
use crate::digest::{render, Digest};
use crate::feed::Fetcher;
use crate::notify::{
    dispatch_all, DeliveryResult, Dispatcher, EmailDispatcher, SmsDispatcher, TelegramDispatcher,
};

/// What a run did. Per-feed and per-destination failures live here; only
/// configuration and truly unexpected errors escalate past [`run`].
#[derive(Debug, Default)]
pub struct RunSummary {
    pub collected: usize,
    pub feed_failures: Vec<FeedFailure>,
    pub deliveries: Vec<DeliveryResult>,
}

impl RunSummary {
    pub fn sent(&self) -> usize {
        self.deliveries.iter().filter(|d| d.ok).count()
    }

    pub fn failed(&self) -> usize {
        self.deliveries.iter().filter(|d| !d.ok).count()
    }
}

/// Execute one run against the resolved configuration.
///
/// In dry-run mode the chat payload goes to stdout and no dispatcher is
/// built, so no network delivery can happen.
pub async fn run(config: &Config) -> anyhow::Result<RunSummary> {
    info!(
        category = %config.category,
        feeds = config.feeds.len(),
        max = config.max_headlines,
        "collecting headlines"
    );

    let fetcher = Fetcher::new(config.request_timeout);
    let (entries, feed_failures) = collect_headlines(
        &fetcher,
        &config.feeds,
        config.max_headlines,
        config.dedupe_by,
    )
    .await;

    if entries.is_empty() {
        warn!(
            feeds_failed = feed_failures.len(),
            "no headlines collected, nothing to send"
        );
        return Ok(RunSummary {
            collected: 0,
            feed_failures,
            deliveries: Vec::new(),
        });
    }

    let collected = entries.len();
    let digest = Digest {
        category: config.category.clone(),
        entries,
        generated_at: Utc::now(),
    };
    let rendered = render(&digest);

    if config.dry_run {
        println!("{}", rendered.chat);
        info!(collected, "dry run, skipping dispatch");
        return Ok(RunSummary {
            collected,
            feed_failures,
            deliveries: Vec::new(),
        });
    }

    let channels = build_dispatchers(config);
    let deliveries = dispatch_all(&channels, &rendered).await;

    let summary = RunSummary {
        collected,
        feed_failures,
        deliveries,
    };
    info!(
        collected = summary.collected,
        sent = summary.sent(),
        failed = summary.failed(),
        feeds_failed = summary.feed_failures.len(),
        "run finished"
    );
    Ok(summary)
}

fn build_dispatchers(config: &Config) -> Vec<Box<dyn Dispatcher>> {
    let mut channels: Vec<Box<dyn Dispatcher>> = Vec::new();

    if let Some(tg) = &config.telegram {
        let mut d = TelegramDispatcher::new(tg.token.clone(), tg.chat_ids.clone());
        if let Some(base) = &tg.api_base {
            d = d.with_api_base(base.clone());
        }
        channels.push(Box::new(d));
    }

    if let Some(em) = &config.email {
        let mut d = EmailDispatcher::new(em.api_key.clone(), em.from.clone(), em.to.clone());
        if let Some(base) = &em.api_base {
            d = d.with_api_base(base.clone());
        }
        channels.push(Box::new(d));
    }

    if let Some(sms) = &config.sms {
        let mut d = SmsDispatcher::new(
            sms.account_sid.clone(),
            sms.auth_token.clone(),
            sms.from.clone(),
            sms.to.clone(),
        );
        if let Some(base) = &sms.api_base {
            d = d.with_api_base(base.clone());
        }
        channels.push(Box::new(d));
    }

    channels
}
