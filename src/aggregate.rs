// src/aggregate.rs
//! Merge entries from many feeds into one capped, ordered, duplicate-free
//! list. Dedupe state lives and dies with a single run; nothing persists.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::feed::{FeedEntry, FeedSource, Fetcher};

/// Which normalized key decides that two entries are the same headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupeBy {
    /// The entry link, when present. Link-less entries fall back to the
    /// title key so they still dedupe against each other instead of all
    /// colliding on "".
    #[default]
    Link,
    /// Lowercased, whitespace-collapsed title.
    Title,
}

impl DedupeBy {
    /// Compute the dedupe key for an entry. Idempotent: feeding a key
    /// back in yields the same key.
    pub fn key_for(self, entry: &FeedEntry) -> String {
        match self {
            DedupeBy::Link if !entry.link.trim().is_empty() => entry.link.trim().to_string(),
            _ => title_key(&entry.title),
        }
    }
}

fn title_key(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// One feed that contributed nothing this run, and why.
#[derive(Debug, Clone)]
pub struct FeedFailure {
    pub url: String,
    pub error: String,
}

/// Visit feeds in configured order and collect up to `max` unique,
/// non-empty-titled entries. Stops fetching as soon as the cap is
/// reached, so later feeds cost nothing once the message is full.
///
/// Fetch failures are absorbed into the returned [`FeedFailure`] list;
/// they never abort the run.
pub async fn collect_headlines(
    fetcher: &Fetcher,
    sources: &[FeedSource],
    max: usize,
    dedupe_by: DedupeBy,
) -> (Vec<FeedEntry>, Vec<FeedFailure>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut collected: Vec<FeedEntry> = Vec::with_capacity(max);
    let mut failures: Vec<FeedFailure> = Vec::new();

    for source in sources {
        if collected.len() >= max {
            break;
        }

        let parsed = match fetcher.fetch(&source.url).await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(url = %source.url, error = %e, "feed skipped");
                failures.push(FeedFailure {
                    url: source.url.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        for entry in parsed.entries {
            if collected.len() >= max {
                break;
            }
            // Empty titles carry no information and would all share one key.
            if entry.title.is_empty() {
                continue;
            }
            let key = dedupe_by.key_for(&entry);
            if !seen.insert(key) {
                debug!(title = %entry.title, "duplicate headline skipped");
                continue;
            }
            collected.push(entry);
        }
    }

    (collected, failures)
}
