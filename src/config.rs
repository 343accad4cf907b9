// src/config.rs
//! Run configuration, resolved once at startup from environment + CLI and
//! handed to the pipeline as a plain struct. Nothing else in the crate
//! reads the environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::aggregate::DedupeBy;
use crate::feed::FeedSource;

pub const ENV_FEEDS_PATH: &str = "NEWSALERT_FEEDS_PATH";
const DEFAULT_FEEDS_PATH: &str = "config/feeds.toml";

const DEFAULT_MAX_HEADLINES: usize = 8;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CATEGORY: &str = "world";

/// Chat-bot channel credentials, present only when fully configured.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_ids: Vec<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: String,
    pub from: String,
    pub to: Vec<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub to: Vec<String>,
    pub api_base: Option<String>,
}

/// Everything one run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct Config {
    pub category: String,
    pub feeds: Vec<FeedSource>,
    pub max_headlines: usize,
    pub request_timeout: Duration,
    pub dedupe_by: DedupeBy,
    pub telegram: Option<TelegramConfig>,
    pub email: Option<EmailConfig>,
    pub sms: Option<SmsConfig>,
    pub dry_run: bool,
}

/// CLI values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub category: Option<String>,
    pub feeds_path: Option<PathBuf>,
    pub dry_run: bool,
}

impl Config {
    /// Resolve the full configuration. Fails fast — before any network
    /// I/O — on partial channel credentials or, outside dry-run, when no
    /// channel is configured at all.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let category = overrides
            .category
            .or_else(|| env_opt("CATEGORY"))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
            .to_lowercase();

        let max_headlines = match env_opt("MAX_HEADLINES") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("MAX_HEADLINES is not a number: {raw:?}"))?,
            None => DEFAULT_MAX_HEADLINES,
        };

        let timeout_secs = match env_opt("REQUEST_TIMEOUT") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("REQUEST_TIMEOUT is not a number: {raw:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let dedupe_by = match env_opt("NEWSALERT_DEDUPE_BY").as_deref() {
            None | Some("link") => DedupeBy::Link,
            Some("title") => DedupeBy::Title,
            Some(other) => bail!("NEWSALERT_DEDUPE_BY must be \"link\" or \"title\", got {other:?}"),
        };

        let table = load_feed_table(overrides.feeds_path.as_deref())?;
        let feeds = feeds_for_category(&table, &category);
        if feeds.is_empty() {
            bail!("no feeds configured for category {category:?} (and no \"world\" fallback)");
        }

        let telegram = resolve_telegram(&category)?;
        let email = resolve_email()?;
        let sms = resolve_sms()?;

        if !overrides.dry_run && telegram.is_none() && email.is_none() && sms.is_none() {
            bail!(
                "no delivery channel configured; set TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_IDS, \
                 SENDGRID_API_KEY/EMAIL_FROM/EMAIL_TO or TWILIO_* — or pass --dry-run"
            );
        }

        Ok(Self {
            category,
            feeds,
            max_headlines,
            request_timeout: Duration::from_secs(timeout_secs),
            dedupe_by,
            telegram,
            email,
            sms,
            dry_run: overrides.dry_run,
        })
    }
}

fn resolve_telegram(category: &str) -> Result<Option<TelegramConfig>> {
    let token = env_opt("TELEGRAM_BOT_TOKEN");
    let mapped = env_opt("TELEGRAM_CHAT_IDS");
    let single = env_opt("TELEGRAM_CHAT_ID");

    if token.is_none() && mapped.is_none() && single.is_none() {
        return Ok(None);
    }

    let token = token.ok_or_else(|| {
        anyhow!("TELEGRAM_CHAT_IDS is set but TELEGRAM_BOT_TOKEN is missing")
    })?;

    let mut chat_ids = mapped
        .as_deref()
        .map(|raw| parse_destination_ids(raw, category))
        .unwrap_or_default();
    if chat_ids.is_empty() {
        chat_ids.extend(single);
    }
    if chat_ids.is_empty() {
        bail!("TELEGRAM_BOT_TOKEN is set but no chat id resolves for category {category:?}");
    }

    Ok(Some(TelegramConfig {
        token,
        chat_ids,
        api_base: env_opt("TELEGRAM_API_BASE"),
    }))
}

fn resolve_email() -> Result<Option<EmailConfig>> {
    let api_key = env_opt("SENDGRID_API_KEY");
    let from = env_opt("EMAIL_FROM");
    let to = env_opt("EMAIL_TO").map(|raw| split_list(&raw)).unwrap_or_default();

    match (api_key, from, to.is_empty()) {
        (None, None, true) => Ok(None),
        (Some(api_key), Some(from), false) => Ok(Some(EmailConfig {
            api_key,
            from,
            to,
            api_base: env_opt("SENDGRID_API_BASE"),
        })),
        _ => bail!("email channel partially configured; need all of SENDGRID_API_KEY, EMAIL_FROM, EMAIL_TO"),
    }
}

fn resolve_sms() -> Result<Option<SmsConfig>> {
    let account_sid = env_opt("TWILIO_SID");
    let auth_token = env_opt("TWILIO_TOKEN");
    let from = env_opt("TWILIO_FROM");
    let to = env_opt("TWILIO_TO").map(|raw| split_list(&raw)).unwrap_or_default();

    match (account_sid, auth_token, from, to.is_empty()) {
        (None, None, None, true) => Ok(None),
        (Some(account_sid), Some(auth_token), Some(from), false) => Ok(Some(SmsConfig {
            account_sid,
            auth_token,
            from,
            to,
            api_base: env_opt("TWILIO_API_BASE"),
        })),
        _ => bail!("SMS channel partially configured; need all of TWILIO_SID, TWILIO_TOKEN, TWILIO_FROM, TWILIO_TO"),
    }
}

/// Chat destinations come in three shapes: a single id, a comma list, or
/// a `label:id` map keyed by category ("world:-100123,tech:-100456").
pub fn parse_destination_ids(raw: &str, category: &str) -> Vec<String> {
    let pieces: Vec<&str> = raw.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();

    if pieces.iter().any(|p| p.contains(':')) {
        let mut map = HashMap::new();
        for piece in &pieces {
            if let Some((label, id)) = piece.split_once(':') {
                map.insert(label.trim().to_lowercase(), id.trim().to_string());
            }
        }
        return map
            .get(&category.to_lowercase())
            .filter(|id| !id.is_empty())
            .map(|id| vec![id.clone()])
            .unwrap_or_default();
    }

    pieces.into_iter().map(str::to_string).collect()
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
struct FeedsFile {
    categories: HashMap<String, Vec<String>>,
}

/// Feed table resolution chain: explicit CLI path, then
/// `$NEWSALERT_FEEDS_PATH`, then `config/feeds.toml`, then the built-in
/// defaults.
fn load_feed_table(cli_path: Option<&Path>) -> Result<HashMap<String, Vec<String>>> {
    if let Some(p) = cli_path {
        return parse_feeds_file(p);
    }
    if let Some(p) = env_opt(ENV_FEEDS_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            bail!("{ENV_FEEDS_PATH} points to non-existent path {}", pb.display());
        }
        return parse_feeds_file(&pb);
    }
    let default = PathBuf::from(DEFAULT_FEEDS_PATH);
    if default.exists() {
        return parse_feeds_file(&default);
    }
    Ok(default_feed_table())
}

fn parse_feeds_file(path: &Path) -> Result<HashMap<String, Vec<String>>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feeds from {}", path.display()))?;
    let parsed: FeedsFile =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(parsed.categories)
}

fn feeds_for_category(table: &HashMap<String, Vec<String>>, category: &str) -> Vec<FeedSource> {
    let urls = table
        .get(category)
        .or_else(|| table.get(DEFAULT_CATEGORY))
        .cloned()
        .unwrap_or_default();
    urls.into_iter()
        .map(|url| FeedSource::new(url, category))
        .collect()
}

fn default_feed_table() -> HashMap<String, Vec<String>> {
    let mut table = HashMap::new();
    table.insert(
        "world".to_string(),
        vec![
            "https://feeds.bbci.co.uk/news/world/rss.xml".to_string(),
            "https://feeds.reuters.com/Reuters/worldNews".to_string(),
            "https://www.aljazeera.com/xml/rss/all.xml".to_string(),
            "https://rss.nytimes.com/services/xml/rss/nyt/World.xml".to_string(),
        ],
    );
    table.insert(
        "business".to_string(),
        vec![
            "https://feeds.reuters.com/news/wealth".to_string(),
            "https://www.ft.com/?format=rss".to_string(),
        ],
    );
    table.insert(
        "tech".to_string(),
        vec![
            "https://rss.nytimes.com/services/xml/rss/nyt/Technology.xml".to_string(),
            "https://www.theverge.com/rss/index.xml".to_string(),
        ],
    );
    table.insert(
        "sports".to_string(),
        vec!["https://feeds.bbci.co.uk/sport/rss.xml?edition=uk".to_string()],
    );
    table.insert(
        "india".to_string(),
        vec![
            "https://timesofindia.indiatimes.com/rssfeedstopstories.cms".to_string(),
            "https://www.hindustantimes.com/rss/topnews/rssfeed.xml".to_string(),
        ],
    );
    table
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_id_parses_as_one_destination() {
        assert_eq!(parse_destination_ids("-1001234", "world"), vec!["-1001234"]);
    }

    #[test]
    fn comma_list_parses_in_order() {
        assert_eq!(
            parse_destination_ids(" -1001, -1002 ,,-1003", "world"),
            vec!["-1001", "-1002", "-1003"]
        );
    }

    #[test]
    fn label_map_selects_category_case_insensitively() {
        let raw = "World:-100123, tech:-100456";
        assert_eq!(parse_destination_ids(raw, "WORLD"), vec!["-100123"]);
        assert_eq!(parse_destination_ids(raw, "tech"), vec!["-100456"]);
        assert!(parse_destination_ids(raw, "sports").is_empty());
    }

    #[test]
    fn split_list_trims_and_drops_empties() {
        assert_eq!(split_list("a@x.test, ,b@y.test"), vec!["a@x.test", "b@y.test"]);
    }

    #[test]
    fn unknown_category_falls_back_to_world() {
        let table = default_feed_table();
        let feeds = feeds_for_category(&table, "gardening");
        assert!(!feeds.is_empty());
        assert_eq!(feeds[0].url, table["world"][0]);
        assert_eq!(feeds[0].category, "gardening");
    }

    #[test]
    fn feeds_file_parses_categories_table() {
        let toml = r#"
[categories]
world = ["https://w/1", "https://w/2"]
tech = ["https://t/1"]
"#;
        let parsed: FeedsFile = toml::from_str(toml).unwrap();
        assert_eq!(parsed.categories["world"].len(), 2);
        assert_eq!(parsed.categories["tech"], vec!["https://t/1"]);
    }
}
