// src/feed/mod.rs
pub mod fetch;
pub mod parse;

pub use fetch::{FetchError, Fetcher};

use once_cell::sync::OnceCell;

/// One headline as carried through the pipeline. Immutable once built;
/// `link` and `published` are best-effort and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// Display title of the feed this entry came from ("" when absent).
    pub source: String,
    /// Raw date text from the feed, carried verbatim.
    pub published: String,
}

/// A configured feed: URL plus the category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
    pub category: String,
}

impl FeedSource {
    pub fn new(url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            category: category.into(),
        }
    }
}

/// Clean up a title or feed name pulled out of feed XML:
/// decode HTML entities, drop markup tags, collapse whitespace.
pub fn normalize_title(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}
