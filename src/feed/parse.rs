// src/feed/parse.rs
//! RSS 2.0 / Atom deserialization via quick-xml.
//!
//! Both dialects are tried in order; whichever deserializes wins. Entries
//! keep empty titles here — filtering happens in the aggregator, parsing
//! stays lossless.

use quick_xml::de::from_str;
use serde::Deserialize;

use super::{normalize_title, FeedEntry};

/// A parsed feed document: display title (when the feed carries one) plus
/// its entries in document order.
#[derive(Debug)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<String>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Parse a feed body into entries. RSS 2.0 is tried first, then Atom.
pub fn parse_feed(body: &str) -> anyhow::Result<ParsedFeed> {
    let clean = scrub_html_entities_for_xml(body);

    if let Ok(rss) = from_str::<Rss>(&clean) {
        return Ok(from_rss(rss));
    }

    let atom: AtomFeed = from_str(&clean)
        .map_err(|e| anyhow::anyhow!("body is neither RSS 2.0 nor Atom: {e}"))?;
    Ok(from_atom(atom))
}

fn from_rss(rss: Rss) -> ParsedFeed {
    let source = rss
        .channel
        .title
        .as_deref()
        .map(normalize_title)
        .unwrap_or_default();

    let entries = rss
        .channel
        .items
        .into_iter()
        .map(|it| FeedEntry {
            title: normalize_title(it.title.as_deref().unwrap_or_default()),
            link: it.link.unwrap_or_default().trim().to_string(),
            source: source.clone(),
            published: it.pub_date.unwrap_or_default().trim().to_string(),
        })
        .collect();

    ParsedFeed {
        title: rss.channel.title.map(|t| normalize_title(&t)),
        entries,
    }
}

fn from_atom(feed: AtomFeed) -> ParsedFeed {
    let source = feed
        .title
        .as_deref()
        .map(normalize_title)
        .unwrap_or_default();

    let entries = feed
        .entries
        .into_iter()
        .map(|en| {
            // Prefer the alternate link; Atom entries often list self/edit too.
            let link = en
                .links
                .iter()
                .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
                .or_else(|| en.links.first())
                .and_then(|l| l.href.clone())
                .unwrap_or_default();

            FeedEntry {
                title: normalize_title(en.title.as_deref().unwrap_or_default()),
                link: link.trim().to_string(),
                source: source.clone(),
                published: en
                    .published
                    .or(en.updated)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            }
        })
        .collect();

    ParsedFeed {
        title: feed.title.map(|t| normalize_title(&t)),
        entries,
    }
}

/// Real-world feeds leak HTML entities that are not valid XML; swap the
/// common ones before handing the document to quick-xml.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
