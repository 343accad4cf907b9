// src/digest.rs
//! Deterministic rendering of aggregated headlines into per-channel
//! payloads. Pure string work: same entries + timestamp in, byte-identical
//! messages out.

use chrono::{DateTime, Utc};

use crate::feed::FeedEntry;

/// Hard cap of the chat bot API for one message.
pub const CHAT_MESSAGE_LIMIT: usize = 4096;
/// Keep SMS/chat-gateway payloads short; long bodies get split and billed
/// per segment.
pub const SMS_MESSAGE_LIMIT: usize = 1500;

const SIGNATURE: &str = "— NewsAlertBot · headlines & links from public RSS feeds";
const MORE_NOTICE: &str = "\n\n… read more on the channel.";

/// Aggregated headlines plus the run context the formatter needs.
#[derive(Debug, Clone)]
pub struct Digest {
    pub category: String,
    pub entries: Vec<FeedEntry>,
    pub generated_at: DateTime<Utc>,
}

/// The per-channel payloads for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDigest {
    /// HTML-formatted chat message, at most [`CHAT_MESSAGE_LIMIT`] chars.
    pub chat: String,
    pub email_subject: String,
    pub email_html: String,
    /// Plain text, at most [`SMS_MESSAGE_LIMIT`] chars.
    pub sms: String,
}

pub fn render(digest: &Digest) -> RenderedDigest {
    let category = capitalize(&digest.category);
    let stamp = digest.generated_at.format("%b %d, %Y %H:%M UTC").to_string();

    RenderedDigest {
        chat: truncate_with_notice(
            &render_chat(digest, &category, &stamp),
            CHAT_MESSAGE_LIMIT,
            MORE_NOTICE,
        ),
        email_subject: format!("NewsAlert — {} — {}", category, stamp),
        email_html: render_email(digest, &category, &stamp),
        sms: truncate_with_notice(
            &render_plain(digest, &category, &stamp),
            SMS_MESSAGE_LIMIT,
            MORE_NOTICE,
        ),
    }
}

/// Escape interpolated text for HTML output. Applied to every field that
/// comes from a feed, never to our own formatting characters.
fn escape_html(s: &str) -> String {
    html_escape::encode_text(s).to_string()
}

fn render_chat(digest: &Digest, category: &str, stamp: &str) -> String {
    let mut lines = vec![format!(
        "📰 <b>NewsAlert — {} — {}</b>",
        escape_html(category),
        escape_html(stamp)
    )];
    lines.push(String::new());

    for (idx, entry) in digest.entries.iter().enumerate() {
        lines.push(format!("{}. {}", idx + 1, escape_html(&entry.title)));
        if !entry.source.is_empty() {
            lines.push(format!("<i>{}</i>", escape_html(&entry.source)));
        }
        if !entry.link.is_empty() {
            // The chat client auto-links plain URLs; no anchor markup needed.
            lines.push(entry.link.clone());
        }
        lines.push(String::new());
    }

    lines.push(SIGNATURE.to_string());
    lines.join("\n")
}

fn render_email(digest: &Digest, category: &str, stamp: &str) -> String {
    let mut html = format!(
        "<h3>NewsAlert — {} — {}</h3>\n",
        escape_html(category),
        escape_html(stamp)
    );

    for entry in &digest.entries {
        html.push_str("<p><b>");
        html.push_str(&escape_html(&entry.title));
        html.push_str("</b>");
        if !entry.source.is_empty() {
            html.push_str("<br><i>");
            html.push_str(&escape_html(&entry.source));
            html.push_str("</i>");
        }
        if !entry.link.is_empty() {
            html.push_str("<br><a href=\"");
            html.push_str(&html_escape::encode_double_quoted_attribute(&entry.link));
            html.push_str("\">");
            html.push_str(&escape_html(&entry.link));
            html.push_str("</a>");
        }
        html.push_str("</p>\n");
    }

    html.push_str("<p><i>");
    html.push_str(&escape_html(SIGNATURE));
    html.push_str("</i></p>\n");
    html
}

fn render_plain(digest: &Digest, category: &str, stamp: &str) -> String {
    let mut lines = vec![format!("NewsAlert — {} — {}", category, stamp)];
    lines.push(String::new());

    for (idx, entry) in digest.entries.iter().enumerate() {
        lines.push(format!("{}. {}", idx + 1, entry.title));
        if !entry.link.is_empty() {
            lines.push(entry.link.clone());
        }
        lines.push(String::new());
    }

    lines.push(SIGNATURE.to_string());
    lines.join("\n")
}

/// Shorten `text` to at most `limit` chars, replacing the removed tail
/// with `notice`. The cut never lands inside a UTF-8 char (we count in
/// chars) or inside an HTML entity like `&amp;`.
pub fn truncate_with_notice(text: &str, limit: usize, notice: &str) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let budget = limit.saturating_sub(notice.chars().count());
    let mut cut: String = text.chars().take(budget).collect();

    // Back off an unterminated entity left at the cut point.
    if let Some(amp) = cut.rfind('&') {
        if !cut[amp..].contains(';') {
            cut.truncate(amp);
        }
    }

    cut.push_str(notice);
    cut
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
