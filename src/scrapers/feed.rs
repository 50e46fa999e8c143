//! Syndication feed fetcher (RSS, Atom, JSON Feed).
//!
//! Parsing is delegated to `feed-rs`. Up to [`MAX_CANDIDATES`] entries are
//! considered in feed order; stale entries are skipped when the source has
//! a freshness ceiling and the entry has a date. Undated entries are kept.

use crate::models::{Item, Language, MAX_ITEMS_PER_SOURCE};
use crate::scrapers::{FetchError, get_bytes};
use crate::utils::{clean_html, is_foreign_text, is_stale, thumbnail_from_watch_url, time_ago};
use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{info, instrument};

/// Entries examined per feed.
pub const MAX_CANDIDATES: usize = 10;

/// Title used when an entry has none.
pub const UNTITLED: &str = "（タイトルなし）";

static IMG_WITH_SRC: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());

/// Fetch and normalize one feed.
#[instrument(level = "info", skip(client, now))]
pub async fn fetch(
    client: &Client,
    source_key: &str,
    url: &str,
    max_age_days: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Vec<Item>, FetchError> {
    let body = get_bytes(client, url).await?;
    let items = parse_feed(&body, source_key, max_age_days, now)?;
    info!(count = items.len(), "Parsed feed");
    Ok(items)
}

/// Parse a feed document into at most [`MAX_ITEMS_PER_SOURCE`] items.
pub fn parse_feed(
    body: &[u8],
    source_key: &str,
    max_age_days: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Vec<Item>, FetchError> {
    let feed = feed_rs::parser::parse(body)?;
    let items = feed
        .entries
        .iter()
        .take(MAX_CANDIDATES)
        .map(|entry| entry_to_item(entry, source_key, now))
        .filter(|item| match (max_age_days, item.published_at) {
            (Some(max_age), Some(published)) => !is_stale(published, max_age, now),
            _ => true,
        })
        .take(MAX_ITEMS_PER_SOURCE)
        .collect();
    Ok(items)
}

fn entry_to_item(entry: &Entry, source_key: &str, now: DateTime<Utc>) -> Item {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());
    let link = entry_link(entry);
    let markup = entry_markup(entry);

    let mut item = Item::new(source_key, title, link);
    item.summary = clean_html(markup);
    item.published_at = entry.published.or(entry.updated);
    item.recency_label = time_ago(item.published_at, now);
    item.thumbnail_url = entry_thumbnail(entry, markup, &item.link);
    item.language = if is_foreign_text(&item.title) {
        Language::Foreign
    } else {
        Language::Native
    };
    item
}

/// The entry's page link: the first alternate (or untyped) link, else the first link.
fn entry_link(entry: &Entry) -> String {
    entry
        .links
        .iter()
        .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
        .or_else(|| entry.links.first())
        .map(|l| l.href.clone())
        .unwrap_or_default()
}

/// Summary/description markup, falling back to the full content body.
fn entry_markup(entry: &Entry) -> &str {
    entry
        .summary
        .as_ref()
        .map(|s| s.content.as_str())
        .filter(|s| !s.trim().is_empty())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.as_deref()))
        .unwrap_or("")
}

/// Resolve a thumbnail in priority order: media thumbnail, image media
/// content, image enclosure link, first `<img>` in the markup, and finally a
/// derived video thumbnail for watch URLs.
fn entry_thumbnail(entry: &Entry, markup: &str, link: &str) -> Option<String> {
    let media_thumbnail = || {
        entry
            .media
            .iter()
            .flat_map(|m| m.thumbnails.iter())
            .map(|t| t.image.uri.clone())
            .find(|uri| !uri.is_empty())
    };
    let media_image = || {
        entry
            .media
            .iter()
            .flat_map(|m| m.content.iter())
            .filter(|c| {
                c.content_type
                    .as_ref()
                    .is_some_and(|ct| ct.to_string().starts_with("image"))
            })
            .find_map(|c| c.url.as_ref().map(|u| u.to_string()))
    };
    let enclosure = || {
        entry
            .links
            .iter()
            .filter(|l| l.rel.as_deref() == Some("enclosure"))
            .find(|l| l.media_type.as_deref().is_some_and(|t| t.starts_with("image")))
            .map(|l| l.href.clone())
    };
    let inline_image = || {
        if markup.is_empty() {
            return None;
        }
        Html::parse_fragment(markup)
            .select(&IMG_WITH_SRC)
            .find_map(|img| img.value().attr("src").map(str::to_string))
    };

    media_thumbnail()
        .or_else(media_image)
        .or_else(enclosure)
        .or_else(inline_image)
        .or_else(|| thumbnail_from_watch_url(link))
}
