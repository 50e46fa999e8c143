//! Normalization helpers shared by the fetchers, translator and renderer.
//!
//! - Markup stripping and length-bounded truncation
//! - Relative "time ago" labels
//! - The ASCII-ratio language heuristic
//! - Video thumbnail derivation
//! - Output path validation

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Maximum summary length in characters.
pub const SUMMARY_MAX_CHARS: usize = 300;

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"v=([^&]+)").unwrap());

/// Truncate to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number
/// of dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let cut = truncate_chars(s, max);
    if cut.len() == s.len() {
        cut
    } else {
        format!("{}…(+{} bytes)", cut, s.len() - cut.len())
    }
}

/// Strip markup and return visible text, space separated, capped at
/// [`SUMMARY_MAX_CHARS`].
pub fn clean_html(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(text);
    let plain = fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    truncate_chars(&plain, SUMMARY_MAX_CHARS)
}

/// Human-readable age of `published` relative to `now`.
///
/// Returns an empty string when there is no date.
pub fn time_ago(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(published) = published else {
        return String::new();
    };
    let hours = (now - published).num_seconds() as f64 / 3600.0;
    if hours < 1.0 {
        "たった今".to_string()
    } else if hours < 24.0 {
        format!("{}時間前", hours as i64)
    } else if hours < 48.0 {
        "1日前".to_string()
    } else if hours < 168.0 {
        format!("{}日前", (hours / 24.0) as i64)
    } else {
        let weeks = (hours / 168.0) as i64;
        if weeks <= 4 {
            format!("{}週間前", weeks)
        } else {
            format!("{}ヶ月前", (hours / 720.0) as i64)
        }
    }
}

/// ASCII-ratio heuristic: more than 80% of characters below U+0080 means
/// the text is foreign. Empty text is never foreign.
pub fn is_foreign_text(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let ascii = text.chars().filter(char::is_ascii).count();
    ascii as f64 / total as f64 > 0.8
}

/// Whether `published` is older than `max_age_days` days before `now`.
pub fn is_stale(published: DateTime<Utc>, max_age_days: i64, now: DateTime<Utc>) -> bool {
    (now - published).num_days() > max_age_days
}

/// Thumbnail URL for a video ID on the video platform's image CDN.
pub fn video_thumbnail(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", video_id)
}

/// Derive a thumbnail from a recognizable watch URL (`youtube.com/...v=ID`).
pub fn thumbnail_from_watch_url(link: &str) -> Option<String> {
    if !link.contains("youtube.com") {
        return None;
    }
    VIDEO_ID
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|id| video_thumbnail(id.as_str()))
}

/// Ensure the parent directory of `path` exists so the page can be written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
        info!(dir = %parent.display(), "Output directory ready");
    }
    Ok(())
}
