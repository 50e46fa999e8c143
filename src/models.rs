//! Data models for digest items and the page summary.
//!
//! - [`Item`]: one normalized piece of content, regardless of where it came from
//! - [`Language`]: coarse classification driving translation
//! - [`PageStats`]: aggregate counts shown above the feed

use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Link used when a source provides none.
pub const PLACEHOLDER_LINK: &str = "#";

/// Maximum number of items any single source contributes to a run.
pub const MAX_ITEMS_PER_SOURCE: usize = 5;

/// Coarse, heuristic language classification of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    /// Already in the reader's language.
    #[default]
    Native,
    /// Candidate for machine translation.
    Foreign,
}

/// A normalized digest entry.
///
/// Every fetcher produces these; the translator fills in the `translated_*`
/// fields and the renderer consumes them. `link` is never empty: use
/// [`Item::new`] which substitutes [`PLACEHOLDER_LINK`].
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Registry key of the source that produced this item.
    pub source_key: String,
    pub title: String,
    /// Plain-text excerpt, possibly empty.
    pub summary: String,
    pub link: String,
    /// Absent when the source gives no reliable date.
    pub published_at: Option<DateTime<Utc>>,
    /// Human-readable age, e.g. "3時間前".
    pub recency_label: String,
    pub thumbnail_url: Option<String>,
    pub language: Language,
    pub translated_title: Option<String>,
    /// The untranslated title, recorded whenever translation was attempted.
    pub original_title: Option<String>,
    pub translated_summary: Option<String>,
}

impl Item {
    /// Create an item with the required fields; an empty `link` becomes the placeholder.
    pub fn new(source_key: &str, title: impl Into<String>, link: impl Into<String>) -> Self {
        let link = link.into();
        let link = if link.trim().is_empty() {
            PLACEHOLDER_LINK.to_string()
        } else {
            link
        };
        Self {
            source_key: source_key.to_string(),
            title: title.into(),
            summary: String::new(),
            link,
            published_at: None,
            recency_label: String::new(),
            thumbnail_url: None,
            language: Language::Native,
            translated_title: None,
            original_title: None,
            translated_summary: None,
        }
    }

    /// The title to show: the translation when there is one.
    pub fn display_title(&self) -> &str {
        self.translated_title.as_deref().unwrap_or(&self.title)
    }

    /// The summary to show: the translation when there is one.
    pub fn display_summary(&self) -> &str {
        self.translated_summary.as_deref().unwrap_or(&self.summary)
    }

    pub fn is_foreign(&self) -> bool {
        self.language == Language::Foreign
    }

    /// True when either the title or the summary was actually translated.
    pub fn was_translated(&self) -> bool {
        self.translated_title.is_some() || self.translated_summary.is_some()
    }
}

/// Aggregate counts for the stats line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageStats {
    pub total: usize,
    /// Distinct source keys contributing at least one item.
    pub sources: usize,
    pub translated: usize,
}

impl PageStats {
    pub fn from_items(items: &[Item]) -> Self {
        let sources = items
            .iter()
            .map(|item| item.source_key.as_str())
            .collect::<HashSet<_>>()
            .len();
        Self {
            total: items.len(),
            sources,
            translated: items.iter().filter(|item| item.was_translated()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_link_becomes_placeholder() {
        let item = Item::new("every", "A title that is long enough", "");
        assert_eq!(item.link, PLACEHOLDER_LINK);
        let item = Item::new("every", "A title", "   ");
        assert_eq!(item.link, PLACEHOLDER_LINK);
    }

    #[test]
    fn test_link_is_kept_when_present() {
        let item = Item::new("every", "Title", "https://every.to/p/post");
        assert_eq!(item.link, "https://every.to/p/post");
    }

    #[test]
    fn test_display_prefers_translation() {
        let mut item = Item::new("technium", "Hello world", "https://kk.org/");
        item.summary = "An essay".to_string();
        assert_eq!(item.display_title(), "Hello world");
        assert_eq!(item.display_summary(), "An essay");
        assert!(!item.was_translated());

        item.translated_title = Some("こんにちは世界".to_string());
        item.translated_summary = Some("エッセイ".to_string());
        assert_eq!(item.display_title(), "こんにちは世界");
        assert_eq!(item.display_summary(), "エッセイ");
        assert!(item.was_translated());
    }

    #[test]
    fn test_page_stats() {
        let mut translated = Item::new("hardfork", "Episode", "https://example.com/1");
        translated.translated_title = Some("エピソード".to_string());
        let items = vec![
            Item::new("ochiai_note", "記事", "https://note.com/a"),
            Item::new("ochiai_note", "記事2", "https://note.com/b"),
            translated,
        ];

        let stats = PageStats::from_items(&items);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.sources, 2);
        assert_eq!(stats.translated, 1);
    }

    #[test]
    fn test_page_stats_empty() {
        let stats = PageStats::from_items(&[]);
        assert_eq!(stats, PageStats { total: 0, sources: 0, translated: 0 });
    }
}
