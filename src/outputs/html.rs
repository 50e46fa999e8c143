//! Static page rendering.
//!
//! The page is one self-contained document: inline style rules, a greeting
//! header, the seasonal card, aggregate stats, filter buttons, one card per
//! item and a small script that toggles cards by filter bucket.
//!
//! # Filter Buckets
//!
//! Registry rows sharing a display name share a bucket. Each button carries
//! the comma-separated member keys in `data-members`; the script shows a card
//! when its `data-source` is one of the active button's members.

use crate::models::{Item, PageStats};
use crate::season::{SeasonalEntry, jst};
use crate::sources::{SOURCES, lookup, theme_for};
use crate::utils::ensure_parent_dir;
use chrono::{DateTime, Datelike, Timelike, Utc};
use html_escape::{encode_double_quoted_attribute, encode_safe};
use itertools::Itertools;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const PAGE_TITLE: &str = "けさの手帖";
const WEEKDAYS: [&str; 7] = ["月", "火", "水", "木", "金", "土", "日"];

const STYLE: &str = r#"
@import url('https://fonts.googleapis.com/css2?family=Noto+Serif+JP:wght@300;400;500;600;700&family=Zen+Maru+Gothic:wght@400;500;700&display=swap');

* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: "Zen Maru Gothic", "Noto Serif JP", "Hiragino Kaku Gothic ProN", sans-serif;
    background: #FFFFFF;
    color: #3A3A3A;
    line-height: 1.8;
    letter-spacing: 0.03em;
}

.container { max-width: 640px; margin: 0 auto; padding: 52px 28px 80px; }

.header { margin-bottom: 32px; }
.greeting {
    font-size: 26px;
    font-weight: 700;
    color: #2A2A2A;
    line-height: 1.4;
    margin-bottom: 6px;
    font-family: "Noto Serif JP", serif;
}
.header .date { font-size: 13px; color: #999; letter-spacing: 0.08em; }

.season-card {
    background: linear-gradient(135deg, #fafaf5 0%, #f5f0e8 100%);
    border-radius: 14px;
    padding: 20px 24px;
    margin-bottom: 32px;
    border: 1px solid #ece6d8;
}
.season-sekki { font-size: 11px; color: #A08060; letter-spacing: 0.1em; margin-bottom: 4px; }
.season-kou {
    font-size: 18px;
    font-weight: 600;
    color: #5A4A3A;
    font-family: "Noto Serif JP", serif;
    margin-bottom: 2px;
}
.season-reading { font-size: 12px; color: #B0A090; margin-bottom: 8px; }
.season-desc { font-size: 13px; line-height: 1.7; color: #7A6A5A; }

.stats { display: flex; gap: 20px; margin-bottom: 20px; font-size: 12px; color: #AAA; }

.filters { display: flex; gap: 8px; margin-bottom: 36px; flex-wrap: wrap; }
.filter-btn {
    padding: 5px 14px;
    border: none;
    border-radius: 20px;
    background: #F5F5F5;
    color: #777;
    font-family: inherit;
    font-size: 12px;
    letter-spacing: 0.04em;
    cursor: pointer;
    transition: all 0.2s;
}
.filter-btn.active { background: #3A3A3A !important; color: #FFF !important; }
.filter-btn:hover:not(.active) { opacity: 0.8; }
.filter-count { opacity: 0.6; font-size: 10px; }

.feed { display: flex; flex-direction: column; }
.card {
    display: flex;
    text-decoration: none;
    color: inherit;
    padding: 18px 20px;
    margin-bottom: 12px;
    border-radius: 12px;
    transition: transform 0.12s, box-shadow 0.12s;
    gap: 16px;
    align-items: flex-start;
}
.card:hover { transform: translateY(-2px); box-shadow: 0 4px 16px rgba(0,0,0,0.06); }
.card-image {
    flex-shrink: 0;
    width: 100px;
    height: 72px;
    border-radius: 8px;
    overflow: hidden;
    background: rgba(0,0,0,0.04);
}
.card-image img { width: 100%; height: 100%; object-fit: cover; display: block; }
.card-content { flex: 1; min-width: 0; }
.card-header {
    display: flex;
    justify-content: space-between;
    align-items: baseline;
    margin-bottom: 4px;
    gap: 12px;
}
.source-badge {
    font-size: 10px;
    font-weight: 600;
    letter-spacing: 0.06em;
    padding: 2px 10px;
    border-radius: 12px;
    display: inline-block;
    white-space: nowrap;
}
.meta { font-size: 11px; color: #BBB; white-space: nowrap; }
.card-title {
    font-size: 15px;
    font-weight: 500;
    line-height: 1.6;
    margin-bottom: 4px;
    color: #2A2A2A;
    font-family: "Noto Serif JP", serif;
}
.card-summary { font-size: 13px; line-height: 1.7; color: #888; margin-bottom: 6px; }
.original-text { font-size: 11px; color: #BBB; margin-bottom: 4px; line-height: 1.4; }
.card-footer { display: flex; align-items: center; gap: 10px; }
.lang-badge {
    display: inline-block;
    padding: 1px 7px;
    border-radius: 10px;
    font-size: 10px;
    color: #4A7FA5;
    background: #EDF4F8;
    letter-spacing: 0.04em;
}
.read-more { font-size: 12px; color: #BBB; margin-left: auto; }

.footer { margin-top: 56px; padding-top: 24px; text-align: center; font-size: 11px; color: #CCC; }
.footer-dots { letter-spacing: 0.4em; margin-bottom: 12px; color: #DDD; }

@media (max-width: 600px) {
    .container { padding: 36px 18px 60px; }
    .greeting { font-size: 22px; }
    .card { padding: 14px 16px; margin-bottom: 10px; flex-direction: column; gap: 10px; }
    .card-image { width: 100%; height: 160px; }
    .season-card { padding: 16px 18px; }
    .season-kou { font-size: 16px; }
}
"#;

const SCRIPT: &str = r#"
document.getElementById('filters').addEventListener('click', e => {
    const btn = e.target.closest('.filter-btn');
    if (!btn) return;
    document.querySelectorAll('.filter-btn').forEach(b => b.classList.remove('active'));
    btn.classList.add('active');
    const filter = btn.dataset.filter;
    const members = (btn.dataset.members || filter).split(',');
    document.querySelectorAll('.card').forEach(card => {
        const visible = filter === 'all' || members.includes(card.dataset.source);
        card.style.display = visible ? '' : 'none';
    });
});
"#;

/// One filter button: a display name and the registry keys it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBucket {
    pub name: &'static str,
    /// Registry keys sharing `name`, in registry order.
    pub members: Vec<&'static str>,
    /// Items in this run belonging to any member.
    pub count: usize,
}

/// Sort newest first; undated items go last and keep their relative order.
pub fn sort_by_recency(items: &mut [Item]) {
    // `None < Some(_)`, so descending order puts undated items at the end.
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

/// Buckets with at least one item, in registry order.
pub fn filter_buckets(items: &[Item]) -> Vec<FilterBucket> {
    SOURCES
        .iter()
        .unique_by(|source| source.name)
        .map(|first| {
            let members: Vec<&'static str> = SOURCES
                .iter()
                .filter(|source| source.name == first.name)
                .map(|source| source.key)
                .collect();
            let count = items
                .iter()
                .filter(|item| members.contains(&item.source_key.as_str()))
                .count();
            FilterBucket { name: first.name, members, count }
        })
        .filter(|bucket| bucket.count > 0)
        .collect()
}

/// Greeting prefix for the given hour of the reader's day.
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=10 => "おはよう",
        11..=16 => "こんにちは",
        _ => "こんばんは",
    }
}

/// Render the complete document. `items` is sorted before rendering.
#[instrument(level = "info", skip_all, fields(items = items.len()))]
pub fn render_page(
    mut items: Vec<Item>,
    season: &SeasonalEntry,
    now: DateTime<Utc>,
    reader_name: &str,
) -> String {
    sort_by_recency(&mut items);
    let page = Page {
        stats: PageStats::from_items(&items),
        buckets: filter_buckets(&items),
        items: &items,
        season,
        now,
        reader_name,
    };
    let html = page.to_string();
    info!(bytes = html.len(), "Rendered page");
    html
}

/// Write the rendered document, creating parent directories as needed.
#[instrument(level = "info", skip(html))]
pub async fn write_page(path: &Path, html: &str) -> Result<(), Box<dyn Error>> {
    ensure_parent_dir(path).await?;
    fs::write(path, html).await?;
    info!(bytes = html.len(), "Wrote page");
    Ok(())
}

struct Page<'a> {
    items: &'a [Item],
    stats: PageStats,
    buckets: Vec<FilterBucket>,
    season: &'a SeasonalEntry,
    now: DateTime<Utc>,
    reader_name: &'a str,
}

impl Display for Page<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let local = self.now.with_timezone(&jst());
        let date = local.format("%Y年%-m月%-d日").to_string();
        let weekday = WEEKDAYS[local.weekday().num_days_from_monday() as usize];

        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, r#"<html lang="ja">"#)?;
        writeln!(f, "<head>")?;
        writeln!(f, r#"<meta charset="UTF-8">"#)?;
        writeln!(f, r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#)?;
        writeln!(f, "<title>{} — {}</title>", PAGE_TITLE, date)?;
        writeln!(f, "<style>{}</style>", STYLE)?;
        writeln!(f, "</head>")?;
        writeln!(f, "<body>")?;
        writeln!(f, r#"<div class="container">"#)?;

        writeln!(f, r#"<div class="header">"#)?;
        writeln!(
            f,
            r#"<div class="greeting">{}、{}👋🏻</div>"#,
            greeting(local.hour()),
            encode_safe(self.reader_name)
        )?;
        writeln!(
            f,
            r#"<div class="date">{}（{}）　{} 取得</div>"#,
            date,
            weekday,
            local.format("%-H:%M")
        )?;
        writeln!(f, "</div>")?;

        write_season(f, self.season)?;

        writeln!(f, r#"<div class="stats">"#)?;
        writeln!(f, "<span>{}件</span>", self.stats.total)?;
        writeln!(f, "<span>{}つの情報源</span>", self.stats.sources)?;
        if self.stats.translated > 0 {
            writeln!(f, "<span>{}件を翻訳</span>", self.stats.translated)?;
        }
        writeln!(f, "</div>")?;

        writeln!(f, r#"<div class="filters" id="filters">"#)?;
        writeln!(f, r#"<button class="filter-btn active" data-filter="all">ぜんぶ</button>"#)?;
        for bucket in &self.buckets {
            write_filter_button(f, bucket)?;
        }
        writeln!(f, "</div>")?;

        writeln!(f, r#"<div class="feed" id="feed">"#)?;
        for item in self.items {
            write_card(f, item)?;
        }
        writeln!(f, "</div>")?;

        writeln!(f, r#"<div class="footer">"#)?;
        writeln!(f, r#"<div class="footer-dots">· · ·</div>"#)?;
        writeln!(f, "<p>{} — 静かにあつめています</p>", PAGE_TITLE)?;
        writeln!(f, "</div>")?;

        writeln!(f, "</div>")?;
        writeln!(f, "<script>{}</script>", SCRIPT)?;
        writeln!(f, "</body>")?;
        write!(f, "</html>")
    }
}

fn write_season(f: &mut Formatter<'_>, season: &SeasonalEntry) -> fmt::Result {
    writeln!(f, r#"<div class="season-card">"#)?;
    writeln!(f, r#"<div class="season-sekki">{}</div>"#, encode_safe(season.sekki))?;
    writeln!(f, r#"<div class="season-kou">{}</div>"#, encode_safe(season.name))?;
    writeln!(f, r#"<div class="season-reading">{}</div>"#, encode_safe(season.reading))?;
    writeln!(f, r#"<div class="season-desc">{}</div>"#, encode_safe(season.description))?;
    writeln!(f, "</div>")
}

fn write_filter_button(f: &mut Formatter<'_>, bucket: &FilterBucket) -> fmt::Result {
    let key = bucket.members.first().copied().unwrap_or_default();
    let theme = theme_for(key);
    writeln!(
        f,
        r#"<button class="filter-btn" data-filter="{}" data-members="{}" style="background: {}; color: {}">{} <span class="filter-count">{}</span></button>"#,
        encode_double_quoted_attribute(key),
        encode_double_quoted_attribute(&bucket.members.join(",")),
        theme.badge,
        theme.text,
        encode_safe(bucket.name),
        bucket.count
    )
}

fn write_card(f: &mut Formatter<'_>, item: &Item) -> fmt::Result {
    let theme = theme_for(&item.source_key);
    let (badge, platform) = lookup(&item.source_key)
        .map(|source| (format!("{} {}", source.emoji, source.name), source.platform))
        .unwrap_or_default();

    writeln!(
        f,
        r#"<a href="{}" target="_blank" rel="noopener" class="card" data-source="{}" style="background: {}">"#,
        encode_double_quoted_attribute(&item.link),
        encode_double_quoted_attribute(&item.source_key),
        theme.background
    )?;
    if let Some(src) = &item.thumbnail_url {
        writeln!(
            f,
            r#"<div class="card-image"><img src="{}" alt="" loading="lazy" onerror="this.parentElement.style.display='none'"></div>"#,
            encode_double_quoted_attribute(src)
        )?;
    }
    writeln!(f, r#"<div class="card-content">"#)?;
    writeln!(f, r#"<div class="card-header">"#)?;
    writeln!(
        f,
        r#"<span class="source-badge" style="color: {}; background: {}">{}</span>"#,
        theme.text,
        theme.badge,
        encode_safe(&badge)
    )?;
    writeln!(
        f,
        r#"<span class="meta">{}　{}</span>"#,
        encode_safe(platform),
        encode_safe(&item.recency_label)
    )?;
    writeln!(f, "</div>")?;
    writeln!(f, r#"<h3 class="card-title">{}</h3>"#, encode_safe(item.display_title()))?;
    if item.translated_title.is_some() {
        if let Some(original) = &item.original_title {
            writeln!(f, r#"<p class="original-text">原文: {}</p>"#, encode_safe(original))?;
        }
    }
    let summary = item.display_summary();
    if !summary.is_empty() {
        writeln!(f, r#"<p class="card-summary">{}</p>"#, encode_safe(summary))?;
    }
    writeln!(f, r#"<div class="card-footer">"#)?;
    if item.is_foreign() {
        writeln!(f, r#"<span class="lang-badge">翻訳</span>"#)?;
    }
    writeln!(f, r#"<span class="read-more">つづきを読む →</span>"#)?;
    writeln!(f, "</div>")?;
    writeln!(f, "</div>")?;
    writeln!(f, "</a>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::season;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        // 2026-10-18 08:30 JST
        Utc.with_ymd_and_hms(2026, 10, 17, 23, 30, 0).unwrap()
    }

    fn dated(key: &str, title: &str, hours_ago: i64) -> Item {
        let mut item = Item::new(key, title, format!("https://example.com/{title}"));
        item.published_at = Some(now() - Duration::hours(hours_ago));
        item
    }

    fn render(items: Vec<Item>) -> String {
        render_page(items, season::current(now()), now(), "Matsuco")
    }

    #[test]
    fn test_sort_dated_desc_then_undated_in_fetch_order() {
        let mut items = vec![
            Item::new("every", "u1", "#"),
            dated("every", "d2", 5),
            Item::new("every", "u2", "#"),
            dated("every", "d1", 1),
            dated("every", "d3", 9),
        ];
        sort_by_recency(&mut items);
        let order: Vec<&str> = items.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(order, vec!["d1", "d2", "d3", "u1", "u2"]);
    }

    #[test]
    fn test_free_text_is_escaped() {
        let mut item = Item::new("technium", "<script>alert(1)</script>", "https://x.test/?a=1&b=\"2\"");
        item.summary = "Tom & Jerry".to_string();
        let html = render(vec![item]);

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)"));
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(html.contains("b=&quot;2&quot;"));
    }

    #[test]
    fn test_buckets_group_shared_display_names() {
        let items = vec![
            Item::new("ochiai_note", "ノート記事", "https://note.com/a"),
            Item::new("ochiai_yt", "動画", "https://youtube.com/watch?v=1"),
            Item::new("ochiai_yt", "動画2", "https://youtube.com/watch?v=2"),
            Item::new("technium", "Essay", "https://kk.org/a"),
        ];
        let buckets = filter_buckets(&items);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].members, vec!["ochiai_note", "ochiai_yt"]);
        assert_eq!(buckets[0].count, 3);
        assert_eq!(buckets[1].members, vec!["technium"]);
        assert_eq!(buckets[1].count, 1);

        let html = render(items);
        assert!(html.contains(r#"data-members="ochiai_note,ochiai_yt""#));
        assert!(!html.contains(r#"data-filter="hardfork""#));
    }

    #[test]
    fn test_original_line_only_when_translated() {
        let mut translated = Item::new("technium", "Hello world", "https://kk.org/a");
        translated.language = Language::Foreign;
        translated.original_title = Some("Hello world".to_string());
        translated.translated_title = Some("こんにちは世界".to_string());

        let mut no_op = Item::new("technium", "OpenAI GPT", "https://kk.org/b");
        no_op.language = Language::Foreign;
        no_op.original_title = Some("OpenAI GPT".to_string());

        let html = render(vec![translated]);
        assert!(html.contains("原文: Hello world"));
        assert!(html.contains("こんにちは世界"));
        assert!(html.contains(r#"<span class="lang-badge">翻訳</span>"#));
        assert!(html.contains("<span>1件を翻訳</span>"));

        let html = render(vec![no_op]);
        assert!(!html.contains("原文:"));
        assert!(html.contains(r#"<span class="lang-badge">翻訳</span>"#));
        assert!(!html.contains("件を翻訳"));
    }

    #[test]
    fn test_header_and_stats() {
        let items = vec![
            dated("every", "first", 1),
            dated("every", "second", 2),
            dated("wired_jp", "third", 3),
        ];
        let html = render(items);

        assert!(html.contains("おはよう、Matsuco"));
        assert!(html.contains("2026年10月18日（日）　8:30 取得"));
        assert!(html.contains("<span>3件</span>"));
        assert!(html.contains("<span>2つの情報源</span>"));
        assert!(html.contains(season::current(now()).name));
    }

    #[test]
    fn test_card_parts() {
        let mut item = dated("hardfork", "Episode title", 2);
        item.thumbnail_url = Some("https://img.test/a.jpg".to_string());
        item.recency_label = "2時間前".to_string();
        let html = render(vec![item]);

        assert!(html.contains(r#"data-source="hardfork""#));
        assert!(html.contains(r#"<img src="https://img.test/a.jpg""#));
        assert!(html.contains("onerror="));
        assert!(html.contains("2時間前"));
        assert!(html.contains("つづきを読む →"));
        assert!(!html.contains(r#"<p class="card-summary">"#));
    }

    #[test]
    fn test_unknown_source_uses_neutral_theme() {
        let html = render(vec![Item::new("retired", "Some leftover title", "#")]);
        assert!(html.contains("background: #F8F8F8"));
    }

    #[test]
    fn test_empty_page_still_renders() {
        let html = render(Vec::new());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</html>"));
        assert!(html.contains("<span>0件</span>"));
        assert!(html.contains("ぜんぶ"));
    }

    #[test]
    fn test_greeting_boundaries() {
        assert_eq!(greeting(0), "おはよう");
        assert_eq!(greeting(10), "おはよう");
        assert_eq!(greeting(11), "こんにちは");
        assert_eq!(greeting(16), "こんにちは");
        assert_eq!(greeting(17), "こんばんは");
        assert_eq!(greeting(23), "こんばんは");
    }

    #[tokio::test]
    async fn test_write_page_creates_parent() {
        let dir = std::env::temp_dir().join(format!("digest_{}", std::process::id()));
        let path = dir.join("nested").join("index.html");
        write_page(&path, "<html></html>").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
