//! Video platform keyword search.
//!
//! The search results page embeds its data as a JavaScript assignment
//! (`ytInitialData = {...};</script>`). The blob is pulled out with a regex
//! and deserialized into the small slice of its nested shape we care about:
//!
//! ```text
//! contents.twoColumnSearchResultsRenderer.primaryContents
//!     .sectionListRenderer.contents[].itemSectionRenderer.contents[].videoRenderer
//! ```
//!
//! The shape is third-party and unversioned. Any mismatch surfaces as a
//! parse failure, never a panic.

use crate::models::{Item, Language, MAX_ITEMS_PER_SOURCE};
use crate::scrapers::{FetchError, get_text};
use crate::utils::{is_foreign_text, is_stale, time_ago, video_thumbnail};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

/// Freshness ceiling applied when the registry row does not set one.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 90;

const SEARCH_URL: &str = "https://www.youtube.com/results";

static INITIAL_DATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)ytInitialData\s*=\s*(\{.*?\});</script>").unwrap());
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitialData {
    contents: SearchContents,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchContents {
    two_column_search_results_renderer: TwoColumnResults,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TwoColumnResults {
    primary_contents: PrimaryContents,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryContents {
    section_list_renderer: SectionList,
}

#[derive(Debug, Deserialize)]
struct SectionList {
    contents: Vec<Section>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Section {
    #[serde(default)]
    item_section_renderer: Option<ItemSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemSection {
    #[serde(default)]
    contents: Vec<SectionEntry>,
}

/// Renderers stay raw here so one malformed result is skipped on its own.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionEntry {
    #[serde(default)]
    video_renderer: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoRenderer {
    #[serde(default)]
    video_id: String,
    #[serde(default)]
    title: Runs,
    #[serde(default)]
    owner_text: Runs,
    #[serde(default)]
    published_time_text: SimpleText,
    #[serde(default)]
    thumbnail: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Runs {
    #[serde(default)]
    runs: Vec<Run>,
}

impl Runs {
    fn first_text(&self) -> &str {
        self.runs.first().map(|r| r.text.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Default, Deserialize)]
struct Run {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimpleText {
    #[serde(default)]
    simple_text: String,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    url: String,
}

/// Search URL for `query`, sorted by upload date.
pub fn search_url(query: &str) -> String {
    format!("{}?search_query={}&sp=CAI%3D", SEARCH_URL, urlencoding::encode(query))
}

/// Run one keyword search and normalize the results.
#[instrument(level = "info", skip(client, now))]
pub async fn fetch(
    client: &Client,
    source_key: &str,
    query: &str,
    max_age_days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Item>, FetchError> {
    let page = get_text(client, &search_url(query)).await?;
    let items = parse_results(&page, source_key, max_age_days, now)?;
    info!(count = items.len(), "Parsed search results");
    Ok(items)
}

/// Extract up to [`MAX_ITEMS_PER_SOURCE`] results from a search results page.
pub fn parse_results(
    page: &str,
    source_key: &str,
    max_age_days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Item>, FetchError> {
    let blob = INITIAL_DATA
        .captures(page)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| FetchError::Shape("search data blob not found".to_string()))?;
    let data: InitialData = serde_json::from_str(blob.as_str())?;

    let items = data
        .contents
        .two_column_search_results_renderer
        .primary_contents
        .section_list_renderer
        .contents
        .into_iter()
        .filter_map(|section| section.item_section_renderer)
        .flat_map(|section| section.contents)
        .filter_map(|entry| entry.video_renderer)
        .filter_map(|raw| serde_json::from_value::<VideoRenderer>(raw).ok())
        .filter_map(|video| video_to_item(video, source_key, max_age_days, now))
        .take(MAX_ITEMS_PER_SOURCE)
        .collect();
    Ok(items)
}

fn video_to_item(
    video: VideoRenderer,
    source_key: &str,
    max_age_days: i64,
    now: DateTime<Utc>,
) -> Option<Item> {
    let title = video.title.first_text().trim();
    if title.is_empty() || video.video_id.is_empty() {
        return None;
    }
    let published_text = video.published_time_text.simple_text.as_str();
    let published_at = parse_relative_time(published_text, now);
    if published_at.is_some_and(|published| is_stale(published, max_age_days, now)) {
        return None;
    }

    let channel = video.owner_text.first_text();
    let mut item = Item::new(
        source_key,
        title,
        format!("https://www.youtube.com/watch?v={}", video.video_id),
    );
    if !channel.is_empty() {
        item.summary = format!("📺 {}", channel);
    }
    item.published_at = published_at;
    item.recency_label = match published_at {
        Some(_) => time_ago(published_at, now),
        None => published_text.to_string(),
    };
    item.thumbnail_url = video
        .thumbnail
        .thumbnails
        .last()
        .map(|t| t.url.clone())
        .filter(|url| !url.is_empty())
        .or_else(|| Some(video_thumbnail(&video.video_id)));
    item.language = if is_foreign_text(&item.title) {
        Language::Foreign
    } else {
        Language::Native
    };
    Some(item)
}

/// Turn "3 hours ago" / "3時間前" style text into an absolute time.
///
/// Months count as 30 days and years as 365 days.
pub fn parse_relative_time(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let count: i64 = NUMBER.captures(text)?.get(1)?.as_str().parse().ok()?;
    let ago = if text.contains("時間") || text.contains("hour") {
        Duration::try_hours(count)
    } else if text.contains('日') || text.contains("day") {
        Duration::try_days(count)
    } else if text.contains('週') || text.contains("week") {
        Duration::try_weeks(count)
    } else if text.contains("か月") || text.contains("ヶ月") || text.contains("month") {
        Duration::try_days(count.checked_mul(30)?)
    } else if text.contains('年') || text.contains("year") {
        Duration::try_days(count.checked_mul(365)?)
    } else {
        None
    }?;
    now.checked_sub_signed(ago)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn video(id: &str, title: &str, published: &str) -> serde_json::Value {
        json!({
            "videoRenderer": {
                "videoId": id,
                "title": { "runs": [{ "text": title }] },
                "ownerText": { "runs": [{ "text": "Channel" }] },
                "publishedTimeText": { "simpleText": published },
                "thumbnail": { "thumbnails": [
                    { "url": format!("https://i.ytimg.com/vi/{id}/small.jpg") },
                    { "url": format!("https://i.ytimg.com/vi/{id}/large.jpg") }
                ]}
            }
        })
    }

    fn page(videos: Vec<serde_json::Value>) -> String {
        let data = json!({
            "contents": { "twoColumnSearchResultsRenderer": { "primaryContents": {
                "sectionListRenderer": { "contents": [
                    { "continuationItemRenderer": {} },
                    { "itemSectionRenderer": { "contents": videos } }
                ]}
            }}}
        });
        format!("<html><script>var ytInitialData = {};</script></html>", data)
    }

    #[test]
    fn test_search_url_encodes_query() {
        assert_eq!(
            search_url("落合陽一"),
            "https://www.youtube.com/results?search_query=%E8%90%BD%E5%90%88%E9%99%BD%E4%B8%80&sp=CAI%3D"
        );
    }

    #[test]
    fn test_parse_results() {
        let html = page(vec![
            video("a1", "最新の講演", "3時間前"),
            json!({ "shelfRenderer": {} }),
            video("b2", "English talk", "2 weeks ago"),
        ]);
        let items = parse_results(&html, "ochiai_yt", 90, now()).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "最新の講演");
        assert_eq!(items[0].link, "https://www.youtube.com/watch?v=a1");
        assert_eq!(items[0].summary, "📺 Channel");
        assert_eq!(items[0].recency_label, "3時間前");
        assert_eq!(items[0].thumbnail_url.as_deref(), Some("https://i.ytimg.com/vi/a1/large.jpg"));
        assert_eq!(items[0].language, Language::Native);
        assert_eq!(items[1].published_at, Some(now() - Duration::weeks(2)));
        assert_eq!(items[1].language, Language::Foreign);
    }

    #[test]
    fn test_skips_missing_title_or_id_and_stale() {
        let html = page(vec![
            video("", "No id", "1 day ago"),
            video("c3", "", "1 day ago"),
            video("d4", "Old upload", "1 year ago"),
            video("e5", "Kept", "4 months ago"),
        ]);
        let items = parse_results(&html, "ochiai_yt", 90, now()).unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        // 4 months is 120 days, past the 90-day ceiling.
        assert!(titles.is_empty());

        let items = parse_results(&html, "ochiai_yt", 400, now()).unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Old upload", "Kept"]);
    }

    #[test]
    fn test_malformed_renderer_skips_only_that_result() {
        let broken = json!({
            "videoRenderer": {
                "videoId": null,
                "title": { "runs": [{ "text": "Broken entry" }] }
            }
        });
        let wrong_type = json!({ "videoRenderer": { "videoId": "c3", "title": "not runs" } });
        let html = page(vec![broken, video("ok1", "Good entry title", "1 day ago"), wrong_type]);

        let items = parse_results(&html, "ochiai_yt", 90, now()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Good entry title");
    }

    #[test]
    fn test_caps_results() {
        let videos = (0..8).map(|i| video(&format!("v{i}"), &format!("Video {i}"), "1 day ago")).collect();
        let items = parse_results(&page(videos), "ochiai_yt", 90, now()).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[4].title, "Video 4");
    }

    #[test]
    fn test_unparsed_time_keeps_raw_label_and_derives_thumbnail() {
        let mut raw = video("f6", "ライブ配信", "配信済み");
        raw["videoRenderer"]["thumbnail"] = json!({ "thumbnails": [] });
        let items = parse_results(&page(vec![raw]), "ochiai_yt", 90, now()).unwrap();
        assert_eq!(items[0].published_at, None);
        assert_eq!(items[0].recency_label, "配信済み");
        assert_eq!(items[0].thumbnail_url.as_deref(), Some("https://i.ytimg.com/vi/f6/mqdefault.jpg"));
    }

    #[test]
    fn test_missing_blob_is_parse_error() {
        let err = parse_results("<html>nothing</html>", "ochiai_yt", 90, now()).unwrap_err();
        assert!(matches!(err, FetchError::Shape(_)));
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_shape_mismatch_is_parse_error() {
        let html = r#"<script>var ytInitialData = {"contents": {"somethingElse": {}}};</script>"#;
        let err = parse_results(html, "ochiai_yt", 90, now()).unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_parse_relative_time() {
        let now = now();
        assert_eq!(parse_relative_time("5 hours ago", now), Some(now - Duration::hours(5)));
        assert_eq!(parse_relative_time("3日前", now), Some(now - Duration::days(3)));
        assert_eq!(parse_relative_time("2週間前", now), Some(now - Duration::weeks(2)));
        assert_eq!(parse_relative_time("2 months ago", now), Some(now - Duration::days(60)));
        assert_eq!(parse_relative_time("1か月前", now), Some(now - Duration::days(30)));
        assert_eq!(parse_relative_time("1年前", now), Some(now - Duration::days(365)));
        assert_eq!(parse_relative_time("", now), None);
        assert_eq!(parse_relative_time("Streamed", now), None);
        assert_eq!(parse_relative_time("10 minutes ago", now), None);
    }
}
