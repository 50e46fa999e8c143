//! Heuristic page scrapers for sites without a usable feed.
//!
//! All sites share one shape: collect anchor candidates, take the visible
//! text as the title, reject boilerplate, de-duplicate by lowercased title,
//! resolve the link against the page URL, then look a few ancestors up for a
//! nearby image. Collection stops at [`MAX_ITEMS_PER_SOURCE`].
//!
//! The heuristics are tied to each site's current markup. A redesign makes
//! a site quietly yield nothing rather than fail.

use crate::models::{Item, Language, MAX_ITEMS_PER_SOURCE};
use crate::scrapers::{FetchError, get_text};
use crate::sources::Site;
use crate::utils::is_foreign_text;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, instrument};
use url::Url;

/// Titles shorter than this are navigation noise.
const MIN_TITLE_CHARS: usize = 10;

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1, h2, h3").unwrap());
static IMG_WITH_SRC: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());
static SPLIT_CAPITAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z])\s+([a-z])").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static EVERY_POST_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/[a-z-]+/[a-z0-9-]+").unwrap());
static NEW_YORKER_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(magazine|culture|tech|news|science)/").unwrap());

/// Which anchors are considered.
#[derive(Debug, Clone, Copy)]
pub enum Candidates {
    /// Every anchor on the page.
    AllAnchors,
    /// Anchors whose href matches the pattern.
    HrefPattern(&'static Lazy<Regex>),
    /// The first anchor inside each h1-h3, then anchors whose path looks
    /// like `/section/slug` and is longer than 15 characters.
    HeadingsThenPosts,
}

/// How the anchor's text becomes a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleText {
    /// Each text node trimmed, then concatenated.
    Stripped,
    /// Text concatenated raw, split capitalised words re-glued, whitespace collapsed.
    Collapsed,
}

/// Per-site scraping parameters.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeProfile {
    pub candidates: Candidates,
    pub title_text: TitleText,
    pub max_title_chars: usize,
    pub stop_words: &'static [&'static str],
    /// Number of ancestors searched for a thumbnail.
    pub image_depth: usize,
    pub recency_label: &'static str,
}

pub static EVERY: ScrapeProfile = ScrapeProfile {
    candidates: Candidates::HeadingsThenPosts,
    title_text: TitleText::Collapsed,
    max_title_chars: 200,
    stop_words: &[
        "subscribe", "sign up", "log in", "newsletter", "cookie", "introducing every",
        "pricing", "about", "advertise", "view all", "read more", "careers", "contact",
    ],
    image_depth: 5,
    recency_label: "最近",
};

pub static DARIO_AMODEI: ScrapeProfile = ScrapeProfile {
    candidates: Candidates::AllAnchors,
    title_text: TitleText::Stripped,
    max_title_chars: 300,
    stop_words: &[
        "home", "about", "contact", "subscribe", "menu", "navigation", "dario amodei",
        "privacy", "terms",
    ],
    image_depth: 4,
    recency_label: "",
};

pub static NEW_YORKER: ScrapeProfile = ScrapeProfile {
    candidates: Candidates::HrefPattern(&NEW_YORKER_ARTICLE),
    title_text: TitleText::Stripped,
    max_title_chars: 300,
    stop_words: &[
        "subscribe", "sign in", "newsletter", "new yorker", "podcast", "cartoon",
        "crossword", "goings on",
    ],
    image_depth: 5,
    recency_label: "",
};

const MOLTBOOK_TITLE: &str = "Moltbook — AIエージェントのソーシャルネットワーク（ベータ版）";
const MOLTBOOK_SUMMARY: &str =
    "AIエージェント同士が交流する新しいプラットフォーム。ベータ版のため投稿はまだ少なめです。";

/// Fetch one page and scrape it with the site's profile.
#[instrument(level = "info", skip(client))]
pub async fn fetch(
    client: &Client,
    source_key: &str,
    url: &str,
    site: Site,
) -> Result<Vec<Item>, FetchError> {
    let base = Url::parse(url).map_err(|e| FetchError::Shape(format!("bad page url {url}: {e}")))?;
    let html = get_text(client, url).await?;

    let profile = match site {
        Site::Every => &EVERY,
        Site::DarioAmodei => &DARIO_AMODEI,
        Site::NewYorker => &NEW_YORKER,
        Site::Moltbook => return Ok(vec![landing_card(source_key, url)]),
    };
    let items = extract_items(&html, source_key, &base, profile);
    info!(count = items.len(), "Scraped page");
    Ok(items)
}

/// The fixed card shown for a community landing page once it is reachable.
pub fn landing_card(source_key: &str, url: &str) -> Item {
    let mut item = Item::new(source_key, MOLTBOOK_TITLE, url);
    item.summary = MOLTBOOK_SUMMARY.to_string();
    item
}

/// Apply a profile to a page's markup.
pub fn extract_items(html: &str, source_key: &str, base: &Url, profile: &ScrapeProfile) -> Vec<Item> {
    let document = Html::parse_document(html);
    let mut seen_titles = HashSet::new();
    let mut items = Vec::new();

    for anchor in candidates(&document, profile.candidates) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if href.is_empty() || href.starts_with('#') {
            continue;
        }

        let title = anchor_title(anchor, profile.title_text);
        let length = title.chars().count();
        if length < MIN_TITLE_CHARS || length > profile.max_title_chars {
            continue;
        }
        let lowered = title.to_lowercase();
        if profile.stop_words.iter().any(|word| lowered.contains(word)) {
            continue;
        }
        if !seen_titles.insert(lowered) {
            debug!(%title, "Skipping duplicate title");
            continue;
        }
        let Ok(link) = base.join(href) else {
            continue;
        };

        let mut item = Item::new(source_key, title, link.to_string());
        item.recency_label = profile.recency_label.to_string();
        item.thumbnail_url = nearby_image(anchor, profile.image_depth, base);
        item.language = if is_foreign_text(&item.title) {
            Language::Foreign
        } else {
            Language::Native
        };
        items.push(item);
        if items.len() >= MAX_ITEMS_PER_SOURCE {
            break;
        }
    }
    items
}

fn candidates<'a>(document: &'a Html, rule: Candidates) -> Vec<ElementRef<'a>> {
    match rule {
        Candidates::AllAnchors => document.select(&ANCHOR).collect(),
        Candidates::HrefPattern(pattern) => document
            .select(&ANCHOR)
            .filter(|a| a.value().attr("href").is_some_and(|href| pattern.is_match(href)))
            .collect(),
        Candidates::HeadingsThenPosts => {
            let headed = document
                .select(&HEADING)
                .filter_map(|heading| heading.select(&ANCHOR).next());
            let posts = document.select(&ANCHOR).filter(|a| {
                a.value()
                    .attr("href")
                    .is_some_and(|href| href.len() > 15 && EVERY_POST_PATH.is_match(href))
            });
            headed.chain(posts).collect()
        }
    }
}

fn anchor_title(anchor: ElementRef<'_>, style: TitleText) -> String {
    match style {
        TitleText::Stripped => anchor.text().map(str::trim).collect::<String>(),
        TitleText::Collapsed => {
            let raw = anchor.text().collect::<String>();
            let glued = SPLIT_CAPITAL.replace_all(raw.trim(), "$1$2");
            WHITESPACE.replace_all(&glued, " ").trim().to_string()
        }
    }
}

/// First non-inline image under the closest of `depth` ancestors.
fn nearby_image(anchor: ElementRef<'_>, depth: usize, base: &Url) -> Option<String> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(depth)
        .find_map(|ancestor| {
            let src = ancestor.select(&IMG_WITH_SRC).next()?.value().attr("src")?;
            if src.starts_with("data:") {
                return None;
            }
            base.join(src).ok().map(|u| u.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn test_duplicate_titles_are_dropped() {
        let html = r#"<html><body>
            <div><a href="/a">The Future Of Thinking Machines</a></div>
            <div><a href="/b">the future of thinking machines</a></div>
            <div><a href="/c">A different essay entirely</a></div>
        </body></html>"#;
        let items = extract_items(html, "amodei", &base("https://darioamodei.com"), &DARIO_AMODEI);
        let links: Vec<_> = items.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(links, vec!["https://darioamodei.com/a", "https://darioamodei.com/c"]);
    }

    #[test]
    fn test_length_and_stop_word_filters() {
        let html = r#"<html><body>
            <a href="/short">Short</a>
            <a href="/about">About Dario Amodei and his work</a>
            <a href="/privacy">Privacy policy for this website</a>
            <a href="/long">{}</a>
            <a href="/ok">Machines of Loving Grace</a>
        </body></html>"#
            .replace("{}", &"x".repeat(301));
        let items = extract_items(&html, "amodei", &base("https://darioamodei.com"), &DARIO_AMODEI);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Machines of Loving Grace");
        assert_eq!(items[0].language, Language::Foreign);
    }

    #[test]
    fn test_fragment_links_are_skipped_and_absolute_links_kept() {
        let html = r##"<html><body>
            <a href="#top">Jump back to the top of page</a>
            <a href="https://other.example.com/essay">An essay hosted elsewhere</a>
        </body></html>"##;
        let items = extract_items(html, "amodei", &base("https://darioamodei.com"), &DARIO_AMODEI);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link, "https://other.example.com/essay");
    }

    #[test]
    fn test_nearby_image_skips_inline_data_and_resolves() {
        let html = r#"<html><body>
            <section><img src="data:image/png;base64,AAAA">
              <a href="/other">Another essay with inline image</a>
            </section>
            <article><img src="/img/cover.png">
              <div><p><a href="/essay">The Urgency of Interpretability</a></p></div>
            </article>
        </body></html>"#;
        let items = extract_items(html, "amodei", &base("https://darioamodei.com"), &DARIO_AMODEI);
        assert_eq!(items[0].thumbnail_url, None);
        assert_eq!(items[1].thumbnail_url.as_deref(), Some("https://darioamodei.com/img/cover.png"));
    }

    #[test]
    fn test_image_search_depth_is_bounded() {
        let html = r#"<html><body><div><img src="/far.png">
            <div><div><div><div><div><a href="/deep">A deeply nested article link</a></div></div></div></div></div>
        </div></body></html>"#;
        let items = extract_items(html, "amodei", &base("https://darioamodei.com"), &DARIO_AMODEI);
        assert_eq!(items[0].thumbnail_url, None);
    }

    #[test]
    fn test_every_headings_and_post_paths() {
        let html = r#"<html><body>
            <nav><a href="/pricing">Pricing and plans for teams</a></nav>
            <h2><a href="/chain-of-thought/why-agents-matter">Why   Agents
                Matter Now</a></h2>
            <div><a href="/napkin-math/the-cost-of-compute">The cost of compute in 2026</a></div>
            <div><a href="/p/x">Too short a path here</a></div>
            <div><a href="/chain-of-thought/why-agents-matter">Why Agents Matter Now</a></div>
        </body></html>"#;
        let items = extract_items(html, "every", &base("https://every.to"), &EVERY);
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Why Agents Matter Now", "The cost of compute in 2026"]);
        assert_eq!(items[0].link, "https://every.to/chain-of-thought/why-agents-matter");
        assert_eq!(items[0].recency_label, "最近");
    }

    #[test]
    fn test_collapsed_title_reglues_split_words() {
        let html = r#"<html><body><h3><a href="/x/some-long-slug-here">A<span> </span>nthropic releases a new model</a></h3></body></html>"#;
        let items = extract_items(html, "every", &base("https://every.to"), &EVERY);
        assert_eq!(items[0].title, "Anthropic releases a new model");
    }

    #[test]
    fn test_new_yorker_path_filter() {
        let html = r#"<html><body>
            <a href="/contributors/ted-chiang">Ted Chiang contributor page</a>
            <a href="/magazine/2024/why-ai-isnt-going-to-make-art">Why A.I. Isn’t Going to Make Art</a>
            <a href="/culture/cultural-comment/chatgpt-is-a-blurry-jpeg">ChatGPT Is a Blurry JPEG of the Web</a>
            <a href="/magazine/crossword">Play the crossword puzzle today</a>
        </body></html>"#;
        let items = extract_items(html, "tedchiang", &base("https://www.newyorker.com/contributors/ted-chiang"), &NEW_YORKER);
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Why A.I. Isn’t Going to Make Art", "ChatGPT Is a Blurry JPEG of the Web"]);
        assert_eq!(items[0].link, "https://www.newyorker.com/magazine/2024/why-ai-isnt-going-to-make-art");
    }

    #[test]
    fn test_stops_at_cap() {
        let anchors: String = (0..9)
            .map(|i| format!(r#"<a href="/e/{i}">Essay number {i} on scaling</a>"#))
            .collect();
        let html = format!("<html><body>{anchors}</body></html>");
        let items = extract_items(&html, "amodei", &base("https://darioamodei.com"), &DARIO_AMODEI);
        assert_eq!(items.len(), MAX_ITEMS_PER_SOURCE);
        assert_eq!(items[4].title, "Essay number 4 on scaling");
    }

    #[test]
    fn test_redesigned_page_yields_nothing() {
        let html = "<html><body><p>Nothing to see</p></body></html>";
        assert!(extract_items(html, "tedchiang", &base("https://www.newyorker.com"), &NEW_YORKER).is_empty());
    }

    #[test]
    fn test_landing_card() {
        let item = landing_card("moltbook", "https://www.moltbook.com");
        assert_eq!(item.link, "https://www.moltbook.com");
        assert_eq!(item.language, Language::Native);
        assert!(!item.summary.is_empty());
    }
}
