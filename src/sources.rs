//! The static source registry.
//!
//! Every source the digest polls is one row here. A row names the access
//! method and its parameter, plus the display metadata the renderer needs.
//! Adding a source is adding a row; only a new *method* needs a new
//! [`AccessMethod`] variant and a dispatch arm in [`crate::scrapers`].
//!
//! | Key | Name | Method |
//! |-----|------|--------|
//! | `ochiai_note` | 落合陽一 | feed |
//! | `ochiai_yt` | 落合陽一 | keyword search |
//! | `karpathy_yt` | Andrej Karpathy | feed |
//! | `hardfork` | Hard Fork | feed |
//! | `every` | Every | scrape |
//! | `moltbook` | Moltbook | scrape (landing card) |
//! | `amodei` | Dario Amodei | scrape |
//! | `technium` | Kevin Kelly | feed |
//! | `tedchiang` | Ted Chiang | scrape |
//! | `wired_jp` | WIRED JAPAN | feed |

/// Sites with a dedicated scraping profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    Every,
    Moltbook,
    DarioAmodei,
    NewYorker,
}

/// How a source is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMethod {
    /// RSS/Atom feed pull.
    Feed { url: &'static str },
    /// Video platform keyword search.
    KeywordSearch { query: &'static str },
    /// Heuristic scrape of one page.
    Scrape { url: &'static str, site: Site },
}

/// Card and badge colors for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub text: &'static str,
    pub background: &'static str,
    pub badge: &'static str,
}

/// Used for items whose source key is not in the registry.
pub const NEUTRAL_THEME: Theme = Theme {
    text: "#888",
    background: "#F8F8F8",
    badge: "#EEE",
};

/// One registry row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source {
    pub key: &'static str,
    /// Display name; rows sharing a name share a filter bucket.
    pub name: &'static str,
    pub platform: &'static str,
    pub emoji: &'static str,
    pub method: AccessMethod,
    pub theme: Theme,
    /// Items older than this many days are dropped.
    pub max_age_days: Option<i64>,
}

const OCHIAI_THEME: Theme = Theme { text: "#8B5E3C", background: "#FFF5ED", badge: "#F5E0CE" };

/// All sources, in polling order.
pub static SOURCES: &[Source] = &[
    Source {
        key: "ochiai_note",
        name: "落合陽一",
        platform: "note",
        emoji: "🧠",
        method: AccessMethod::Feed { url: "https://note.com/ochyai/rss" },
        theme: OCHIAI_THEME,
        max_age_days: None,
    },
    Source {
        key: "ochiai_yt",
        name: "落合陽一",
        platform: "YouTube",
        emoji: "🧠",
        method: AccessMethod::KeywordSearch { query: "落合陽一" },
        theme: OCHIAI_THEME,
        max_age_days: Some(90),
    },
    Source {
        key: "karpathy_yt",
        name: "Andrej Karpathy",
        platform: "YouTube",
        emoji: "🤖",
        method: AccessMethod::Feed {
            url: "https://www.youtube.com/feeds/videos.xml?channel_id=UCXUPKJO5MZQN11PqgIvyuvQ",
        },
        theme: Theme { text: "#3D7A3D", background: "#EFF8EF", badge: "#D4EDDA" },
        max_age_days: None,
    },
    Source {
        key: "hardfork",
        name: "Hard Fork",
        platform: "Podcast",
        emoji: "🎙️",
        method: AccessMethod::Feed { url: "https://feeds.simplecast.com/l2i9YnTd" },
        theme: Theme { text: "#B83B46", background: "#FFF0F1", badge: "#FADCE0" },
        max_age_days: None,
    },
    Source {
        key: "every",
        name: "Every",
        platform: "Newsletter",
        emoji: "📝",
        method: AccessMethod::Scrape { url: "https://every.to", site: Site::Every },
        theme: Theme { text: "#2E6B96", background: "#EDF5FB", badge: "#D0E5F5" },
        max_age_days: None,
    },
    Source {
        key: "moltbook",
        name: "Moltbook",
        platform: "Community",
        emoji: "📚",
        method: AccessMethod::Scrape { url: "https://www.moltbook.com", site: Site::Moltbook },
        theme: Theme { text: "#6B4E8B", background: "#F5F0FA", badge: "#E4D9F2" },
        max_age_days: None,
    },
    Source {
        key: "amodei",
        name: "Dario Amodei",
        platform: "Blog",
        emoji: "🏛️",
        method: AccessMethod::Scrape { url: "https://darioamodei.com", site: Site::DarioAmodei },
        theme: Theme { text: "#2D6A4F", background: "#EDF7F0", badge: "#C8E6C9" },
        max_age_days: None,
    },
    Source {
        key: "technium",
        name: "Kevin Kelly",
        platform: "The Technium",
        emoji: "🔮",
        method: AccessMethod::Feed { url: "https://kk.org/thetechnium/feed/" },
        theme: Theme { text: "#5C6BC0", background: "#EDE7F6", badge: "#D1C4E9" },
        max_age_days: None,
    },
    Source {
        key: "tedchiang",
        name: "Ted Chiang",
        platform: "The New Yorker",
        emoji: "✍️",
        method: AccessMethod::Scrape {
            url: "https://www.newyorker.com/contributors/ted-chiang",
            site: Site::NewYorker,
        },
        theme: Theme { text: "#6D4C41", background: "#EFEBE9", badge: "#D7CCC8" },
        max_age_days: None,
    },
    Source {
        key: "wired_jp",
        name: "WIRED JAPAN",
        platform: "WIRED",
        emoji: "⚡",
        method: AccessMethod::Feed { url: "https://wired.jp/rssfeeder/" },
        theme: Theme { text: "#00695C", background: "#E0F2F1", badge: "#B2DFDB" },
        max_age_days: None,
    },
];

/// Find a registry row by key.
pub fn lookup(key: &str) -> Option<&'static Source> {
    SOURCES.iter().find(|source| source.key == key)
}

/// Theme for a key, falling back to [`NEUTRAL_THEME`].
pub fn theme_for(key: &str) -> Theme {
    lookup(key).map(|source| source.theme).unwrap_or(NEUTRAL_THEME)
}
