//! Data models for the news feed API.
//!
//! This module defines the records exchanged with the news endpoint and the
//! small value types the controller keys its requests on:
//! - [`NewsItem`]: a single news item as served by the API
//! - [`NewsPage`]: one page of the paginated `/api/news` response
//! - [`PageRequest`]: the query a single page fetch is issued with
//! - [`Category`] and [`ToolFilter`]: the tab and tool-source selectors
//! - [`NewsStats`] and [`HealthStatus`]: the auxiliary endpoints
//!
//! The server is lenient about what it omits, so every field of the wire
//! types tolerates being absent or `null`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A news item as returned by the feed API.
///
/// Items are immutable once received; the controller only ever appends them
/// to its accumulated collection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NewsItem {
    /// The headline.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// One or two paragraphs summarizing the story.
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    /// Publication time, if the server knew it.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub published_date: Option<NaiveDateTime>,
    /// Tools that surfaced this item (e.g. "arxiv", "tavily").
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_source: Vec<String>,
    /// Topic tags, most relevant first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub topic: Vec<String>,
    /// Group tags, most relevant first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<String>,
    /// URLs of the articles this item was built from.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<String>,
}

/// One page of the `/api/news` response.
///
/// Missing fields fall back to an empty page with no continuation; a missing
/// `total` is resolved by the controller against its accumulated count.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NewsPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub news_items: Vec<NewsItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_more: bool,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Aggregate counts served by `/api/news/stats`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NewsStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_items: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub by_tool_source: Vec<CountBucket>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_topics: Vec<CountBucket>,
}

/// A `{ "_id": key, "count": n }` aggregation row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CountBucket {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default)]
    pub count: u64,
}

/// Response of the `/api/health` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HealthStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub database: String,
}

/// The fixed set of category tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Politics,
    Technology,
    Science,
    Health,
}

impl Category {
    /// Every tab, in display order.
    pub const TABS: [Category; 5] = [
        Category::All,
        Category::Politics,
        Category::Technology,
        Category::Science,
        Category::Health,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Politics => "politics",
            Category::Technology => "technology",
            Category::Science => "science",
            Category::Health => "health",
        }
    }

    /// Value of the `category` query parameter; `All` sends none.
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Category::All => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category `{0}` (expected one of: all, politics, technology, science, health)")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::TABS
            .into_iter()
            .find(|tab| tab.as_str() == wanted)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// The active tool-source filter.
///
/// Known tools are "arxiv", "tavily", "wikipedia" and "reddit", but the feed
/// is free to introduce new ones, so any name is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolFilter {
    #[default]
    All,
    Tool(String),
}

impl ToolFilter {
    /// Whether an item carrying `tags` passes this filter.
    ///
    /// Tool names compare case-insensitively.
    pub fn matches(&self, tags: &[String]) -> bool {
        match self {
            ToolFilter::All => true,
            ToolFilter::Tool(name) => {
                let name = name.to_lowercase();
                tags.iter().any(|tag| tag.to_lowercase() == name)
            }
        }
    }
}

impl fmt::Display for ToolFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolFilter::All => f.write_str("all"),
            ToolFilter::Tool(name) => f.write_str(name),
        }
    }
}

impl FromStr for ToolFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("all") {
            Ok(ToolFilter::All)
        } else {
            Ok(ToolFilter::Tool(name.to_string()))
        }
    }
}

/// Query parameters of a single page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
    pub category: Category,
    /// Asks the server to drop its deduplication state; sent on initial loads only.
    pub reset: bool,
}

impl PageRequest {
    /// Query pairs in the order the server documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(category) = self.category.query_value() {
            pairs.push(("category", category.to_string()));
        }
        if self.reset {
            pairs.push(("reset", "true".to_string()));
        }
        pairs
    }
}

/// Parse a publication timestamp in any of the shapes the feed emits.
///
/// Accepts RFC 3339, naive ISO-8601 date-times (with or without fractional
/// seconds, `T` or space separated) and bare dates. Offsets are dropped in
/// favour of the wall-clock time they were reported in.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Unparseable dates degrade to "unknown" rather than failing the whole page.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(parse_timestamp))
}
