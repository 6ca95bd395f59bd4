//! JSON output of the filtered view.
//!
//! `list --json` serializes a [`FeedSnapshot`]: the filters in effect, the
//! paging counters and the items that passed the filters.
//!
//! ```text
//! {
//!   "fetched_at": "2025-05-06T14:30:00+02:00",
//!   "category": "technology",
//!   "tool": "arxiv",
//!   "search": "",
//!   "loaded": 100,
//!   "total": 240,
//!   "has_more": true,
//!   "items": [ ... ]
//! }
//! ```

use crate::controller::PageState;
use crate::models::{Category, NewsItem};
use crate::pipeline::filtered_view;
use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
pub struct FeedSnapshot<'a> {
    pub fetched_at: String,
    pub category: Category,
    pub tool: String,
    pub search: &'a str,
    pub loaded: usize,
    pub total: usize,
    pub has_more: bool,
    pub items: Vec<&'a NewsItem>,
}

impl<'a> FeedSnapshot<'a> {
    pub fn from_state(state: &'a PageState) -> Self {
        FeedSnapshot {
            fetched_at: Local::now().to_rfc3339(),
            category: state.category(),
            tool: state.tool_filter().to_string(),
            search: state.search(),
            loaded: state.items().len(),
            total: state.total(),
            has_more: state.has_more(),
            items: filtered_view(state),
        }
    }
}

/// Write the snapshot to `path`, or to stdout when no path is given.
///
/// Parent directories are created as needed.
#[instrument(level = "info", skip_all, fields(path = ?path))]
pub async fn write_snapshot(
    snapshot: &FeedSnapshot<'_>,
    path: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(snapshot)?;

    let Some(path) = path else {
        println!("{json}");
        return Ok(());
    };

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(%path, items = snapshot.items.len(), "Wrote JSON snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewsPage, ToolFilter};

    fn state_with(items: Vec<NewsItem>) -> PageState {
        let mut state = PageState::default();
        state.apply_page(NewsPage {
            news_items: items,
            has_more: true,
            total: Some(10),
        });
        state
    }

    #[test]
    fn test_snapshot_contains_only_filtered_items() {
        let mut state = state_with(vec![
            NewsItem {
                title: "kept".into(),
                tool_source: vec!["arxiv".into()],
                ..NewsItem::default()
            },
            NewsItem {
                title: "dropped".into(),
                tool_source: vec!["reddit".into()],
                ..NewsItem::default()
            },
        ]);
        state.set_tool_filter(ToolFilter::Tool("arxiv".into()));

        let snapshot = FeedSnapshot::from_state(&state);
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["tool"], "arxiv");
        assert_eq!(value["category"], "all");
        assert_eq!(value["loaded"], 2);
        assert_eq!(value["total"], 10);
        assert_eq!(value["items"].as_array().unwrap().len(), 1);
        assert_eq!(value["items"][0]["title"], "kept");
    }

    #[tokio::test]
    async fn test_write_snapshot_to_file() {
        let state = state_with(vec![NewsItem {
            title: "saved".into(),
            ..NewsItem::default()
        }]);
        let snapshot = FeedSnapshot::from_state(&state);

        let dir = std::env::temp_dir().join(format!("newsdesk-json-{}", std::process::id()));
        let path = dir.join("nested").join("feed.json");
        write_snapshot(&snapshot, path.to_str()).await.unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["items"][0]["title"], "saved");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
