//! Presentation of the filtered view.
//!
//! Nothing outside this module knows how cards look. The controller and the
//! filter pipeline talk to a [`RenderTarget`], which accepts a list of
//! presentational records ([`CardView`]) or a placeholder, plus a status
//! line, error banners and the detail view of a single item.
//!
//! # Submodules
//!
//! - [`terminal`]: plain-text renderer writing to any `io::Write`
//! - [`capture`]: records what was rendered; used by `list` and by tests
//! - [`json`]: serializes the filtered view to JSON

pub mod capture;
pub mod json;
pub mod terminal;

use crate::models::NewsItem;
use crate::pipeline::truncate_title_and_summary;
use crate::utils::format_published_date;

/// Combined title and summary word budget of a compact card.
pub const CARD_WORD_BUDGET: usize = 30;

/// Topic and group badges shown per card and per detail view.
const MAX_TAG_BADGES: usize = 2;

/// Something that can display the news view.
pub trait RenderTarget {
    /// Replace the visible list with these cards.
    fn render_cards(&mut self, cards: &[CardView]);

    /// Replace the visible list with an empty-state message.
    fn render_placeholder(&mut self, title: &str, hint: &str);

    /// Update the summary line.
    fn show_stats(&mut self, text: &str);

    /// Show an error banner.
    fn show_error(&mut self, message: &str);

    /// Informational line (help text, "no more pages", ...).
    fn show_message(&mut self, message: &str);

    /// Show or hide the "load more" affordance.
    fn set_load_more_visible(&mut self, visible: bool);

    /// Show a single item in full.
    fn show_detail(&mut self, detail: &DetailView);
}

/// A compact card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    /// 1-based position in the filtered view; `open <n>` refers to it.
    pub position: usize,
    pub title: String,
    pub summary: String,
    pub date: String,
    /// Tool badges, then at most two topic and two group badges.
    pub badges: Vec<String>,
    pub source_count: usize,
}

impl CardView {
    pub fn from_item(position: usize, item: &NewsItem) -> Self {
        let compact = truncate_title_and_summary(&item.title, &item.summary, CARD_WORD_BUDGET);
        let badges = item
            .tool_source
            .iter()
            .chain(item.topic.iter().take(MAX_TAG_BADGES))
            .chain(item.groups.iter().take(MAX_TAG_BADGES))
            .cloned()
            .collect();

        CardView {
            position,
            title: compact.title,
            summary: compact.summary,
            date: format_published_date(item.published_date.as_ref()),
            badges,
            source_count: item.sources.len(),
        }
    }
}

/// Everything shown when a single item is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub title: String,
    pub date: String,
    pub tools: Vec<String>,
    pub topics: Vec<String>,
    pub groups: Vec<String>,
    pub summary: String,
    pub sources: Vec<String>,
}

impl DetailView {
    pub fn from_item(item: &NewsItem) -> Self {
        DetailView {
            title: item.title.clone(),
            date: format_published_date(item.published_date.as_ref()),
            tools: item.tool_source.clone(),
            topics: item.topic.iter().take(MAX_TAG_BADGES).cloned().collect(),
            groups: item.groups.iter().take(MAX_TAG_BADGES).cloned().collect(),
            summary: item.summary.clone(),
            sources: item.sources.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_timestamp;

    fn sample_item() -> NewsItem {
        NewsItem {
            title: "Parliament passes budget".into(),
            summary: "The vote was close.".into(),
            published_date: parse_timestamp("2025-03-14T09:00:00"),
            tool_source: vec!["tavily".into(), "reddit".into()],
            topic: vec!["Budget".into(), "Economy".into(), "Tax".into()],
            groups: vec!["Politics".into(), "Europe".into(), "Finance".into()],
            sources: vec!["https://a.test/1".into(), "https://b.test/2".into()],
        }
    }

    #[test]
    fn test_card_view_badges_and_date() {
        let card = CardView::from_item(3, &sample_item());
        assert_eq!(card.position, 3);
        assert_eq!(card.date, "March 14, 2025");
        assert_eq!(
            card.badges,
            vec!["tavily", "reddit", "Budget", "Economy", "Politics", "Europe"]
        );
        assert_eq!(card.source_count, 2);
        assert_eq!(card.summary, "The vote was close.");
    }

    #[test]
    fn test_card_view_truncates_long_summary() {
        let mut item = sample_item();
        item.summary = "word ".repeat(40);
        let card = CardView::from_item(1, &item);
        // 3 title words leave 27 for the summary.
        assert_eq!(card.summary.split_whitespace().count(), 27);
        assert!(card.summary.ends_with("..."));
    }

    #[test]
    fn test_detail_view_keeps_full_text() {
        let mut item = sample_item();
        item.summary = "word ".repeat(40).trim_end().to_string();
        let detail = DetailView::from_item(&item);
        assert_eq!(detail.summary.split_whitespace().count(), 40);
        assert_eq!(detail.topics, vec!["Budget", "Economy"]);
        assert_eq!(detail.groups, vec!["Politics", "Europe"]);
        assert_eq!(detail.sources.len(), 2);
    }

    #[test]
    fn test_missing_date() {
        let mut item = sample_item();
        item.published_date = None;
        assert_eq!(DetailView::from_item(&item).date, "Date not available");
    }
}
