//! Filter/render pipeline.
//!
//! Derives the visible view from the controller's accumulated items and the
//! current search text and tool filter, then pushes it to a
//! [`RenderTarget`]. Every function here is pure over its inputs; running the
//! pipeline twice with unchanged state renders the same view.

use crate::controller::PageState;
use crate::models::{NewsItem, ToolFilter};
use crate::outputs::{CardView, RenderTarget};
use crate::utils::{truncate_words, word_count};
use itertools::Itertools;

pub const EMPTY_TITLE: &str = "No news items found";
pub const EMPTY_HINT: &str = "Try adjusting your filters or search terms";
pub const NOTHING_LOADED: &str = "No news items available";
pub const CONTINUATION_HINT: &str = " • type `more` to load more";

/// Title and summary as they fit on a compact card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactText {
    pub title: String,
    pub summary: String,
}

/// Items passing both the tool filter and the search text, in load order.
///
/// An empty search matches everything. Otherwise the lowercased search must
/// occur in the title, the summary, any topic or any group.
pub fn apply_filters<'a>(
    items: &'a [NewsItem],
    tool: &ToolFilter,
    search: &str,
) -> Vec<&'a NewsItem> {
    let needle = search.to_lowercase();
    items
        .iter()
        .filter(|item| tool.matches(&item.tool_source) && matches_search(item, &needle))
        .collect()
}

/// `needle` must already be lowercase.
fn matches_search(item: &NewsItem, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    item.title.to_lowercase().contains(needle)
        || item.summary.to_lowercase().contains(needle)
        || item
            .topic
            .iter()
            .chain(item.groups.iter())
            .any(|tag| tag.to_lowercase().contains(needle))
}

/// The filtered view of the controller's current state.
pub fn filtered_view(state: &PageState) -> Vec<&NewsItem> {
    apply_filters(state.items(), state.tool_filter(), state.search())
}

/// Replace the visible list with one card per item, or the placeholder.
pub fn render<R: RenderTarget + ?Sized>(items: &[&NewsItem], target: &mut R) {
    if items.is_empty() {
        target.render_placeholder(EMPTY_TITLE, EMPTY_HINT);
        return;
    }
    let cards = items
        .iter()
        .enumerate()
        .map(|(i, item)| CardView::from_item(i + 1, item))
        .collect_vec();
    target.render_cards(&cards);
}

/// Summary line, e.g. "Showing 20 of 100 (150 total) news items".
pub fn compute_stats(loaded: usize, displayed: usize, total: usize, has_more: bool) -> String {
    if loaded == 0 {
        return NOTHING_LOADED.to_string();
    }
    let mut text = if displayed < loaded {
        format!("Showing {displayed} of {loaded}")
    } else {
        format!("Showing {loaded}")
    };
    if total > loaded {
        text.push_str(&format!(" ({total} total)"));
    }
    text.push_str(" news items");
    if has_more {
        text.push_str(CONTINUATION_HINT);
    }
    text
}

/// Fit a title and summary into a combined word budget.
///
/// - Both fit: returned unchanged.
/// - The title alone fills the budget: the title is cut to `budget` words and
///   the summary dropped.
/// - Otherwise the title is kept whole and the summary gets what is left.
///
/// Text that is cut ends with `...`.
pub fn truncate_title_and_summary(title: &str, summary: &str, budget: usize) -> CompactText {
    let title_words = word_count(title);
    if title_words + word_count(summary) <= budget {
        return CompactText {
            title: title.to_string(),
            summary: summary.to_string(),
        };
    }
    if title_words >= budget {
        return CompactText {
            title: truncate_words(title, budget),
            summary: String::new(),
        };
    }
    CompactText {
        title: title.to_string(),
        summary: truncate_words(summary, budget - title_words),
    }
}

/// Run the whole pipeline: filter, render, update the summary line.
///
/// Returns the number of items displayed.
pub fn refresh<R: RenderTarget + ?Sized>(state: &PageState, target: &mut R) -> usize {
    let view = filtered_view(state);
    render(&view, target);
    target.show_stats(&compute_stats(
        state.items().len(),
        view.len(),
        state.total(),
        state.has_more(),
    ));
    view.len()
}
