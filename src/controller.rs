//! Pagination/fetch controller.
//!
//! [`PageController`] owns the session's paging state and is the only thing
//! that issues page requests. A load is split in two halves so that an event
//! loop can keep handling input while a request is in flight:
//!
//! 1. [`PageController::begin_load`] runs the synchronous guard (one fetch
//!    at a time, nothing past the last page) and hands out a [`PageTicket`]
//! 2. [`PageController::finish_load`] applies the response for that ticket
//!
//! [`PageController::load_page`] chains both halves around the fetch for
//! callers that simply await.
//!
//! # Generations
//!
//! Every reset bumps a generation counter and releases the loading flag so
//! the reset's own initial load can start at once. A ticket remembers the
//! generation it was issued in; completing a ticket from an older generation
//! is a no-op, so a slow response can never leak into a freshly reset feed.

use crate::api::{FetchError, NewsSource};
use crate::models::{Category, NewsItem, NewsPage, PageRequest, ToolFilter};
use crate::outputs::RenderTarget;
use crate::pipeline;
use tracing::{debug, error, info, instrument, warn};

/// Paging state of one browsing session.
///
/// `offset` always equals the number of items received since the last
/// reset, which is also `items.len()`.
#[derive(Debug, Clone)]
pub struct PageState {
    items: Vec<NewsItem>,
    offset: usize,
    has_more: bool,
    total: usize,
    loading: bool,
    category: Category,
    tool: ToolFilter,
    search: String,
}

impl Default for PageState {
    fn default() -> Self {
        PageState {
            items: Vec::new(),
            offset: 0,
            has_more: true,
            total: 0,
            loading: false,
            category: Category::All,
            tool: ToolFilter::All,
            search: String::new(),
        }
    }
}

impl PageState {
    pub fn items(&self) -> &[NewsItem] {
        &self.items
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Server-reported total, or the loaded count when the server gave none.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn tool_filter(&self) -> &ToolFilter {
        &self.tool
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_tool_filter(&mut self, tool: ToolFilter) {
        self.tool = tool;
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Append a page and advance the cursor. Returns the number of items received.
    pub fn apply_page(&mut self, page: NewsPage) -> usize {
        let received = page.news_items.len();
        self.items.extend(page.news_items);
        self.offset += received;
        self.has_more = page.has_more;
        self.total = page
            .total
            .map(|t| usize::try_from(t).unwrap_or(usize::MAX))
            .filter(|&t| t > 0)
            .unwrap_or(self.items.len());
        received
    }

    fn clear(&mut self) {
        self.items.clear();
        self.offset = 0;
        self.has_more = true;
        self.total = 0;
        self.loading = false;
    }
}

/// Permission to run one fetch, issued by [`PageController::begin_load`].
#[derive(Debug)]
pub struct PageTicket {
    generation: u64,
    is_initial: bool,
    request: PageRequest,
}

impl PageTicket {
    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    pub fn is_initial(&self) -> bool {
        self.is_initial
    }
}

/// What a load attempt ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A fetch was already in flight, or there is nothing left to load.
    Skipped,
    Loaded { received: usize },
    Failed,
    /// The response belonged to a generation that has since been reset.
    Stale,
}

pub struct PageController<S> {
    source: S,
    state: PageState,
    page_size: usize,
    generation: u64,
}

impl<S: NewsSource> PageController<S> {
    pub fn new(source: S, page_size: usize) -> Self {
        Self {
            source,
            state: PageState::default(),
            page_size,
            generation: 0,
        }
    }

    /// Start the session on a given tab with the given filters.
    pub fn with_filters(mut self, category: Category, tool: ToolFilter, search: &str) -> Self {
        self.state.category = category;
        self.state.tool = tool;
        self.state.search = search.to_string();
        self
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_search(&mut self, text: &str) {
        self.state.set_search(text);
    }

    pub fn set_tool_filter(&mut self, tool: ToolFilter) {
        self.state.set_tool_filter(tool);
    }

    /// Claim the loading flag for one page fetch.
    ///
    /// Returns `None` when a fetch is already in flight, or when this is not
    /// an initial load and the server said there is nothing more.
    pub fn begin_load(&mut self, is_initial: bool) -> Option<PageTicket> {
        if self.state.loading || (!is_initial && !self.state.has_more) {
            debug!(
                loading = self.state.loading,
                has_more = self.state.has_more,
                is_initial,
                "Load request ignored"
            );
            return None;
        }
        self.state.loading = true;
        Some(PageTicket {
            generation: self.generation,
            is_initial,
            request: PageRequest {
                limit: self.page_size,
                offset: self.state.offset,
                category: self.state.category,
                reset: is_initial,
            },
        })
    }

    /// Drop everything loaded so far and claim an initial load.
    pub fn begin_reset(&mut self) -> Option<PageTicket> {
        self.generation += 1;
        self.state.clear();
        info!(generation = self.generation, category = %self.state.category, "Feed reset");
        self.begin_load(true)
    }

    /// Switch tabs. Changing the category always resets the feed.
    pub fn begin_category(&mut self, category: Category) -> Option<PageTicket> {
        self.state.category = category;
        self.begin_reset()
    }

    /// Apply the result of the fetch `ticket` was issued for.
    ///
    /// On success the pipeline re-renders and the load-more affordance
    /// follows `has_more`. A failed initial load shows an error banner; a
    /// failed later page is only logged and keeps what was already loaded.
    /// The loading flag is released either way, unless the ticket is stale,
    /// in which case a newer fetch owns it.
    pub fn finish_load<R: RenderTarget + ?Sized>(
        &mut self,
        ticket: PageTicket,
        result: Result<NewsPage, FetchError>,
        target: &mut R,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            debug!(
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "Discarding response from before a reset"
            );
            return LoadOutcome::Stale;
        }
        self.state.loading = false;

        match result {
            Ok(page) => {
                let received = self.state.apply_page(page);
                info!(
                    received,
                    offset = self.state.offset,
                    total = self.state.total,
                    has_more = self.state.has_more,
                    "Page applied"
                );
                pipeline::refresh(&self.state, target);
                target.set_load_more_visible(self.state.has_more);
                LoadOutcome::Loaded { received }
            }
            Err(e) if ticket.is_initial => {
                error!(error = %e, endpoint = self.source.endpoint(), "Initial load failed");
                target.show_error(&format!(
                    "Failed to load news items: {e}. Make sure the API server is running on {}",
                    self.source.endpoint()
                ));
                LoadOutcome::Failed
            }
            Err(e) => {
                warn!(error = %e, offset = self.state.offset, "Loading more news failed");
                LoadOutcome::Failed
            }
        }
    }

    /// Load the next page, or the first one when `is_initial`.
    #[instrument(level = "debug", skip(self, target))]
    pub async fn load_page<R: RenderTarget + ?Sized>(
        &mut self,
        is_initial: bool,
        target: &mut R,
    ) -> LoadOutcome {
        let Some(ticket) = self.begin_load(is_initial) else {
            return LoadOutcome::Skipped;
        };
        let result = self.source.fetch_page(ticket.request()).await;
        self.finish_load(ticket, result, target)
    }

    /// The explicit "load more" action.
    pub async fn load_more<R: RenderTarget + ?Sized>(&mut self, target: &mut R) -> LoadOutcome {
        self.load_page(false, target).await
    }

    /// Clear everything and load the first page again.
    pub async fn reset<R: RenderTarget + ?Sized>(&mut self, target: &mut R) -> LoadOutcome {
        let Some(ticket) = self.begin_reset() else {
            return LoadOutcome::Skipped;
        };
        let result = self.source.fetch_page(ticket.request()).await;
        self.finish_load(ticket, result, target)
    }

    /// Switch tabs and load the first page of the new category.
    pub async fn set_category<R: RenderTarget + ?Sized>(
        &mut self,
        category: Category,
        target: &mut R,
    ) -> LoadOutcome {
        let Some(ticket) = self.begin_category(category) else {
            return LoadOutcome::Skipped;
        };
        let result = self.source.fetch_page(ticket.request()).await;
        self.finish_load(ticket, result, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::capture::CaptureTarget;
    use crate::test_support::{ScriptedSource, page};

    fn controller(source: &ScriptedSource) -> PageController<ScriptedSource> {
        PageController::new(source.clone(), 50)
    }

    #[tokio::test]
    async fn test_offset_tracks_received_items() {
        let source = ScriptedSource::new([
            Ok(page(0, 50, true, Some(120))),
            Ok(page(50, 50, true, Some(120))),
            Ok(page(100, 20, false, Some(120))),
        ]);
        let mut ctl = controller(&source);
        let mut target = CaptureTarget::default();

        assert_eq!(ctl.load_page(true, &mut target).await, LoadOutcome::Loaded { received: 50 });
        assert_eq!(ctl.load_more(&mut target).await, LoadOutcome::Loaded { received: 50 });
        assert_eq!(ctl.load_more(&mut target).await, LoadOutcome::Loaded { received: 20 });

        let state = ctl.state();
        assert_eq!(state.items().len(), 120);
        assert_eq!(state.offset(), 120);
        assert!(!state.has_more());
        assert_eq!(state.total(), 120);
        assert_eq!(state.items()[50].title, "item 50");

        let requests = source.requests();
        assert_eq!(
            requests.iter().map(|r| (r.offset, r.reset)).collect::<Vec<_>>(),
            vec![(0, true), (50, false), (100, false)]
        );
        assert!(requests.iter().all(|r| r.limit == 50));
    }

    #[tokio::test]
    async fn test_load_more_after_last_page_is_noop() {
        let source = ScriptedSource::new([Ok(page(0, 3, false, Some(3)))]);
        let mut ctl = controller(&source);
        let mut target = CaptureTarget::default();

        ctl.load_page(true, &mut target).await;
        assert_eq!(ctl.load_more(&mut target).await, LoadOutcome::Skipped);
        assert_eq!(source.requests().len(), 1);
        assert!(!target.load_more_visible);
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let source = ScriptedSource::new([
            Ok(page(0, 2, true, None)),
            Ok(page(0, 2, false, None)),
        ]);
        let mut ctl = controller(&source);
        let mut target = CaptureTarget::default();

        ctl.load_page(true, &mut target).await;
        ctl.load_more(&mut target).await;
        assert_eq!(ctl.state().items().len(), 4);
        assert_eq!(ctl.state().offset(), 4);
    }

    #[test]
    fn test_only_one_fetch_in_flight() {
        let source = ScriptedSource::default();
        let mut ctl = controller(&source);
        let mut target = CaptureTarget::default();

        let ticket = ctl.begin_load(true).unwrap();
        assert!(ctl.state().is_loading());
        assert!(ctl.begin_load(false).is_none());
        assert!(ctl.begin_load(true).is_none());

        ctl.finish_load(ticket, Ok(page(0, 1, true, None)), &mut target);
        assert!(!ctl.state().is_loading());
        assert!(ctl.begin_load(false).is_some());
    }

    #[tokio::test]
    async fn test_initial_failure_shows_error() {
        let source = ScriptedSource::new([Err(500)]);
        let mut ctl = controller(&source);
        let mut target = CaptureTarget::default();

        assert_eq!(ctl.load_page(true, &mut target).await, LoadOutcome::Failed);
        assert!(!ctl.state().is_loading());
        assert_eq!(target.errors.len(), 1);
        assert!(target.errors[0].contains("HTTP error! status: 500"));
        assert!(target.errors[0].contains(ScriptedSource::ENDPOINT));
    }

    #[tokio::test]
    async fn test_later_failure_is_silent_and_keeps_items() {
        let source = ScriptedSource::new([Ok(page(0, 10, true, Some(30))), Err(502)]);
        let mut ctl = controller(&source);
        let mut target = CaptureTarget::default();

        ctl.load_page(true, &mut target).await;
        assert_eq!(ctl.load_more(&mut target).await, LoadOutcome::Failed);

        assert!(target.errors.is_empty());
        assert!(!ctl.state().is_loading());
        assert_eq!(ctl.state().items().len(), 10);
        assert_eq!(ctl.state().offset(), 10);
        assert!(ctl.state().has_more());
    }

    #[tokio::test]
    async fn test_success_runs_pipeline() {
        let source = ScriptedSource::new([Ok(page(0, 2, true, Some(9)))]);
        let mut ctl = controller(&source);
        let mut target = CaptureTarget::default();

        ctl.load_page(true, &mut target).await;
        assert_eq!(target.renders, 1);
        assert_eq!(target.cards.len(), 2);
        assert!(target.load_more_visible);
        assert_eq!(
            target.stats.as_deref(),
            Some("Showing 2 (9 total) news items • type `more` to load more")
        );
    }

    #[tokio::test]
    async fn test_missing_total_defaults_to_loaded_count() {
        let source = ScriptedSource::new([Ok(page(0, 7, false, None))]);
        let mut ctl = controller(&source);
        ctl.load_page(true, &mut CaptureTarget::default()).await;
        assert_eq!(ctl.state().total(), 7);
    }

    #[tokio::test]
    async fn test_reset_clears_and_refetches() {
        let source = ScriptedSource::new([
            Ok(page(0, 50, true, Some(200))),
            Ok(page(50, 50, true, Some(200))),
            Ok(page(0, 50, true, Some(210))),
        ]);
        let mut ctl = controller(&source);
        let mut target = CaptureTarget::default();

        ctl.load_page(true, &mut target).await;
        ctl.load_more(&mut target).await;
        assert_eq!(ctl.state().offset(), 100);

        assert_eq!(ctl.reset(&mut target).await, LoadOutcome::Loaded { received: 50 });
        assert_eq!(ctl.state().items().len(), 50);
        assert_eq!(ctl.state().offset(), 50);
        assert_eq!(ctl.state().total(), 210);

        let last = source.requests().pop().unwrap();
        assert_eq!(last.offset, 0);
        assert!(last.reset);
    }

    #[tokio::test]
    async fn test_category_change_resets_with_new_category() {
        let source = ScriptedSource::new([
            Ok(page(0, 5, true, None)),
            Ok(page(0, 3, false, None)),
        ]);
        let mut ctl = controller(&source);
        let mut target = CaptureTarget::default();

        ctl.load_page(true, &mut target).await;
        ctl.set_category(Category::Health, &mut target).await;

        assert_eq!(ctl.state().category(), Category::Health);
        assert_eq!(ctl.state().items().len(), 3);
        let requests = source.requests();
        assert_eq!(requests[0].category, Category::All);
        assert_eq!(requests[1].category, Category::Health);
        assert_eq!((requests[1].offset, requests[1].reset), (0, true));
    }

    #[test]
    fn test_stale_response_after_reset_is_discarded() {
        let source = ScriptedSource::default();
        let mut ctl = controller(&source);
        let mut target = CaptureTarget::default();

        let first = ctl.begin_load(true).unwrap();
        ctl.finish_load(first, Ok(page(0, 50, true, None)), &mut target);

        let slow = ctl.begin_load(false).unwrap();
        let fresh = ctl.begin_reset().unwrap();
        assert_eq!(fresh.request().offset, 0);
        assert!(ctl.state().items().is_empty());

        let outcome = ctl.finish_load(slow, Ok(page(50, 50, true, None)), &mut target);
        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(ctl.state().items().is_empty());
        assert_eq!(ctl.state().offset(), 0);
        // The reset's own fetch still owns the flag.
        assert!(ctl.state().is_loading());

        let outcome = ctl.finish_load(fresh, Ok(page(0, 4, false, None)), &mut target);
        assert_eq!(outcome, LoadOutcome::Loaded { received: 4 });
        assert!(!ctl.state().is_loading());
        assert_eq!(ctl.state().offset(), 4);
    }

    #[test]
    fn test_stale_failure_does_not_show_error() {
        let source = ScriptedSource::default();
        let mut ctl = controller(&source);
        let mut target = CaptureTarget::default();

        let initial = ctl.begin_load(true).unwrap();
        let _fresh = ctl.begin_category(Category::Science).unwrap();
        let outcome = ctl.finish_load(initial, Err(FetchError::Status { status: 500 }), &mut target);
        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(target.errors.is_empty());
    }

    #[tokio::test]
    async fn test_loading_cleared_after_every_outcome() {
        let source = ScriptedSource::new([Ok(page(0, 1, true, None)), Err(404), Err(500)]);
        let mut ctl = controller(&source);
        let mut target = CaptureTarget::default();

        ctl.load_page(true, &mut target).await;
        assert!(!ctl.state().is_loading());
        ctl.load_more(&mut target).await;
        assert!(!ctl.state().is_loading());
        ctl.reset(&mut target).await;
        assert!(!ctl.state().is_loading());
    }

    #[test]
    fn test_filters_do_not_refetch() {
        let source = ScriptedSource::default();
        let mut ctl = controller(&source).with_filters(Category::Politics, ToolFilter::All, "");
        ctl.set_search("vote");
        ctl.set_tool_filter(ToolFilter::Tool("reddit".into()));

        assert_eq!(ctl.state().search(), "vote");
        assert_eq!(ctl.state().category(), Category::Politics);
        assert!(source.requests().is_empty());
        assert_eq!(ctl.generation(), 0);
    }
}
