//! Shared fixtures for unit tests.

use crate::api::{FetchError, NewsSource};
use crate::models::{NewsItem, NewsPage, PageRequest};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Build a page of `count` items titled "item {first}".."item {first + count - 1}".
pub fn page(first: usize, count: usize, has_more: bool, total: Option<u64>) -> NewsPage {
    NewsPage {
        news_items: (first..first + count)
            .map(|i| NewsItem {
                title: format!("item {i}"),
                summary: format!("summary of item {i}"),
                tool_source: vec![if i % 2 == 0 { "arxiv" } else { "reddit" }.to_string()],
                ..NewsItem::default()
            })
            .collect(),
        has_more,
        total,
    }
}

/// A [`NewsSource`] that replays canned responses and records every request.
///
/// `Err(status)` entries answer with [`FetchError::Status`]. Once the script
/// runs out, every fetch returns an empty last page.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    responses: Rc<RefCell<VecDeque<Result<NewsPage, u16>>>>,
    requests: Rc<RefCell<Vec<PageRequest>>>,
}

impl ScriptedSource {
    pub const ENDPOINT: &'static str = "http://news.test/api/news";

    pub fn new(responses: impl IntoIterator<Item = Result<NewsPage, u16>>) -> Self {
        Self {
            responses: Rc::new(RefCell::new(responses.into_iter().collect())),
            requests: Rc::default(),
        }
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.borrow().clone()
    }
}

impl NewsSource for ScriptedSource {
    fn endpoint(&self) -> &str {
        Self::ENDPOINT
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<NewsPage, FetchError> {
        self.requests.borrow_mut().push(request.clone());
        let next = self.responses.borrow_mut().pop_front();
        match next {
            Some(Ok(page)) => Ok(page),
            Some(Err(status)) => Err(FetchError::Status { status }),
            None => Ok(NewsPage::default()),
        }
    }
}
