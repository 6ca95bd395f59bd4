//! Interactive browsing session.
//!
//! The session is the event source of the application: it reads one command
//! per line and routes it to the controller or the filter pipeline. Fetches
//! run concurrently with input handling on the same task, so `refresh` or
//! `tab` can be issued while a page is still loading; the controller's
//! generation counter discards whatever the superseded fetch returns.
//!
//! # Commands
//!
//! | Command | Effect |
//! |---------|--------|
//! | `search <text>` / `search` | set / clear the search text |
//! | `tool <name>` / `tool all` | filter by tool source |
//! | `tab <category>` | switch category tab (reloads) |
//! | `more` | load the next page |
//! | `refresh` | drop everything and reload |
//! | `open <n>` | show card `n` in full |
//! | `list` | re-render the current view |
//! | `help` | show this table |
//! | `quit` | leave |

use crate::api::{FetchError, NewsSource};
use crate::controller::{LoadOutcome, PageController, PageTicket};
use crate::models::{Category, NewsPage, ToolFilter};
use crate::outputs::{DetailView, RenderTarget};
use crate::pipeline;
use crate::utils::upcase;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use itertools::Itertools;
use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, instrument};

pub const HELP: &str = "\
Commands:
  search <text>    filter by title, summary, topic or group (`search` alone clears)
  tool <name|all>  filter by tool source (arxiv, tavily, wikipedia, reddit, ...)
  tab <category>   switch tab: all, politics, technology, science, health
  more             load the next page
  refresh          reload from the first page
  open <n>         show item n in full
  list             show the current view again
  help             show this help
  quit             leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Tool(ToolFilter),
    Tab(Category),
    More,
    Refresh,
    Open(usize),
    List,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "search" | "s" | "/" => Ok(Command::Search(rest.to_string())),
            "tool" | "t" => Ok(Command::Tool(
                rest.parse().unwrap_or(ToolFilter::All),
            )),
            "tab" | "category" => {
                if rest.is_empty() {
                    return Err("usage: tab <all|politics|technology|science|health>".into());
                }
                rest.parse().map(Command::Tab).map_err(|e| e.to_string())
            }
            "more" | "m" => Ok(Command::More),
            "refresh" | "r" => Ok(Command::Refresh),
            "open" | "o" => match rest.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Command::Open(n)),
                _ => Err("usage: open <n> (card number, starting at 1)".into()),
            },
            "list" | "ls" => Ok(Command::List),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            "" => Ok(Command::List),
            other => Err(format!("unknown command `{other}`; type `help`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

type PendingFetch = Pin<Box<dyn Future<Output = (PageTicket, Result<NewsPage, FetchError>)>>>;

pub struct Session<S, R> {
    controller: PageController<S>,
    target: R,
    pending: FuturesUnordered<PendingFetch>,
}

impl<S, R> Session<S, R>
where
    S: NewsSource + Clone + 'static,
    R: RenderTarget,
{
    pub fn new(controller: PageController<S>, target: R) -> Self {
        Self {
            controller,
            target,
            pending: FuturesUnordered::new(),
        }
    }

    pub fn controller(&self) -> &PageController<S> {
        &self.controller
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    /// Number of fetches not yet completed, stale ones included.
    pub fn pending_fetches(&self) -> usize {
        self.pending.len()
    }

    /// Issue the initial load for the session's starting tab.
    pub fn start(&mut self) {
        self.target.show_message(&tab_bar(self.controller.state().category()));
        let ticket = self.controller.begin_load(true);
        self.spawn_fetch(ticket);
    }

    fn spawn_fetch(&mut self, ticket: Option<PageTicket>) {
        let Some(ticket) = ticket else {
            return;
        };
        if ticket.is_initial() {
            self.target.show_message("Loading news...");
        } else {
            self.target.show_message("Loading more news...");
        }
        let source = self.controller.source().clone();
        self.pending.push(Box::pin(async move {
            let result = source.fetch_page(ticket.request()).await;
            (ticket, result)
        }));
    }

    /// Hand a finished fetch back to the controller.
    pub fn complete(
        &mut self,
        ticket: PageTicket,
        result: Result<NewsPage, FetchError>,
    ) -> LoadOutcome {
        let outcome = self.controller.finish_load(ticket, result, &mut self.target);
        debug!(?outcome, "Fetch completed");
        outcome
    }

    /// Wait for the next in-flight fetch and apply it.
    pub async fn settle_one(&mut self) -> Option<LoadOutcome> {
        let (ticket, result) = self.pending.next().await?;
        Some(self.complete(ticket, result))
    }

    /// Apply one command. Fetch-triggering commands return immediately with
    /// the fetch queued.
    pub fn dispatch(&mut self, command: Command) -> Flow {
        debug!(?command, "Dispatching command");
        match command {
            Command::Search(text) => {
                self.controller.set_search(&text);
                pipeline::refresh(self.controller.state(), &mut self.target);
            }
            Command::Tool(tool) => {
                self.controller.set_tool_filter(tool);
                pipeline::refresh(self.controller.state(), &mut self.target);
            }
            Command::Tab(category) => {
                self.target.show_message(&tab_bar(category));
                let ticket = self.controller.begin_category(category);
                self.spawn_fetch(ticket);
            }
            Command::More => {
                let state = self.controller.state();
                if state.is_loading() {
                    self.target.show_message("Still loading, please wait.");
                } else if !state.has_more() {
                    self.target.show_message("No more news to load.");
                } else {
                    let ticket = self.controller.begin_load(false);
                    self.spawn_fetch(ticket);
                }
            }
            Command::Refresh => {
                let ticket = self.controller.begin_reset();
                self.spawn_fetch(ticket);
            }
            Command::Open(n) => {
                let view = pipeline::filtered_view(self.controller.state());
                match n.checked_sub(1).and_then(|i| view.get(i)) {
                    Some(item) => self.target.show_detail(&DetailView::from_item(item)),
                    None => self
                        .target
                        .show_error(&format!("no item #{n} in the current view ({} shown)", view.len())),
                }
            }
            Command::List => {
                pipeline::refresh(self.controller.state(), &mut self.target);
            }
            Command::Help => self.target.show_message(HELP),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Run until `quit` or end of input.
    #[instrument(level = "info", skip_all)]
    pub async fn run<I>(mut self, input: I) -> Result<(), Box<dyn Error>>
    where
        I: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.start();

        loop {
            tokio::select! {
                // Apply arrived pages before reading the next command.
                biased;

                Some((ticket, result)) = self.pending.next(), if !self.pending.is_empty() => {
                    self.complete(ticket, result);
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Input closed");
                        break;
                    };
                    match line.parse::<Command>() {
                        Ok(command) => {
                            if self.dispatch(command) == Flow::Quit {
                                break;
                            }
                        }
                        Err(message) => self.target.show_error(&message),
                    }
                }
            }
        }

        info!(
            loaded = self.controller.state().items().len(),
            abandoned_fetches = self.pending.len(),
            "Session finished"
        );
        Ok(())
    }
}

/// "[All] Politics Technology Science Health" with the active tab bracketed.
fn tab_bar(active: Category) -> String {
    Category::TABS
        .iter()
        .map(|&tab| {
            let label = upcase(tab.as_str());
            if tab == active {
                format!("[{label}]")
            } else {
                label
            }
        })
        .join(" ")
}
