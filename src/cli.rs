//! Command-line interface definitions for newsdesk.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Connection settings can be provided via command-line flags, environment
//! variables or a YAML config file (see [`crate::config`]).

use crate::models::{Category, ToolFilter};
use clap::{Args, Parser, Subcommand};

/// Command-line arguments for newsdesk.
///
/// # Examples
///
/// ```sh
/// # Interactive session against the default local API
/// newsdesk
///
/// # Print the first two pages of technology news found on arxiv
/// newsdesk list --pages 2 --category technology --tool arxiv
///
/// # Point at another server
/// newsdesk --endpoint https://news.example.com/api/news browse
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Connection settings shared by every subcommand.
///
/// Each value is optional so the config layer can tell a flag apart from a
/// default.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// News API endpoint
    #[arg(long, env = "NEWSDESK_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Number of items requested per page
    #[arg(long, env = "NEWSDESK_PAGE_SIZE", global = true)]
    pub page_size: Option<usize>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "NEWSDESK_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Optional path to a config.yaml file
    #[arg(short, long, env = "NEWSDESK_CONFIG", global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive session: search, filter, switch tabs and load more pages
    Browse(FilterArgs),
    /// Fetch pages once and print the filtered view
    List(ListArgs),
    /// Print aggregate counts reported by the server
    Stats,
    /// Check that the API server and its database are up
    Health,
}

impl Default for Command {
    fn default() -> Self {
        Command::Browse(FilterArgs::default())
    }
}

/// Initial view selection.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Category tab (all, politics, technology, science, health)
    #[arg(long, default_value = "all")]
    pub category: Category,

    /// Only show items found by this tool (e.g. arxiv, tavily, wikipedia, reddit)
    #[arg(long, default_value = "all")]
    pub tool: ToolFilter,

    /// Only show items whose title, summary, topics or groups contain this text
    #[arg(short, long, default_value = "")]
    pub search: String,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Maximum number of pages to fetch
    #[arg(long, default_value_t = 1)]
    pub pages: usize,

    /// Emit the filtered items as JSON instead of cards
    #[arg(long)]
    pub json: bool,

    /// Write the JSON snapshot to this file instead of stdout
    #[arg(short, long, requires = "json")]
    pub output: Option<String>,
}
