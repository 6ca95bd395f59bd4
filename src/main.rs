//! # newsdesk
//!
//! A terminal client for a paginated news feed API. It pages through news
//! items, filters them by search text, category tab and tool source, and
//! renders them as compact cards with a detail view per item.
//!
//! ## Usage
//!
//! ```sh
//! newsdesk                                  # interactive session
//! newsdesk list --pages 3 --tool arxiv      # one-shot listing
//! newsdesk list --json -o feed.json         # JSON snapshot
//! newsdesk stats                            # server-side aggregates
//! ```
//!
//! The library half of the crate holds everything but process setup; see
//! `lib.rs` for the module map.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use newsdesk::api::{HttpNewsSource, NewsSource};
use newsdesk::cli::{Cli, Command, FilterArgs, ListArgs};
use newsdesk::config::Settings;
use newsdesk::controller::{LoadOutcome, PageController};
use newsdesk::outputs::RenderTarget;
use newsdesk::outputs::capture::CaptureTarget;
use newsdesk::outputs::json::{FeedSnapshot, write_snapshot};
use newsdesk::outputs::terminal::TerminalRenderer;
use newsdesk::session::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // Logs go to stderr so they never interleave with rendered cards.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = match Settings::load(&args.global).await {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        endpoint = %settings.endpoint,
        page_size = settings.page_size,
        timeout_secs = settings.timeout.as_secs(),
        "newsdesk starting up"
    );

    let source = HttpNewsSource::new(&settings)?;

    match args.command.unwrap_or_default() {
        Command::Browse(filters) => browse(source, &settings, filters).await,
        Command::List(list_args) => list(source, &settings, list_args).await,
        Command::Stats => stats(&source).await,
        Command::Health => health(&source).await,
    }
}

#[instrument(level = "info", skip_all)]
async fn browse(
    source: HttpNewsSource,
    settings: &Settings,
    filters: FilterArgs,
) -> Result<(), Box<dyn Error>> {
    let controller = PageController::new(source, settings.page_size).with_filters(
        filters.category,
        filters.tool,
        &filters.search,
    );
    let mut renderer = TerminalRenderer::new(std::io::stdout());
    renderer.show_message("Type `help` for commands.");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    Session::new(controller, renderer).run(stdin).await
}

#[instrument(level = "info", skip_all, fields(pages = args.pages))]
async fn list(
    source: HttpNewsSource,
    settings: &Settings,
    args: ListArgs,
) -> Result<(), Box<dyn Error>> {
    let filters = args.filters;
    let mut controller = PageController::new(source, settings.page_size).with_filters(
        filters.category,
        filters.tool,
        &filters.search,
    );
    let mut capture = CaptureTarget::default();

    for page in 0..args.pages.max(1) {
        let outcome = if page == 0 {
            controller.load_page(true, &mut capture).await
        } else {
            controller.load_more(&mut capture).await
        };
        match outcome {
            LoadOutcome::Loaded { .. } => {}
            LoadOutcome::Failed if page == 0 => {
                let message = capture
                    .errors
                    .last()
                    .cloned()
                    .unwrap_or_else(|| "Failed to load news items".to_string());
                return Err(message.into());
            }
            LoadOutcome::Failed => {
                warn!(page, "Stopping early; later pages failed to load");
                break;
            }
            LoadOutcome::Skipped | LoadOutcome::Stale => break,
        }
    }

    if args.json {
        let snapshot = FeedSnapshot::from_state(controller.state());
        write_snapshot(&snapshot, args.output.as_deref()).await?;
    } else {
        let mut renderer = TerminalRenderer::new(std::io::stdout());
        capture.replay(&mut renderer);
    }
    Ok(())
}

#[instrument(level = "info", skip_all, fields(endpoint = source.endpoint()))]
async fn stats(source: &HttpNewsSource) -> Result<(), Box<dyn Error>> {
    let stats = source.fetch_stats().await?;

    println!("{} news items", stats.total_items);
    if !stats.by_tool_source.is_empty() {
        println!("\nBy tool source:");
        for bucket in &stats.by_tool_source {
            println!("  {:<12} {}", bucket.key, bucket.count);
        }
    }
    if !stats.top_topics.is_empty() {
        println!("\nTop topics:");
        for bucket in &stats.top_topics {
            println!("  {:<24} {}", bucket.key, bucket.count);
        }
    }
    Ok(())
}

#[instrument(level = "info", skip_all, fields(endpoint = source.endpoint()))]
async fn health(source: &HttpNewsSource) -> Result<(), Box<dyn Error>> {
    let status = source.health().await?;
    println!("status: {}  database: {}", status.status, status.database);
    if status.database != "connected" {
        warn!(database = %status.database, "API is up but its database is not connected");
        return Err(format!("database {}", status.database).into());
    }
    Ok(())
}
