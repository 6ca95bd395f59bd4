//! Plain-text terminal renderer.
//!
//! Cards are written as short blocks:
//!
//! ```text
//! [1] Parliament passes budget
//!     March 14, 2025 · tavily, reddit, Budget, Politics · 2 sources
//!     The vote was close.
//! ```
//!
//! Write failures are logged and otherwise ignored; a closed stdout should
//! not take the session down with it.

use super::{CardView, DetailView, RenderTarget};
use itertools::Itertools;
use std::io::Write;
use tracing::warn;

const RULE: &str = "────────────────────────────────────────";

pub struct TerminalRenderer<W: Write> {
    out: W,
    load_more_visible: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            load_more_visible: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
        {
            warn!(error = %e, "Failed to write to terminal");
        }
    }
}

fn card_block(card: &CardView) -> String {
    let mut meta = vec![card.date.clone()];
    if !card.badges.is_empty() {
        meta.push(card.badges.join(", "));
    }
    match card.source_count {
        0 => {}
        1 => meta.push("1 source".to_string()),
        n => meta.push(format!("{n} sources")),
    }

    let mut block = format!("[{}] {}\n    {}\n", card.position, card.title, meta.join(" · "));
    if !card.summary.is_empty() {
        block.push_str(&format!("    {}\n", card.summary));
    }
    block
}

impl<W: Write> RenderTarget for TerminalRenderer<W> {
    fn render_cards(&mut self, cards: &[CardView]) {
        let text = cards.iter().map(card_block).join("\n");
        self.emit(&format!("{RULE}\n{text}{RULE}\n"));
    }

    fn render_placeholder(&mut self, title: &str, hint: &str) {
        self.emit(&format!("{RULE}\n  {title}\n  {hint}\n{RULE}\n"));
    }

    fn show_stats(&mut self, text: &str) {
        self.emit(&format!("{text}\n"));
    }

    fn show_error(&mut self, message: &str) {
        self.emit(&format!("error: {message}\n"));
    }

    fn show_message(&mut self, message: &str) {
        self.emit(&format!("{message}\n"));
    }

    fn set_load_more_visible(&mut self, visible: bool) {
        if self.load_more_visible && !visible {
            self.emit("(end of feed)\n");
        }
        self.load_more_visible = visible;
    }

    fn show_detail(&mut self, detail: &DetailView) {
        let mut text = format!("{RULE}\n{}\n{}\n", detail.title, detail.date);
        if !detail.tools.is_empty() {
            text.push_str(&format!("Found by: {}\n", detail.tools.join(", ")));
        }
        if !detail.topics.is_empty() {
            text.push_str(&format!("Topics: {}\n", detail.topics.join(", ")));
        }
        if !detail.groups.is_empty() {
            text.push_str(&format!("Groups: {}\n", detail.groups.join(", ")));
        }
        text.push_str(&format!("\n{}\n", detail.summary));
        if !detail.sources.is_empty() {
            text.push_str("\nSources\n");
            for (i, source) in detail.sources.iter().enumerate() {
                text.push_str(&format!("  Source {}: {}\n", i + 1, source));
            }
        }
        text.push_str(RULE);
        text.push('\n');
        self.emit(&text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(f: impl FnOnce(&mut TerminalRenderer<Vec<u8>>)) -> String {
        let mut renderer = TerminalRenderer::new(Vec::new());
        f(&mut renderer);
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_card_output() {
        let card = CardView {
            position: 2,
            title: "Parliament passes budget".into(),
            summary: "The vote was close.".into(),
            date: "March 14, 2025".into(),
            badges: vec!["tavily".into(), "Budget".into()],
            source_count: 1,
        };
        let text = rendered(|r| r.render_cards(&[card]));
        assert!(text.contains("[2] Parliament passes budget\n"));
        assert!(text.contains("    March 14, 2025 · tavily, Budget · 1 source\n"));
        assert!(text.contains("    The vote was close.\n"));
    }

    #[test]
    fn test_placeholder_output() {
        let text = rendered(|r| r.render_placeholder("No news items found", "Try again"));
        assert!(text.contains("  No news items found\n  Try again\n"));
    }

    #[test]
    fn test_end_of_feed_printed_once_on_transition() {
        let text = rendered(|r| {
            r.set_load_more_visible(false);
            r.set_load_more_visible(true);
            r.set_load_more_visible(false);
            r.set_load_more_visible(false);
        });
        assert_eq!(text.matches("(end of feed)").count(), 1);
    }

    #[test]
    fn test_detail_output() {
        let detail = DetailView {
            title: "Title".into(),
            date: "Date not available".into(),
            tools: vec!["arxiv".into()],
            topics: vec![],
            groups: vec!["Science".into()],
            summary: "Full summary.".into(),
            sources: vec!["https://a.test".into(), "https://b.test".into()],
        };
        let text = rendered(|r| r.show_detail(&detail));
        assert!(text.contains("Found by: arxiv\n"));
        assert!(!text.contains("Topics:"));
        assert!(text.contains("Groups: Science\n"));
        assert!(text.contains("  Source 2: https://b.test\n"));
    }
}
