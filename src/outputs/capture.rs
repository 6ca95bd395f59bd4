//! A render target that records instead of displaying.
//!
//! `list` loads every page into a [`CaptureTarget`] and renders the final
//! state once; tests use it to assert on what the pipeline produced.

use super::{CardView, DetailView, RenderTarget};

#[derive(Debug, Default, Clone)]
pub struct CaptureTarget {
    /// Cards from the latest `render_cards`, cleared by a placeholder.
    pub cards: Vec<CardView>,
    /// Placeholder title and hint, cleared by `render_cards`.
    pub placeholder: Option<(String, String)>,
    pub stats: Option<String>,
    pub errors: Vec<String>,
    pub messages: Vec<String>,
    pub load_more_visible: bool,
    pub detail: Option<DetailView>,
    /// Number of list renders, cards or placeholder.
    pub renders: usize,
}

impl CaptureTarget {
    /// Render the recorded list and status line onto another target.
    pub fn replay<R: RenderTarget + ?Sized>(&self, target: &mut R) {
        match &self.placeholder {
            Some((title, hint)) => target.render_placeholder(title, hint),
            None => target.render_cards(&self.cards),
        }
        if let Some(stats) = &self.stats {
            target.show_stats(stats);
        }
    }
}

impl RenderTarget for CaptureTarget {
    fn render_cards(&mut self, cards: &[CardView]) {
        self.cards = cards.to_vec();
        self.placeholder = None;
        self.renders += 1;
    }

    fn render_placeholder(&mut self, title: &str, hint: &str) {
        self.cards.clear();
        self.placeholder = Some((title.to_string(), hint.to_string()));
        self.renders += 1;
    }

    fn show_stats(&mut self, text: &str) {
        self.stats = Some(text.to_string());
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn set_load_more_visible(&mut self, visible: bool) {
        self.load_more_visible = visible;
    }

    fn show_detail(&mut self, detail: &DetailView) {
        self.detail = Some(detail.clone());
    }
}
