//! Utility functions for word truncation, date formatting and logging.
//!
//! This module provides helper functions used throughout the application:
//! - Word counting and truncation for compact card text
//! - Human-readable publication dates
//! - String truncation for log previews
//! - Capitalization for tab labels

use chrono::NaiveDateTime;

/// Marker appended to text that was cut short.
pub const ELLIPSIS: &str = "...";

/// Shown in place of a missing publication date.
pub const DATE_UNAVAILABLE: &str = "Date not available";

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Keep the first `max` words of `text`.
///
/// Returns the text unchanged when it already fits. Otherwise the kept words
/// are rejoined with single spaces and [`ELLIPSIS`] is appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_words("one two three", 2), "one two...");
/// assert_eq!(truncate_words("one two", 2), "one two");
/// ```
pub fn truncate_words(text: &str, max: usize) -> String {
    if word_count(text) <= max {
        return text.to_string();
    }
    let kept = text.split_whitespace().take(max).collect::<Vec<_>>().join(" ");
    format!("{kept}{ELLIPSIS}")
}

/// Format a publication date the way cards show it, e.g. "May 6, 2025".
pub fn format_published_date(date: Option<&NaiveDateTime>) -> String {
    match date {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => DATE_UNAVAILABLE.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Capitalize the first character of a string.
///
/// Used for tab labels (e.g., "politics" -> "Politics").
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}
