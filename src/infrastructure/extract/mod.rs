//! Markup extraction
//!
//! Pure functions from raw HTML to a normalized `(title, content)` pair,
//! driven by per-source [`ExtractionRules`]. No network or persistence
//! side effects, so each rule set is independently unit-testable.

use scraper::{ElementRef, Html, Selector};

use crate::domain::source::ExtractionRules;
use crate::domain::text;

/// Title used when no heading or page title is present.
pub const UNTITLED: &str = "Untitled Document";

/// Content used when no content region matches.
pub const NO_CONTENT: &str = "No content available";

/// A normalized documentation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub title: String,
    pub content: String,
}

/// Extracts a title and normalized content from raw markup.
///
/// Deterministic for identical input: falls back through
/// first `h1` → page `<title>` (suffix stripped) → [`UNTITLED`] for the
/// title, and to [`NO_CONTENT`] when no content selector matches.
pub fn extract_document(html: &str, rules: &ExtractionRules) -> ExtractedDocument {
    let document = Html::parse_document(html);

    ExtractedDocument {
        title: extract_title(&document, rules),
        content: extract_content(&document, rules),
    }
}

fn extract_title(document: &Html, rules: &ExtractionRules) -> String {
    if let Ok(selector) = Selector::parse("h1") {
        if let Some(heading) = document.select(&selector).next() {
            let title = text::sanitize(&heading.text().collect::<String>());
            if !title.is_empty() {
                return title;
            }
        }
    }

    if let Ok(selector) = Selector::parse("title") {
        if let Some(title_el) = document.select(&selector).next() {
            let mut title = text::sanitize(&title_el.text().collect::<String>());
            if let Some(suffix) = rules.title_suffix {
                title = title.trim_end_matches(suffix).trim().to_string();
            }
            if !title.is_empty() {
                return title;
            }
        }
    }

    UNTITLED.to_string()
}

fn extract_content(document: &Html, rules: &ExtractionRules) -> String {
    for selector_str in rules.content_selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };

        for region in document.select(&selector) {
            let mut raw = String::new();
            collect_text(&region, rules, &mut raw);

            let content = text::sanitize(&raw);
            if !content.is_empty() {
                return content;
            }
        }
    }

    NO_CONTENT.to_string()
}

/// Appends the visible text of `element`, skipping stripped subtrees.
fn collect_text(element: &ElementRef, rules: &ExtractionRules, out: &mut String) {
    for node in element.children() {
        if let Some(child) = ElementRef::wrap(node) {
            if should_strip(&child, rules) {
                continue;
            }
            collect_text(&child, rules, out);
        } else if let Some(txt) = node.value().as_text() {
            out.push_str(txt);
            out.push(' ');
        }
    }
}

fn should_strip(element: &ElementRef, rules: &ExtractionRules) -> bool {
    let name = element.value().name();

    // Never extractable, regardless of source rules.
    if matches!(name, "script" | "style" | "noscript") {
        return true;
    }

    rules.strip_selectors.iter().any(|selector| {
        match selector.strip_prefix('.') {
            Some(class) => element.value().classes().any(|c| c == class),
            None => name == *selector,
        }
    })
}
