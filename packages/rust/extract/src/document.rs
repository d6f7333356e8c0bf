//! Parsed document wrapper used by every extraction strategy.

use scraper::node::{Element, Node};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::cleanup::collapse_whitespace;

/// A parsed item document.
///
/// Holds the DOM plus the pieces strategies need besides it: the page title
/// and the lowercased raw markup for pattern scans.
pub struct Document {
    html: Html,
    title: Option<String>,
    raw_lower: String,
}

impl Document {
    /// Parse raw HTML. The title is read from `<title>`.
    pub fn parse(raw: &str) -> Self {
        let html = Html::parse_document(raw);
        let title = Selector::parse("title").ok().and_then(|sel| {
            html.select(&sel)
                .next()
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                .filter(|t| !t.is_empty())
        });
        Self {
            html,
            title,
            raw_lower: raw.to_lowercase(),
        }
    }

    /// Override the title (e.g. with the one reported by the page source).
    pub fn with_title(mut self, title: Option<String>) -> Self {
        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            self.title = Some(title);
        }
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn raw_lower(&self) -> &str {
        &self.raw_lower
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Visible text of every element matching `selector`, in document order.
    /// Empty texts are dropped. An invalid selector matches nothing.
    pub fn select_texts(&self, selector: &str) -> Vec<String> {
        let Ok(sel) = Selector::parse(selector) else {
            debug!(%selector, "invalid selector");
            return Vec::new();
        };
        self.html
            .select(&sel)
            .filter(|el| !is_hidden_within(*el, None))
            .map(visible_text)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// First element matching any selector, tried in order.
    pub fn first_match<'a>(&'a self, selectors: &[&str]) -> Option<ElementRef<'a>> {
        selectors.iter().find_map(|selector| {
            let sel = Selector::parse(selector).ok()?;
            self.html.select(&sel).next()
        })
    }
}

// ---------------------------------------------------------------------------
// Visibility helpers
// ---------------------------------------------------------------------------

/// Whether an element suppresses its own subtree from extracted text.
pub(crate) fn hides(el: &Element) -> bool {
    if matches!(
        el.name(),
        "script" | "style" | "noscript" | "template" | "button" | "svg"
    ) {
        return true;
    }
    if el.attr("hidden").is_some() || el.attr("aria-hidden") == Some("true") {
        return true;
    }
    el.attr("style").is_some_and(|style| {
        style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
            .contains("display:none")
    })
}

/// Whether `el` or any ancestor (stopping at `root`, exclusive) hides it.
pub(crate) fn is_hidden_within(el: ElementRef<'_>, root: Option<ElementRef<'_>>) -> bool {
    if hides(el.value()) {
        return true;
    }
    for ancestor in el.ancestors() {
        if root.is_some_and(|r| r.id() == ancestor.id()) {
            break;
        }
        if let Node::Element(e) = ancestor.value() {
            if hides(e) {
                return true;
            }
        }
    }
    false
}

/// Text of an element's subtree, skipping hidden descendants, whitespace-collapsed.
pub(crate) fn visible_text(el: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in el.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|a| a.id() != el.id())
            .any(|a| matches!(a.value(), Node::Element(e) if hides(e)));
        if !hidden {
            parts.push(text);
        }
    }
    collapse_whitespace(&parts.join(" "))
}
