//! Extraction strategies: interchangeable ways of pulling candidate values
//! out of a [`Document`].
//!
//! A field is described by an ordered list of strategies. Adding, removing,
//! or reordering strategies never touches call sites.

use std::sync::LazyLock;

use regex::Regex;

use crate::cleanup::collapse_whitespace;
use crate::document::Document;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One way to query a document for a field value.
pub trait ExtractionStrategy: Send + Sync {
    /// Every candidate this strategy sees, best first.
    fn candidates(&self, doc: &Document) -> Vec<String>;

    /// First non-empty candidate, if any.
    fn try_extract(&self, doc: &Document) -> Option<String> {
        self.candidates(doc).into_iter().find(|c| !c.trim().is_empty())
    }

    /// Human-readable strategy name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// CSS selectors
// ---------------------------------------------------------------------------

/// Visible text of elements matching an ordered selector list.
pub struct SelectorStrategy {
    selectors: Vec<String>,
}

impl SelectorStrategy {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }
}

impl ExtractionStrategy for SelectorStrategy {
    fn candidates(&self, doc: &Document) -> Vec<String> {
        self.selectors
            .iter()
            .flat_map(|sel| doc.select_texts(sel))
            .collect()
    }

    fn name(&self) -> &str {
        "selector"
    }
}

// ---------------------------------------------------------------------------
// Metadata scan
// ---------------------------------------------------------------------------

/// Place names that mark a metadata fragment as a location even without a comma.
const PLACE_HINTS: &[&str] = &[
    "new york",
    "san francisco",
    "london",
    "tokyo",
    "beijing",
    "shanghai",
    "singapore",
    "berlin",
];

/// Scans small metadata fragments for location-shaped text: a comma-separated
/// place or a well-known city name.
pub struct MetadataStrategy {
    selectors: Vec<String>,
}

impl MetadataStrategy {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }
}

impl ExtractionStrategy for MetadataStrategy {
    fn candidates(&self, doc: &Document) -> Vec<String> {
        self.selectors
            .iter()
            .flat_map(|sel| doc.select_texts(sel))
            .filter(|text| {
                let lower = text.to_lowercase();
                text.contains(',') || PLACE_HINTS.iter().any(|hint| lower.contains(hint))
            })
            .collect()
    }

    fn name(&self) -> &str {
        "metadata"
    }
}

// ---------------------------------------------------------------------------
// Document title pattern
// ---------------------------------------------------------------------------

/// Reads `… in|at|near <place>` from the document title, ignoring any site
/// suffix after `|` or ` - `.
pub struct TitlePatternStrategy;

impl ExtractionStrategy for TitlePatternStrategy {
    fn candidates(&self, doc: &Document) -> Vec<String> {
        static MARKER_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"(?i)\b(?:in|at|near)\s+").expect("valid regex"));
        static PLACE_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^[\p{L}][\p{L}\s,.'-]*$").expect("valid regex"));

        let Some(title) = doc.title() else {
            return Vec::new();
        };

        let head = title
            .split('|')
            .next()
            .unwrap_or_default()
            .split(" - ")
            .next()
            .unwrap_or_default()
            .split(" – ")
            .next()
            .unwrap_or_default();

        let Some(last) = MARKER_RE.find_iter(head).last() else {
            return Vec::new();
        };

        let place = collapse_whitespace(&head[last.end()..]);
        let place = place.trim_end_matches([',', '.']).trim().to_string();
        if PLACE_RE.is_match(&place) {
            vec![place]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &str {
        "title-pattern"
    }
}

// ---------------------------------------------------------------------------
// Raw markup patterns
// ---------------------------------------------------------------------------

/// Longest value accepted from a raw markup match.
const MAX_MARKUP_VALUE_LEN: usize = 100;

/// Regex scan over the lowercased raw markup for `location`-like key/value pairs.
pub struct MarkupPatternStrategy;

impl ExtractionStrategy for MarkupPatternStrategy {
    fn candidates(&self, doc: &Document) -> Vec<String> {
        static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
            [
                r#"location"?:\s*"([^"]+)""#,
                r#"location"?>\s*([^<]+)<"#,
                r#"address"?>\s*([^<]+)<"#,
                r#"locality"?>\s*([^<]+)<"#,
            ]
            .into_iter()
            .map(|p| Regex::new(p).expect("valid regex"))
            .collect()
        });

        let raw = doc.raw_lower();
        PATTERNS
            .iter()
            .filter_map(|re| re.captures(raw))
            .filter_map(|caps| caps.get(1))
            .map(|m| collapse_whitespace(m.as_str()))
            .filter(|v| !v.is_empty() && v.len() < MAX_MARKUP_VALUE_LEN)
            .collect()
    }

    fn name(&self) -> &str {
        "markup-pattern"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_title(title: &str) -> Document {
        Document::parse(&format!("<html><head><title>{title}</title></head></html>"))
    }

    #[test]
    fn selector_strategy_keeps_selector_order() {
        let doc = Document::parse(r#"<h1>Heading</h1><div class="top">Top Title</div>"#);
        let strategy = SelectorStrategy::new([".top", "h1"]);
        assert_eq!(strategy.candidates(&doc), vec!["Top Title", "Heading"]);
        assert_eq!(strategy.try_extract(&doc).as_deref(), Some("Top Title"));
    }

    #[test]
    fn metadata_strategy_wants_place_shapes() {
        let doc = Document::parse(
            r#"<div class="meta"><span>Acme</span><span>3 days ago</span>
               <span>Austin, TX</span><span>London</span></div>"#,
        );
        let strategy = MetadataStrategy::new([".meta span"]);
        assert_eq!(strategy.candidates(&doc), vec!["Austin, TX", "London"]);
    }

    #[test]
    fn title_pattern_takes_last_marker() {
        let doc = doc_with_title("Cloud Engineer at Acme in Seattle, WA | LinkedIn");
        assert_eq!(TitlePatternStrategy.candidates(&doc), vec!["Seattle, WA"]);

        let doc = doc_with_title("Data Engineer job near Dublin - Careers");
        assert_eq!(TitlePatternStrategy.candidates(&doc), vec!["Dublin"]);
    }

    #[test]
    fn title_pattern_without_marker() {
        assert!(TitlePatternStrategy.candidates(&doc_with_title("Cloud Engineer")).is_empty());
        assert!(TitlePatternStrategy.candidates(&Document::parse("<p></p>")).is_empty());
        // Digits are not a place.
        assert!(TitlePatternStrategy
            .candidates(&doc_with_title("Starts in 2025"))
            .is_empty());
    }

    #[test]
    fn markup_patterns_scan_raw_html() {
        let doc = Document::parse(
            r#"<script type="application/ld+json">{"jobLocation": "Munich, Germany"}</script>"#,
        );
        // `"joblocation": "munich, germany"` matches the json-style pattern.
        assert_eq!(MarkupPatternStrategy.candidates(&doc), vec!["munich, germany"]);

        let doc = Document::parse(r#"<span class="addressLocality">Oslo</span>"#);
        assert_eq!(MarkupPatternStrategy.candidates(&doc), vec!["oslo"]);
    }

    #[test]
    fn markup_patterns_reject_long_values() {
        let long = "x".repeat(150);
        let doc = Document::parse(&format!(r#"<span class="location">{long}</span>"#));
        assert!(MarkupPatternStrategy.candidates(&doc).is_empty());
    }
}
