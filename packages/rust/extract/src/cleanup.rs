//! Text cleanup passes shared by the field extractor and the sectionizer.
//!
//! Each pass is a small `&str -> String` (or predicate) function so it can be
//! tested on its own and applied in sequence.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Boilerplate left behind by collapsed "expand" widgets.
pub const BOILERPLATE: &str = "see more";

/// Bullet marker used when rendering list content.
pub const BULLET: &str = "•";

// ---------------------------------------------------------------------------
// Pass 1: Whitespace
// ---------------------------------------------------------------------------

/// Collapse all whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comparison key for paragraph dedup: collapsed whitespace, lowercase.
pub fn normalize_paragraph(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

// ---------------------------------------------------------------------------
// Pass 2: Bullets
// ---------------------------------------------------------------------------

/// Strip a leading bullet marker (`•`, `-`, `*`, `·`) if present.
pub fn strip_bullet_marker(text: &str) -> &str {
    static MARKER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*(?:[•·*\-–]\s*)+").expect("valid regex"));

    match MARKER_RE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Whether a line reads as a bullet even outside a list element.
pub fn looks_like_bullet(text: &str) -> bool {
    let t = text.trim_start();
    t.starts_with(BULLET) || t.starts_with("- ") || t.starts_with("* ") || t.starts_with('·')
}

/// Render one bullet line: `• text`.
pub fn render_bullet(text: &str) -> String {
    format!("{BULLET} {}", collapse_whitespace(strip_bullet_marker(text)))
}

// ---------------------------------------------------------------------------
// Pass 3: Boilerplate and dedup
// ---------------------------------------------------------------------------

/// Whether a paragraph is the "see more" sentinel (with or without bullet).
pub fn is_boilerplate(text: &str) -> bool {
    normalize_paragraph(strip_bullet_marker(text)) == BOILERPLATE
}

/// Drop empty, boilerplate, and repeated paragraphs, keeping the first
/// occurrence of each in its original position.
pub fn dedup_paragraphs<I, S>(paragraphs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for paragraph in paragraphs {
        let paragraph = paragraph.as_ref().trim();
        if paragraph.is_empty() || is_boilerplate(paragraph) {
            continue;
        }
        if seen.insert(normalize_paragraph(paragraph)) {
            out.push(paragraph.to_string());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(normalize_paragraph("Build   THINGS\n"), "build things");
    }

    #[test]
    fn bullet_rendering() {
        assert_eq!(strip_bullet_marker("• - Ship it"), "Ship it");
        assert_eq!(strip_bullet_marker("No marker"), "No marker");
        assert_eq!(render_bullet("-  Own   the pipeline"), "• Own the pipeline");
        assert!(looks_like_bullet("• item"));
        assert!(looks_like_bullet("- item"));
        assert!(!looks_like_bullet("-5 degrees"));
    }

    #[test]
    fn boilerplate_detection() {
        assert!(is_boilerplate("See more"));
        assert!(is_boilerplate("  • see   MORE "));
        assert!(!is_boilerplate("See more details below"));
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let out = dedup_paragraphs([
            "Build things",
            "",
            "Ship code",
            "build   things",
            "See more",
            "Ship code",
        ]);
        assert_eq!(out, vec!["Build things", "Ship code"]);
    }
}
