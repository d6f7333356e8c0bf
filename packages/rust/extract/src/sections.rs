//! Content sectionizer: splits a description into general text plus labeled
//! responsibilities/requirements sections.
//!
//! Headings are recognized from a static vocabulary table. Section state is a
//! simple cursor that starts at `general` and moves whenever a heading matches.

use std::collections::BTreeMap;

use scraper::ElementRef;
use scraper::node::Node;
use tracing::debug;

use jobscout_shared::{SectionLabel, Sections};

use crate::cleanup::{
    collapse_whitespace, dedup_paragraphs, is_boilerplate, looks_like_bullet, render_bullet,
};
use crate::document::{Document, hides, is_hidden_within, visible_text};

/// Description used when a document yields no text at all.
pub const UNKNOWN_DESCRIPTION: &str = "Unknown Description";

/// Elements treated as content nodes inside the description container.
const CONTENT_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "strong", "b",
];

/// Non-heading nodes longer than this are never read as headings.
const MAX_HEADING_WORDS: usize = 8;

// ---------------------------------------------------------------------------
// Heading vocabulary
// ---------------------------------------------------------------------------

/// How a matched heading is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadingEmit {
    /// Emitted as `## heading` into the new section.
    Marked,
    /// Emitted as an ordinary line.
    Plain,
}

struct HeadingVocab {
    section: SectionLabel,
    emit: HeadingEmit,
    keywords: &'static [&'static str],
}

/// Checked in order; the first vocabulary with a matching keyword wins.
static HEADING_VOCAB: &[HeadingVocab] = &[
    HeadingVocab {
        section: SectionLabel::Responsibilities,
        emit: HeadingEmit::Marked,
        keywords: &[
            "responsibilities",
            "duties",
            "what you'll do",
            "what you will do",
            "job description",
            "role description",
        ],
    },
    HeadingVocab {
        section: SectionLabel::Requirements,
        emit: HeadingEmit::Marked,
        keywords: &[
            "requirements",
            "qualifications",
            "what you need",
            "skills",
            "experience required",
        ],
    },
    HeadingVocab {
        section: SectionLabel::General,
        emit: HeadingEmit::Plain,
        keywords: &[
            "about the company",
            "about us",
            "benefits",
            "perks",
            "why join",
            "compensation",
        ],
    },
];

fn match_heading(text: &str) -> Option<&'static HeadingVocab> {
    let lower = text.to_lowercase().replace('\u{2019}', "'");
    HEADING_VOCAB
        .iter()
        .find(|vocab| vocab.keywords.iter().any(|k| lower.contains(k)))
}

// ---------------------------------------------------------------------------
// Content nodes
// ---------------------------------------------------------------------------

/// One block of description text in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentNode {
    /// Lowercase tag name (`p`, `li`, `h3`, …; `text` for bare text lines).
    pub tag: String,
    pub text: String,
    /// Inside a `ul`/`ol`.
    pub in_list: bool,
}

impl ContentNode {
    /// A bare text line with no structural hints.
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            tag: "text".into(),
            text: text.into(),
            in_list: false,
        }
    }

    fn is_bullet(&self) -> bool {
        self.tag == "li" || self.in_list || looks_like_bullet(&self.text)
    }

    fn is_heading_like(&self) -> bool {
        match self.tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "strong" | "b" => true,
            _ if self.is_bullet() => false,
            _ => self.text.split_whitespace().count() <= MAX_HEADING_WORDS,
        }
    }
}

// ---------------------------------------------------------------------------
// Sectionizer
// ---------------------------------------------------------------------------

/// Finds the description container and sectionizes its content.
pub struct ContentSectionizer {
    container_selectors: Vec<String>,
}

impl ContentSectionizer {
    pub fn new<I, S>(container_selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            container_selectors: container_selectors.into_iter().map(Into::into).collect(),
        }
    }

    /// Sectionize the description of `doc`.
    pub fn sectionize(&self, doc: &Document) -> Sections {
        sectionize_nodes(&self.content_nodes(doc))
    }

    /// Outermost visible content nodes of the first matching container. Falls
    /// back to the container's visible text lines when it has no structured
    /// nodes; empty when no container matches.
    pub fn content_nodes(&self, doc: &Document) -> Vec<ContentNode> {
        let selectors: Vec<&str> = self.container_selectors.iter().map(String::as_str).collect();
        let Some(container) = doc.first_match(&selectors) else {
            debug!("no description container found");
            return Vec::new();
        };

        let mut nodes = Vec::new();
        for node in container.descendants().skip(1) {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };
            let tag = el.value().name();
            if !CONTENT_TAGS.contains(&tag) || is_hidden_within(el, Some(container)) {
                continue;
            }
            if has_content_ancestor(el, container) {
                continue;
            }
            let text = visible_text(el);
            if text.is_empty() || is_boilerplate(&text) {
                continue;
            }
            nodes.push(ContentNode {
                tag: tag.to_string(),
                text,
                in_list: in_list(el, container),
            });
        }

        if nodes.is_empty() {
            nodes = text_lines(container).into_iter().map(ContentNode::line).collect();
            debug!(lines = nodes.len(), "container has no structured nodes, using text lines");
        }
        nodes
    }
}

impl Default for ContentSectionizer {
    fn default() -> Self {
        Self::new([
            ".jobs-description",
            ".jobs-description__content",
            ".jobs-box__html-content",
            ".jobs-description-content",
            "#job-details",
            ".description__text",
            "[data-test-id='job-details']",
            ".jobs-unified-description__content",
            ".jobs-details__main-content",
        ])
    }
}

fn ancestors_within<'a>(
    el: ElementRef<'a>,
    root: ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> {
    el.ancestors()
        .take_while(move |a| a.id() != root.id())
        .filter_map(ElementRef::wrap)
}

fn has_content_ancestor(el: ElementRef<'_>, root: ElementRef<'_>) -> bool {
    ancestors_within(el, root).any(|a| CONTENT_TAGS.contains(&a.value().name()))
}

fn in_list(el: ElementRef<'_>, root: ElementRef<'_>) -> bool {
    ancestors_within(el, root).any(|a| matches!(a.value().name(), "ul" | "ol"))
}

/// Visible text nodes of `root`, split into trimmed non-empty lines.
fn text_lines(root: ElementRef<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|a| a.id() != root.id())
            .any(|a| matches!(a.value(), Node::Element(e) if hides(e)));
        if hidden {
            continue;
        }
        lines.extend(
            text.lines()
                .map(collapse_whitespace)
                .filter(|l| !l.is_empty() && !is_boilerplate(l)),
        );
    }
    lines
}

/// Walk content nodes in order, routing each into the current section.
///
/// Responsibilities and requirements headings are emitted as `## heading`
/// into their section; neutral headings move back to `general` and stay as
/// ordinary lines. Every section is deduplicated at paragraph granularity.
/// All three labels are always present in the result.
pub fn sectionize_nodes(nodes: &[ContentNode]) -> Sections {
    let mut raw: BTreeMap<SectionLabel, Vec<String>> = SectionLabel::ALL
        .into_iter()
        .map(|label| (label, Vec::new()))
        .collect();
    let mut current = SectionLabel::General;

    for node in nodes {
        let text = collapse_whitespace(&node.text);
        if text.is_empty() || is_boilerplate(&text) {
            continue;
        }

        if node.is_heading_like() {
            if let Some(vocab) = match_heading(&text) {
                current = vocab.section;
                if vocab.emit == HeadingEmit::Marked {
                    raw.entry(current).or_default().push(format!("## {text}"));
                    continue;
                }
            }
        }

        let line = if node.is_bullet() {
            render_bullet(&text)
        } else {
            text
        };
        raw.entry(current).or_default().push(line);
    }

    raw.into_iter()
        .map(|(label, lines)| (label, dedup_paragraphs(lines)))
        .collect()
}

/// Sectionize plain text lines (no structural hints).
pub fn sectionize_lines<S: AsRef<str>>(lines: &[S]) -> Sections {
    let nodes: Vec<ContentNode> = lines
        .iter()
        .map(|l| ContentNode::line(l.as_ref()))
        .collect();
    sectionize_nodes(&nodes)
}

/// Join sections into one description: general paragraphs, then each
/// non-empty labeled section behind its separator. Repeated paragraphs across
/// sections are dropped; an empty result is [`UNKNOWN_DESCRIPTION`].
pub fn assemble_description(sections: &Sections) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for label in SectionLabel::ALL {
        let Some(lines) = sections.get(&label).filter(|l| !l.is_empty()) else {
            continue;
        };
        if let Some(separator) = label.separator() {
            if !parts.is_empty() {
                parts.push(separator);
            }
        }
        parts.extend(lines.iter().map(String::as_str));
    }

    let paragraphs = dedup_paragraphs(parts);
    if paragraphs.is_empty() {
        UNKNOWN_DESCRIPTION.to_string()
    } else {
        paragraphs.join("\n\n")
    }
}
