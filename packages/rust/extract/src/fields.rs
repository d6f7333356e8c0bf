//! Cascading field extraction with sentinel fallbacks.
//!
//! Each field is a [`FieldSpec`]: an ordered strategy list. The first
//! strategy producing an acceptable candidate wins; if none does, the field
//! gets its fixed sentinel. Extraction never fails.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use jobscout_shared::UNKNOWN_COUNTRY;

use crate::cleanup::{collapse_whitespace, is_boilerplate};
use crate::document::Document;
use crate::strategy::{
    ExtractionStrategy, MarkupPatternStrategy, MetadataStrategy, SelectorStrategy,
    TitlePatternStrategy,
};

/// Employment-type labels that show up next to locations but are not places.
const NON_LOCATION_TERMS: &[&str] = &[
    "full-time",
    "part-time",
    "contract",
    "temporary",
    "internship",
    "remote",
];

// ---------------------------------------------------------------------------
// Field + FieldSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Organization,
    Location,
}

impl Field {
    /// Placeholder used when every strategy misses.
    pub fn sentinel(self) -> &'static str {
        match self {
            Self::Title => "Unknown Title",
            Self::Organization => "Unknown Company",
            Self::Location => "Unknown Location",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Organization => "organization",
            Self::Location => "location",
        }
    }
}

/// Ordered extraction strategies for one field.
pub struct FieldSpec {
    field: Field,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl FieldSpec {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    /// Append a strategy (tried after those already present).
    pub fn with(mut self, strategy: impl ExtractionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn strategies(&self) -> &[Box<dyn ExtractionStrategy>] {
        &self.strategies
    }

    /// Posting title: top-card heading selectors.
    pub fn title() -> Self {
        Self::new(Field::Title).with(SelectorStrategy::new([
            ".jobs-unified-top-card__job-title",
            ".job-details-jobs-unified-top-card__job-title",
            "h1",
            ".topcard__title",
        ]))
    }

    /// Hiring organization: top-card company selectors.
    pub fn organization() -> Self {
        Self::new(Field::Organization).with(SelectorStrategy::new([
            ".jobs-unified-top-card__company-name",
            ".job-details-jobs-unified-top-card__company-name",
            ".topcard__org-name-link",
        ]))
    }

    /// Location: structural selectors, then metadata scan, then the document
    /// title, then raw markup.
    pub fn location() -> Self {
        Self::new(Field::Location)
            .with(SelectorStrategy::new([
                ".jobs-unified-top-card__bullet",
                ".job-details-jobs-unified-top-card__bullet",
                ".topcard__flavor--bullet",
                ".jobs-unified-top-card__workplace-type",
                ".jobs-unified-top-card__subtitle-primary [class*='location']",
                ".jobs-unified-top-card__company-name + span",
                ".job-details-jobs-unified-top-card__primary-description-container .job-details-jobs-unified-top-card__primary-description-without-tagline",
                ".jobs-unified-top-card__subtitle-primary",
                ".jobs-unified-top-card__metadata",
                ".job-details-jobs-unified-top-card__subtitle",
                ".job-details-jobs-unified-top-card__primary-description",
            ]))
            .with(MetadataStrategy::new([
                ".jobs-unified-top-card__subtitle-primary span",
                ".jobs-unified-top-card__metadata span",
                ".job-details-jobs-unified-top-card__subtitle span",
            ]))
            .with(TitlePatternStrategy)
            .with(MarkupPatternStrategy)
    }
}

// ---------------------------------------------------------------------------
// Acceptance rules
// ---------------------------------------------------------------------------

/// Whether a candidate is a real value rather than an empty or placeholder one.
pub fn is_plausible(candidate: &str, field: Field) -> bool {
    let value = candidate.trim();
    !value.is_empty()
        && !value.eq_ignore_ascii_case(field.sentinel())
        && !is_boilerplate(value)
}

/// Location-specific disambiguation, relative to the extracted organization.
pub struct LocationFilter<'a> {
    organization: &'a str,
}

impl<'a> LocationFilter<'a> {
    pub fn new(organization: &'a str) -> Self {
        Self { organization }
    }

    pub fn accepts(&self, candidate: &str) -> bool {
        static AGO_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"(?i)\bago\b").expect("valid regex"));

        let value = candidate.trim();
        if !is_plausible(value, Field::Location) {
            return false;
        }
        if value.eq_ignore_ascii_case(self.organization.trim()) {
            return false;
        }
        if AGO_RE.is_match(value) {
            return false;
        }
        if value.chars().all(|c| c.is_ascii_digit() || c.is_whitespace()) {
            return false;
        }
        let lower = value.to_lowercase();
        !NON_LOCATION_TERMS.iter().any(|term| lower.contains(term))
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Run `spec`'s strategies in order and return the first accepted candidate,
/// or the field sentinel.
pub fn extract_with(doc: &Document, spec: &FieldSpec, accept: impl Fn(&str) -> bool) -> String {
    let field = spec.field();
    spec.strategies()
        .iter()
        .find_map(|strategy| {
            let hit = strategy
                .candidates(doc)
                .into_iter()
                .map(|c| collapse_whitespace(&c))
                .find(|c| accept(c));
            match &hit {
                Some(value) => debug!(field = field.name(), strategy = strategy.name(), %value, "field extracted"),
                None => debug!(field = field.name(), strategy = strategy.name(), "strategy missed"),
            }
            hit
        })
        .unwrap_or_else(|| field.sentinel().to_string())
}

/// Extract a field with the generic plausibility check.
pub fn extract(doc: &Document, spec: &FieldSpec) -> String {
    extract_with(doc, spec, |c| is_plausible(c, spec.field()))
}

/// Trailing comma-separated segment of a location, or `Unknown`.
pub fn derive_country(location: &str) -> String {
    match location.rsplit_once(',') {
        Some((_, tail)) if !tail.trim().is_empty() => tail.trim().to_string(),
        _ => UNKNOWN_COUNTRY.to_string(),
    }
}

/// Extracted top-card fields for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: String,
    pub organization: String,
    pub location: String,
    pub country: String,
}

/// Holds the field specs used for every document.
pub struct FieldExtractor {
    title: FieldSpec,
    organization: FieldSpec,
    location: FieldSpec,
}

impl FieldExtractor {
    pub fn new(title: FieldSpec, organization: FieldSpec, location: FieldSpec) -> Self {
        Self {
            title,
            organization,
            location,
        }
    }

    /// Title, organization, location (filtered against the organization), country.
    pub fn extract_fields(&self, doc: &Document) -> ExtractedFields {
        let title = extract(doc, &self.title);
        let organization = extract(doc, &self.organization);
        let filter = LocationFilter::new(&organization);
        let location = extract_with(doc, &self.location, |c| filter.accepts(c));
        let country = derive_country(&location);

        ExtractedFields {
            title,
            organization,
            location,
            country,
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(FieldSpec::title(), FieldSpec::organization(), FieldSpec::location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_strategy_with_a_value_wins() {
        let doc = Document::parse(
            r#"<h1>Fallback Heading</h1>
               <div class="jobs-unified-top-card__job-title">Cloud Engineer</div>"#,
        );
        assert_eq!(extract(&doc, &FieldSpec::title()), "Cloud Engineer");
    }

    #[test]
    fn misses_fall_back_to_sentinel() {
        let doc = Document::parse("<html><body><p>nothing here</p></body></html>");
        assert_eq!(extract(&doc, &FieldSpec::title()), "Unknown Title");
        assert_eq!(extract(&doc, &FieldSpec::organization()), "Unknown Company");
    }

    #[test]
    fn location_filter_rules() {
        let filter = LocationFilter::new("Acme Corp");
        assert!(filter.accepts("Seattle, WA"));
        assert!(filter.accepts("Chicago, IL"));
        assert!(!filter.accepts("acme corp"));
        assert!(!filter.accepts("2 weeks ago"));
        assert!(!filter.accepts("1234"));
        assert!(!filter.accepts("Full-time"));
        assert!(!filter.accepts("Remote"));
        assert!(!filter.accepts(""));
        assert!(!filter.accepts("Unknown Location"));
    }

    #[test]
    fn location_cascade_skips_rejected_candidates() {
        let doc = Document::parse(
            r#"<html><head><title>Engineer at Acme in Lisbon, Portugal | LinkedIn</title></head><body>
               <div class="jobs-unified-top-card__company-name">Acme</div>
               <span class="jobs-unified-top-card__bullet">Acme</span>
               <span class="jobs-unified-top-card__workplace-type">Remote</span>
               </body></html>"#,
        );
        let fields = FieldExtractor::default().extract_fields(&doc);
        assert_eq!(fields.organization, "Acme");
        assert_eq!(fields.location, "Lisbon, Portugal");
        assert_eq!(fields.country, "Portugal");
    }

    #[test]
    fn country_is_trailing_segment() {
        assert_eq!(derive_country("Austin, Texas, United States"), "United States");
        assert_eq!(derive_country("Berlin"), "Unknown");
        assert_eq!(derive_country("Nowhere,  "), "Unknown");
        assert_eq!(derive_country("Unknown Location"), "Unknown");
    }

    #[test]
    fn custom_spec_order_is_respected() {
        let doc = Document::parse(r#"<b class="a">First</b><i class="b">Second</i>"#);
        let spec = FieldSpec::new(Field::Title)
            .with(SelectorStrategy::new([".b"]))
            .with(SelectorStrategy::new([".a"]));
        assert_eq!(extract(&doc, &spec), "Second");
    }
}
