//! Field extraction and description sectionizing for item documents.
//!
//! This crate provides:
//! - [`Document`]: parsed HTML plus title and raw markup
//! - [`ExtractionStrategy`]: pluggable candidate sources (selectors, metadata, title, markup)
//! - [`FieldExtractor`]: cascading title/organization/location extraction with sentinels
//! - [`ContentSectionizer`]: general/responsibilities/requirements segmentation with dedup
//! - [`cleanup`]: whitespace, bullet, and paragraph dedup passes

pub mod cleanup;
pub mod document;
pub mod fields;
pub mod sections;
pub mod strategy;

pub use cleanup::{collapse_whitespace, dedup_paragraphs, normalize_paragraph};
pub use document::Document;
pub use fields::{
    ExtractedFields, Field, FieldExtractor, FieldSpec, LocationFilter, derive_country, extract,
    extract_with, is_plausible,
};
pub use sections::{
    ContentNode, ContentSectionizer, UNKNOWN_DESCRIPTION, assemble_description, sectionize_lines,
    sectionize_nodes,
};
pub use strategy::{
    ExtractionStrategy, MarkupPatternStrategy, MetadataStrategy, SelectorStrategy,
    TitlePatternStrategy,
};

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_shared::SectionLabel;

    fn load_fixture(name: &str) -> Document {
        let path = format!("../../../fixtures/html/{name}");
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing fixture: {path}"));
        Document::parse(&content)
    }

    // -----------------------------------------------------------------------
    // Field extraction
    // -----------------------------------------------------------------------

    #[test]
    fn structured_posting_fields() {
        let doc = load_fixture("job_posting.html");
        let fields = FieldExtractor::default().extract_fields(&doc);

        assert_eq!(fields.title, "Senior Cloud Platform Engineer");
        assert_eq!(fields.organization, "Northwind Traders");
        // The first bullet repeats the organization and is skipped.
        assert_eq!(fields.location, "Seattle, WA, United States");
        assert_eq!(fields.country, "United States");
    }

    #[test]
    fn sparse_posting_falls_back_to_title_pattern() {
        let doc = load_fixture("job_posting_sparse.html");
        let fields = FieldExtractor::default().extract_fields(&doc);

        assert_eq!(fields.title, "Cloud Engineer");
        assert_eq!(fields.organization, "Unknown Company");
        assert_eq!(fields.location, "Dublin, Ireland");
        assert_eq!(fields.country, "Ireland");
    }

    #[test]
    fn unresolvable_document_gets_sentinels() {
        let doc = load_fixture("unresolvable.html");
        let fields = FieldExtractor::default().extract_fields(&doc);

        assert_eq!(fields.title, "Unknown Title");
        assert_eq!(fields.organization, "Unknown Company");
        assert_eq!(fields.location, "Unknown Location");
        assert_eq!(fields.country, "Unknown");
    }

    // -----------------------------------------------------------------------
    // Sectionizing
    // -----------------------------------------------------------------------

    #[test]
    fn structured_posting_sections() {
        let doc = load_fixture("job_posting.html");
        let sections = ContentSectionizer::default().sectionize(&doc);

        assert_eq!(
            sections[&SectionLabel::General],
            vec![
                "Northwind Traders is modernising its logistics platform.",
                "We run a multi-cloud estate and are growing the platform team.",
                "Benefits",
                "Hybrid work and a generous learning budget.",
            ]
        );
        assert_eq!(
            sections[&SectionLabel::Responsibilities],
            vec![
                "## What you'll do",
                "• Design AWS landing zones with Terraform",
                "• Operate AKS clusters alongside our Microsoft Kubernetes tooling",
            ]
        );
        assert_eq!(sections[&SectionLabel::Requirements][0], "## Qualifications");
        assert_eq!(sections[&SectionLabel::Requirements].len(), 4);

        let description = assemble_description(&sections);
        assert!(description.contains("--- RESPONSIBILITIES ---"));
        assert!(description.contains("--- REQUIREMENTS ---"));
        assert!(!description.to_lowercase().contains("see more"));
        assert_eq!(
            description
                .matches("Northwind Traders is modernising its logistics platform.")
                .count(),
            1
        );
    }

    #[test]
    fn plain_text_container_sections() {
        let doc = load_fixture("job_posting_sparse.html");
        let sections = ContentSectionizer::default().sectionize(&doc);

        assert!(sections[&SectionLabel::General].is_empty());
        assert_eq!(
            sections[&SectionLabel::Responsibilities],
            vec!["## Responsibilities", "Keep our cloud bills under control"]
        );
        assert_eq!(
            sections[&SectionLabel::Requirements],
            vec!["## Requirements", "Alibaba Cloud MaxCompute or 阿里云 experience"]
        );
    }

    #[test]
    fn unresolvable_document_has_unknown_description() {
        let doc = load_fixture("unresolvable.html");
        let sections = ContentSectionizer::default().sectionize(&doc);
        assert_eq!(assemble_description(&sections), UNKNOWN_DESCRIPTION);
    }
}
