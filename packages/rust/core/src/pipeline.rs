//! Document → [`Record`]: fields, sections, description, classification.

use chrono::Utc;
use tracing::{debug, info};

use jobscout_classify::ClassificationEngine;
use jobscout_crawler::DocumentSnapshot;
use jobscout_extract::{ContentSectionizer, Document, FieldExtractor, assemble_description};
use jobscout_shared::{Identifier, Record};

/// Composes field extraction, sectionizing and classification.
///
/// [`build`](Self::build) never fails: a document nothing can be read from
/// still yields a record made of sentinel values.
pub struct ExtractionPipeline {
    fields: FieldExtractor,
    sectionizer: ContentSectionizer,
    classifier: ClassificationEngine,
}

impl ExtractionPipeline {
    pub fn new(
        fields: FieldExtractor,
        sectionizer: ContentSectionizer,
        classifier: ClassificationEngine,
    ) -> Self {
        Self {
            fields,
            sectionizer,
            classifier,
        }
    }

    /// Build the record for `id` from a fetched snapshot.
    pub fn build(&self, id: Identifier, snapshot: &DocumentSnapshot) -> Record {
        let doc = Document::parse(&snapshot.html).with_title(snapshot.title.clone());

        let fields = self.fields.extract_fields(&doc);
        let sections = self.sectionizer.sectionize(&doc);
        let description = assemble_description(&sections);
        let classifications = self.classifier.classify(&description);

        debug!(id = %id, sections = sections.len(), "document processed");

        let record = Record {
            id,
            url: snapshot.location.clone(),
            title: fields.title,
            organization: fields.organization,
            location: fields.location,
            country: fields.country,
            description,
            sections,
            classifications,
            fetched_at: Utc::now(),
        };

        info!(
            id = %record.id,
            title = %record.title,
            organization = %record.organization,
            matched = record.any_category_matched().len(),
            "record built"
        );

        record
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new(
            FieldExtractor::default(),
            ContentSectionizer::default(),
            ClassificationEngine::default(),
        )
    }
}
