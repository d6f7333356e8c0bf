//! Sentence-level classification over the rule table.

use std::collections::BTreeSet;

use tracing::debug;

use jobscout_shared::{CategoryLabel, Classifications};

use crate::rules::{ClassificationRule, GENERIC_CLOUD_TERM, PROVIDER_RULES};
use crate::text::{Sentence, split_sentences};

/// Classify `text` against `rules`, returning matched sentences per label.
///
/// Every sentence is tested against every rule; a sentence that matches no
/// rule but contains the generic cloud term lands under
/// [`CategoryLabel::GenericCloud`].
pub fn classify(text: &str, rules: &[ClassificationRule]) -> Classifications {
    let mut out = Classifications::new();

    for raw in split_sentences(text) {
        let sentence = Sentence::new(raw);
        for label in classify_sentence(&sentence, rules) {
            out.push(label, raw);
        }
    }

    debug!(matched = out.matched().len(), "classified text");
    out
}

/// Labels assigned to a single sentence.
///
/// Contextual matches count only when no rule matched on a primary term, so
/// an ambiguous service name never outvotes a provider the sentence names.
pub fn classify_sentence(
    sentence: &Sentence<'_>,
    rules: &[ClassificationRule],
) -> BTreeSet<CategoryLabel> {
    let mut labels: BTreeSet<CategoryLabel> = rules
        .iter()
        .filter(|rule| rule.matches_primary(sentence))
        .map(|rule| rule.label)
        .collect();

    if labels.is_empty() {
        labels = rules
            .iter()
            .filter(|rule| rule.matches_contextual(sentence))
            .map(|rule| rule.label)
            .collect();
    }

    if labels.is_empty() && sentence.contains_term(GENERIC_CLOUD_TERM) {
        labels.insert(CategoryLabel::GenericCloud);
    }
    labels
}

/// Owns a rule set; defaults to the built-in provider rules.
#[derive(Debug, Clone)]
pub struct ClassificationEngine {
    rules: Vec<ClassificationRule>,
}

impl ClassificationEngine {
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// Add a rule evaluated alongside the existing ones.
    pub fn with_rule(mut self, rule: ClassificationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn classify(&self, text: &str) -> Classifications {
        classify(text, &self.rules)
    }
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new(PROVIDER_RULES.to_vec())
    }
}
