//! Core domain types for jobscout collection runs.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Country value used when a location carries no comma-separated country.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Synthetic cursor into the virtual listing ("go to the Nth item").
pub type Position = u64;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for collection run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// Opaque token naming one collectible item. Immutable once captured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap a raw token. Surrounding whitespace is trimmed; empty tokens are rejected.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Parse a comma-separated manual identifier list, skipping blanks.
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split(',').filter_map(Self::new).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Classification bucket for sentences matching provider vocabulary.
///
/// Declaration order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryLabel {
    /// Amazon Web Services.
    #[serde(rename = "aws")]
    CloudProviderA,
    /// Microsoft Azure.
    #[serde(rename = "azure")]
    CloudProviderB,
    /// Google Cloud.
    #[serde(rename = "gcp")]
    CloudProviderC,
    /// Alibaba Cloud.
    #[serde(rename = "alibaba")]
    CloudProviderD,
    /// Oracle Cloud.
    #[serde(rename = "oracle")]
    CloudProviderE,
    /// "cloud" mentioned without any specific provider.
    #[serde(rename = "cloud")]
    GenericCloud,
}

impl CategoryLabel {
    pub const ALL: [CategoryLabel; 6] = [
        CategoryLabel::CloudProviderA,
        CategoryLabel::CloudProviderB,
        CategoryLabel::CloudProviderC,
        CategoryLabel::CloudProviderD,
        CategoryLabel::CloudProviderE,
        CategoryLabel::GenericCloud,
    ];

    /// Short machine key, also used as the export column suffix.
    pub fn key(self) -> &'static str {
        match self {
            Self::CloudProviderA => "aws",
            Self::CloudProviderB => "azure",
            Self::CloudProviderC => "gcp",
            Self::CloudProviderD => "alibaba",
            Self::CloudProviderE => "oracle",
            Self::GenericCloud => "cloud",
        }
    }

    /// Human-readable provider name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::CloudProviderA => "Amazon Web Services",
            Self::CloudProviderB => "Microsoft Azure",
            Self::CloudProviderC => "Google Cloud",
            Self::CloudProviderD => "Alibaba Cloud",
            Self::CloudProviderE => "Oracle Cloud",
            Self::GenericCloud => "Generic Cloud",
        }
    }

    /// Whether this label names a specific provider (everything but `GenericCloud`).
    pub fn is_provider(self) -> bool {
        self != Self::GenericCloud
    }
}

impl std::fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Semantic grouping of a document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    General,
    Responsibilities,
    Requirements,
}

impl SectionLabel {
    pub const ALL: [SectionLabel; 3] = [
        SectionLabel::General,
        SectionLabel::Responsibilities,
        SectionLabel::Requirements,
    ];

    /// Separator line placed before this section in an assembled description.
    pub fn separator(self) -> Option<&'static str> {
        match self {
            Self::General => None,
            Self::Responsibilities => Some("--- RESPONSIBILITIES ---"),
            Self::Requirements => Some("--- REQUIREMENTS ---"),
        }
    }
}

/// Section label → ordered, deduplicated paragraphs.
pub type Sections = BTreeMap<SectionLabel, Vec<String>>;

// ---------------------------------------------------------------------------
// Classifications
// ---------------------------------------------------------------------------

/// Per-category matched sentences, in the order they appeared.
///
/// Every label is always present (possibly empty), so the set of matched
/// labels is derived from the lists and can never disagree with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classifications(BTreeMap<CategoryLabel, Vec<String>>);

impl Classifications {
    pub fn new() -> Self {
        Self(
            CategoryLabel::ALL
                .into_iter()
                .map(|label| (label, Vec::new()))
                .collect(),
        )
    }

    /// Append a matched sentence to a label's list.
    pub fn push(&mut self, label: CategoryLabel, sentence: impl Into<String>) {
        self.0.entry(label).or_default().push(sentence.into());
    }

    /// Sentences matched for `label` (empty slice if none).
    pub fn get(&self, label: CategoryLabel) -> &[String] {
        self.0.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Labels with at least one matched sentence.
    pub fn matched(&self) -> BTreeSet<CategoryLabel> {
        self.0
            .iter()
            .filter(|(_, sentences)| !sentences.is_empty())
            .map(|(label, _)| *label)
            .collect()
    }

    /// Whether any label matched.
    pub fn any(&self) -> bool {
        self.0.values().any(|sentences| !sentences.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryLabel, &[String])> {
        self.0.iter().map(|(label, s)| (*label, s.as_slice()))
    }
}

impl Default for Classifications {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One extracted item. Built once by the extraction pipeline, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: Identifier,
    /// Location the document was fetched from.
    pub url: String,
    pub title: String,
    pub organization: String,
    pub location: String,
    pub country: String,
    /// General text plus labeled sections, separated by section markers.
    pub description: String,
    pub sections: Sections,
    pub classifications: Classifications,
    pub fetched_at: DateTime<Utc>,
}

impl Record {
    /// Labels with a non-empty classification list.
    pub fn any_category_matched(&self) -> BTreeSet<CategoryLabel> {
        self.classifications.matched()
    }
}

// ---------------------------------------------------------------------------
// AggregateSummary
// ---------------------------------------------------------------------------

/// Counts derived from a record collection. Recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub total_records: usize,
    /// Number of records whose matched set contains the label (every label present).
    pub count_by_category: BTreeMap<CategoryLabel, usize>,
}

impl AggregateSummary {
    pub fn count(&self, label: CategoryLabel) -> usize {
        self.count_by_category.get(&label).copied().unwrap_or(0)
    }
}
