//! Identifier extraction from resolved locations.

use regex::Regex;

use jobscout_shared::{Identifier, JobScoutError, Result};

/// Ordered regex cascade turning a location string into an [`Identifier`].
///
/// Each pattern's first capture group is the identifier; a pattern without
/// groups yields its whole match.
#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
    patterns: Vec<Regex>,
}

impl IdentifierExtractor {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| {
                    JobScoutError::config(format!("invalid identifier pattern {:?}: {e}", p.as_ref()))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if patterns.is_empty() {
            return Err(JobScoutError::config("at least one identifier pattern is required"));
        }
        Ok(Self { patterns })
    }

    /// First identifier any pattern yields, in pattern order.
    pub fn extract(&self, location: &str) -> Option<Identifier> {
        self.patterns.iter().find_map(|re| {
            let caps = re.captures(location)?;
            let m = caps.get(1).or_else(|| caps.get(0))?;
            Identifier::new(m.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_shared::CollectorConfig;

    fn extractor() -> IdentifierExtractor {
        IdentifierExtractor::new(&CollectorConfig::default().identifier_patterns).unwrap()
    }

    #[test]
    fn extracts_from_query_parameter() {
        let id = extractor()
            .extract("https://www.linkedin.com/jobs/search/?currentJobId=4176105597&start=4")
            .unwrap();
        assert_eq!(id.as_str(), "4176105597");
    }

    #[test]
    fn extracts_from_view_path() {
        let ex = extractor();
        assert_eq!(
            ex.extract("https://www.linkedin.com/jobs/view/4191492284/").unwrap().as_str(),
            "4191492284"
        );
        assert_eq!(
            ex.extract("https://www.linkedin.com/jobs/view/cloud-engineer-at-acme-4191488681")
                .unwrap()
                .as_str(),
            "4191488681"
        );
    }

    #[test]
    fn query_parameter_wins_over_path() {
        let id = extractor()
            .extract("https://x.test/jobs/view/111/?currentJobId=222")
            .unwrap();
        assert_eq!(id.as_str(), "222");
    }

    #[test]
    fn no_match_yields_none() {
        assert!(extractor().extract("https://www.linkedin.com/feed/").is_none());
        assert!(extractor().extract("").is_none());
    }

    #[test]
    fn rejects_bad_patterns() {
        assert!(IdentifierExtractor::new(&["(unclosed"]).is_err());
        assert!(IdentifierExtractor::new::<&str>(&[]).is_err());
    }
}
