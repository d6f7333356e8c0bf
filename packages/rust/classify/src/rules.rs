//! Static classification rule table.
//!
//! One entry per provider label. Rules are independent of each other, so
//! their order never changes an outcome.

use jobscout_shared::CategoryLabel;

use crate::text::Sentence;

/// Term that marks a sentence as cloud-related when no provider rule fired.
pub const GENERIC_CLOUD_TERM: &str = "cloud";

/// Layered keyword rule for one category label.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub label: CategoryLabel,
    /// Any of these alone assigns the label.
    pub primary_terms: &'static [&'static str],
    /// Ambiguous service names; assign only next to an anchor term.
    pub contextual_service_terms: &'static [&'static str],
    /// Disambiguating context for contextual terms.
    pub anchor_terms: &'static [&'static str],
    /// Any of these vetoes the rule for the sentence, checked first.
    pub exclusion_terms: &'static [&'static str],
}

impl ClassificationRule {
    /// Either path, evaluated for this rule alone.
    pub fn matches(&self, sentence: &Sentence<'_>) -> bool {
        self.matches_primary(sentence) || self.matches_contextual(sentence)
    }

    /// A primary term is present and no exclusion term is.
    pub fn matches_primary(&self, sentence: &Sentence<'_>) -> bool {
        !sentence.contains_any(self.exclusion_terms) && sentence.contains_any(self.primary_terms)
    }

    /// A contextual service term next to an anchor, with no exclusion term.
    pub fn matches_contextual(&self, sentence: &Sentence<'_>) -> bool {
        !sentence.contains_any(self.exclusion_terms)
            && sentence.contains_any(self.contextual_service_terms)
            && sentence.contains_any(self.anchor_terms)
    }
}

/// Built-in provider rules.
pub static PROVIDER_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        label: CategoryLabel::CloudProviderA,
        primary_terms: &[
            "aws",
            "amazon web services",
            "amazon",
            "dynamodb",
            "sagemaker",
            "cloudformation",
            "cloudwatch",
            "cloudfront",
            "redshift",
            "fargate",
            "route53",
        ],
        contextual_service_terms: &["ec2", "s3", "lambda", "iam", "eks", "rds", "sqs", "bedrock"],
        anchor_terms: &["cloud", "serverless"],
        exclusion_terms: &["laws", "rainforest", "river", "basin"],
    },
    ClassificationRule {
        label: CategoryLabel::CloudProviderB,
        primary_terms: &["azure", "microsoft azure"],
        contextual_service_terms: &[
            "aks",
            "cosmos db",
            "active directory",
            "logic apps",
            "app service",
            "synapse",
            "entra",
        ],
        anchor_terms: &["microsoft", "kubernetes"],
        exclusion_terms: &[],
    },
    ClassificationRule {
        label: CategoryLabel::CloudProviderC,
        primary_terms: &["gcp", "google cloud", "bigquery", "dataproc", "cloud spanner"],
        contextual_service_terms: &[
            "gke",
            "cloud storage",
            "compute engine",
            "cloud functions",
            "dataflow",
            "cloud run",
            "pub/sub",
            "looker",
        ],
        anchor_terms: &["google", "kubernetes"],
        exclusion_terms: &[],
    },
    ClassificationRule {
        label: CategoryLabel::CloudProviderD,
        primary_terms: &[
            "alibaba",
            "alicloud",
            "aliyun",
            "alipay",
            "maxcompute",
            "polardb",
            "阿里",
        ],
        contextual_service_terms: &["ecs", "oss", "sls", "pai", "odps", "datav", "tablestore"],
        anchor_terms: &["china cloud", "china"],
        exclusion_terms: &[],
    },
    ClassificationRule {
        label: CategoryLabel::CloudProviderE,
        primary_terms: &[
            "oracle cloud",
            "oracle cloud infrastructure",
            "oci",
            "oracle database",
            "oracle applications",
        ],
        contextual_service_terms: &["exadata", "autonomous database", "fusion"],
        anchor_terms: &["oracle"],
        exclusion_terms: &["container", "containers", "image", "images", "docker", "podman"],
    },
];

/// Rule for a label, if one is built in.
pub fn rule_for(label: CategoryLabel) -> Option<&'static ClassificationRule> {
    PROVIDER_RULES.iter().find(|r| r.label == label)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::engine::classify_sentence;

    fn matches(label: CategoryLabel, text: &str) -> bool {
        rule_for(label)
            .expect("built-in rule")
            .matches(&Sentence::new(text))
    }

    #[test]
    fn every_provider_has_one_rule() {
        for label in CategoryLabel::ALL.into_iter().filter(|l| l.is_provider()) {
            assert_eq!(PROVIDER_RULES.iter().filter(|r| r.label == label).count(), 1);
        }
        assert!(rule_for(CategoryLabel::GenericCloud).is_none());
    }

    #[test]
    fn exclusion_vetoes_primary_terms() {
        assert!(matches(CategoryLabel::CloudProviderA, "Amazon logistics"));
        assert!(!matches(CategoryLabel::CloudProviderA, "Protect the Amazon rainforest"));
        assert!(matches(CategoryLabel::CloudProviderE, "Migrate workloads to OCI"));
        assert!(!matches(CategoryLabel::CloudProviderE, "Build OCI container images"));
    }

    #[test]
    fn contextual_terms_need_an_anchor() {
        assert!(!matches(CategoryLabel::CloudProviderA, "Write a lambda expression"));
        assert!(matches(CategoryLabel::CloudProviderA, "Run serverless Lambda jobs"));
        assert!(!matches(CategoryLabel::CloudProviderB, "Operate AKS clusters"));
        assert!(matches(CategoryLabel::CloudProviderB, "Operate AKS clusters with Kubernetes"));
        assert!(matches(CategoryLabel::CloudProviderC, "Google Compute Engine fleet"));
        assert!(!matches(CategoryLabel::CloudProviderD, "Amazon ECS tasks"));
        assert!(matches(CategoryLabel::CloudProviderD, "OSS buckets for our China region"));
        assert!(matches(CategoryLabel::CloudProviderE, "Oracle Exadata administration"));
    }

    #[test]
    fn contextual_terms_yield_to_a_named_provider() {
        let labels = |text: &str| classify_sentence(&Sentence::new(text), PROVIDER_RULES);

        assert_eq!(
            labels("Configure IAM roles on Google Cloud infrastructure"),
            BTreeSet::from([CategoryLabel::CloudProviderC])
        );
        assert_eq!(
            labels("Deploy Lambda functions to Azure cloud"),
            BTreeSet::from([CategoryLabel::CloudProviderB])
        );
        assert_eq!(
            labels("Deploy Lambda functions to the cloud"),
            BTreeSet::from([CategoryLabel::CloudProviderA])
        );
        // Naming a provider still keeps that provider's own label.
        assert_eq!(
            labels("Run Lambda on AWS and AKS on Azure"),
            BTreeSet::from([CategoryLabel::CloudProviderA, CategoryLabel::CloudProviderB])
        );
    }

    #[test]
    fn generic_words_are_not_anchors() {
        assert!(!matches(CategoryLabel::CloudProviderA, "Harden IAM for our devops infrastructure"));
    }

    #[test]
    fn substrings_do_not_count() {
        assert!(!matches(CategoryLabel::CloudProviderA, "Follow local laws and claws"));
        assert!(!matches(CategoryLabel::CloudProviderE, "Socioeconomic research"));
    }
}
