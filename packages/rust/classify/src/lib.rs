//! Sentence classification into cloud-provider categories.
//!
//! Text is split into sentences, each sentence is tokenized into whole
//! words, and every [`ClassificationRule`] is evaluated independently:
//! exclusion terms veto, primary terms assign, contextual service terms
//! assign only next to an anchor term. Sentences mentioning "cloud" without
//! matching a provider fall into the generic bucket.

pub mod engine;
pub mod rules;
pub mod text;

pub use engine::{ClassificationEngine, classify, classify_sentence};
pub use rules::{ClassificationRule, GENERIC_CLOUD_TERM, PROVIDER_RULES, rule_for};
pub use text::{Sentence, split_sentences, tokenize};
