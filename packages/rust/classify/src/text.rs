//! Sentence splitting and tokenization.

use std::sync::LazyLock;

use regex::Regex;

/// Split text into trimmed, non-empty sentences on newline, comma, period,
/// semicolon, colon, and dash delimiters.
pub fn split_sentences(text: &str) -> Vec<&str> {
    static DELIMITER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[\n,.;:\-–—]+").expect("valid regex"));

    DELIMITER_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Lowercased whole-word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A sentence prepared for term lookups.
#[derive(Debug, Clone)]
pub struct Sentence<'a> {
    text: &'a str,
    lower: String,
    tokens: Vec<String>,
}

impl<'a> Sentence<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lower: text.to_lowercase(),
            tokens: tokenize(text),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether `term` occurs as whole words.
    ///
    /// Multi-word terms must appear as consecutive tokens. Terms containing
    /// non-ASCII text match as plain substrings, since scripts like CJK have
    /// no word breaks.
    pub fn contains_term(&self, term: &str) -> bool {
        if !term.is_ascii() {
            return self.lower.contains(&term.to_lowercase());
        }
        let needle = tokenize(term);
        if needle.is_empty() {
            return false;
        }
        self.tokens
            .windows(needle.len())
            .any(|window| window == needle.as_slice())
    }

    pub fn contains_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|t| self.contains_term(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_all_delimiters() {
        let sentences = split_sentences("AWS, Azure; GCP.\nOracle: OCI - Alibaba—Cloud ,, ");
        assert_eq!(
            sentences,
            vec!["AWS", "Azure", "GCP", "Oracle", "OCI", "Alibaba", "Cloud"]
        );
    }

    #[test]
    fn empty_text_has_no_sentences() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences(" .,;\n ").is_empty());
    }

    #[test]
    fn tokens_are_whole_words() {
        assert_eq!(tokenize("Route53 & S3 (Pub/Sub)"), vec!["route53", "s3", "pub", "sub"]);
    }

    #[test]
    fn substring_is_not_a_word() {
        let s = Sentence::new("Compliance with state laws is required");
        assert!(!s.contains_term("aws"));
        assert!(s.contains_term("laws"));
    }

    #[test]
    fn multi_word_terms_need_consecutive_tokens() {
        let s = Sentence::new("Experience with Google Cloud Platform");
        assert!(s.contains_term("google cloud"));
        assert!(!Sentence::new("Google offers a cloud").contains_term("google cloud"));
        assert!(Sentence::new("Pub/Sub topics").contains_term("pub/sub"));
    }

    #[test]
    fn non_ascii_terms_match_as_substrings() {
        assert!(Sentence::new("熟悉阿里云产品").contains_term("阿里"));
    }
}
