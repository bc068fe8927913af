//! # Summary Tokenizer
//!
//! Splits incident summaries into lowercase terms for the TF-IDF
//! vectorizer. A term is a run of two or more word characters; English
//! stop words are dropped.

use std::collections::HashSet;

use regex::Regex;

use super::stop_words::ENGLISH_STOP_WORDS;
use crate::error::Result;

/// Term extractor shared by vectorizer fitting and inference.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    re_term: Regex,
    stop_words: HashSet<&'static str>,
}

impl Tokenizer {
    /// Create a new tokenizer with the English stop-word list.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::RegexError` if the term pattern fails to
    /// compile (should never happen with the static pattern).
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_term: Regex::new(r"\b\w\w+\b")?,
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        })
    }

    /// Lowercased terms of `input` in order of appearance, stop words removed.
    ///
    /// # Examples
    /// ```
    /// use scamscope_core::text::Tokenizer;
    ///
    /// let tokenizer = Tokenizer::new().unwrap();
    /// let terms = tokenizer.tokenize("The victim lost RM20,000 to a fake investment");
    /// assert_eq!(terms, vec!["victim", "lost", "rm20", "000", "fake", "investment"]);
    /// ```
    pub fn tokenize(&self, input: &str) -> Vec<String> {
        let lower = input.to_lowercase();
        self.re_term
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|term| !self.stop_words.contains(term))
            .map(str::to_string)
            .collect()
    }

    /// Returns `true` if `term` is on the stop-word list.
    pub fn is_stop_word(&self, term: &str) -> bool {
        self.stop_words.contains(term)
    }
}
