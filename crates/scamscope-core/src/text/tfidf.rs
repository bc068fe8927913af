//! # TF-IDF Vectorizer
//!
//! Term-frequency / inverse-document-frequency features over a fixed,
//! bounded vocabulary learned from the training summaries.
//!
//! - vocabulary: the `max_features` terms with the highest corpus count
//!   (ties broken alphabetically), stored in alphabetical order
//! - idf: `ln((1 + n) / (1 + df)) + 1` (smoothed)
//! - rows: raw counts × idf, L2-normalized

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScamScopeError};

/// Default vocabulary bound.
pub const DEFAULT_MAX_FEATURES: usize = 500;

/// Fitted TF-IDF vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Alphabetically sorted terms; position is the feature column.
    vocabulary: Vec<String>,
    /// Inverse document frequency per vocabulary column.
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learns vocabulary and idf weights from tokenized documents.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::Model` if the documents contain no terms at
    /// all (every summary empty or made only of stop words).
    pub fn fit(documents: &[Vec<String>], max_features: usize) -> Result<Self> {
        // term -> (corpus count, document frequency)
        let mut stats: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for document in documents {
            let mut seen: Vec<&str> = Vec::with_capacity(document.len());
            for term in document {
                let entry = stats.entry(term.as_str()).or_insert((0, 0));
                entry.0 += 1;
                if !seen.contains(&term.as_str()) {
                    seen.push(term.as_str());
                    entry.1 += 1;
                }
            }
        }

        if stats.is_empty() {
            return Err(ScamScopeError::Model(
                "empty vocabulary; summaries contain only stop words".into(),
            ));
        }

        // BTreeMap iteration is alphabetical and sort_by is stable, so equal
        // counts keep alphabetical order.
        let mut ranked: Vec<(&str, (usize, usize))> = stats.into_iter().collect();
        ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0));
        ranked.truncate(max_features.max(1));
        ranked.sort_by(|a, b| a.0.cmp(b.0));

        let n_docs = documents.len() as f64;
        let (vocabulary, idf) = ranked
            .into_iter()
            .map(|(term, (_, df))| {
                let idf = ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0;
                (term.to_string(), idf)
            })
            .unzip();

        Ok(Self { vocabulary, idf })
    }

    /// Number of feature columns produced.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    #[must_use]
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Feature column of `term`, if it is in the vocabulary.
    #[must_use]
    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
    }

    /// idf weight of `term`, if it is in the vocabulary.
    #[must_use]
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.column(term).and_then(|col| self.idf.get(col).copied())
    }

    /// Checks a deserialized vectorizer: one finite idf weight per term and
    /// a strictly ascending vocabulary.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::Model` describing the first inconsistency.
    pub fn validate(&self) -> Result<()> {
        if self.idf.len() != self.vocabulary.len() {
            return Err(ScamScopeError::Model(format!(
                "vectorizer has {} terms but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        if let Some(pair) = self.vocabulary.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ScamScopeError::Model(format!(
                "vectorizer vocabulary is not sorted at {:?}, {:?}",
                pair[0], pair[1]
            )));
        }
        if self.idf.iter().any(|w| !w.is_finite()) {
            return Err(ScamScopeError::Model("vectorizer has a non-finite idf weight".into()));
        }
        Ok(())
    }

    /// Writes the normalized tf-idf row for `terms` into `out[..self.len()]`.
    /// Out-of-vocabulary terms are ignored; a row with no known term is all zeros.
    pub fn transform_into(&self, terms: &[String], out: &mut [f64]) {
        let row = &mut out[..self.vocabulary.len()];
        row.fill(0.0);
        for term in terms {
            if let Some(col) = self.column(term) {
                row[col] += 1.0;
            }
        }
        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }
        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in row.iter_mut() {
                *value /= norm;
            }
        }
    }

    /// Normalized tf-idf row for `terms`.
    #[must_use]
    pub fn transform(&self, terms: &[String]) -> Vec<f64> {
        let mut row = vec![0.0; self.vocabulary.len()];
        self.transform_into(terms, &mut row);
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&str]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|d| d.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn vocabulary_is_alphabetical() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["scam bank", "bank refund"]), 10).unwrap();
        assert_eq!(vectorizer.vocabulary(), ["bank", "refund", "scam"]);
        assert_eq!(vectorizer.column("refund"), Some(1));
        assert_eq!(vectorizer.column("missing"), None);
    }

    #[test]
    fn max_features_keeps_most_frequent_terms() {
        let corpus = docs(&["aa bb bb cc cc cc", "cc dd", "bb"]);
        let vectorizer = TfidfVectorizer::fit(&corpus, 2).unwrap();
        // counts: aa=1 bb=3 cc=4 dd=1
        assert_eq!(vectorizer.vocabulary(), ["bb", "cc"]);
    }

    #[test]
    fn ties_break_alphabetically() {
        let corpus = docs(&["zz yy xx"]);
        let vectorizer = TfidfVectorizer::fit(&corpus, 2).unwrap();
        assert_eq!(vectorizer.vocabulary(), ["xx", "yy"]);
    }

    #[test]
    fn smoothed_idf() {
        let corpus = docs(&["scam bank", "bank refund", "bank"]);
        let vectorizer = TfidfVectorizer::fit(&corpus, 10).unwrap();
        // bank appears in every document
        assert!((vectorizer.idf("bank").unwrap() - 1.0).abs() < 1e-12);
        let expected = (4.0f64 / 2.0).ln() + 1.0;
        assert!((vectorizer.idf("scam").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn rows_are_l2_normalized() {
        let corpus = docs(&["scam bank", "bank refund", "bank"]);
        let vectorizer = TfidfVectorizer::fit(&corpus, 10).unwrap();
        let row = vectorizer.transform(&docs(&["scam scam bank unseen"])[0]);
        let norm: f64 = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(row[vectorizer.column("scam").unwrap()] > row[vectorizer.column("bank").unwrap()]);
        assert_eq!(row[vectorizer.column("refund").unwrap()], 0.0);
    }

    #[test]
    fn unknown_terms_give_zero_row() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["scam"]), 10).unwrap();
        let row = vectorizer.transform(&docs(&["nothing known"])[0]);
        assert!(row.iter().all(|&v| v == 0.0));
        assert!(vectorizer.transform(&[]).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn fitted_vectorizer_validates() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["scam bank", "bank refund"]), 10).unwrap();
        assert!(vectorizer.validate().is_ok());
    }

    #[test]
    fn short_idf_is_rejected() {
        let vectorizer: TfidfVectorizer =
            serde_json::from_str(r#"{"vocabulary":["bank","scam"],"idf":[1.0]}"#).unwrap();
        assert!(matches!(vectorizer.validate(), Err(ScamScopeError::Model(_))));
        assert_eq!(vectorizer.idf("scam"), None);
    }

    #[test]
    fn unsorted_vocabulary_is_rejected() {
        let vectorizer: TfidfVectorizer =
            serde_json::from_str(r#"{"vocabulary":["scam","bank"],"idf":[1.0,1.0]}"#).unwrap();
        assert!(matches!(vectorizer.validate(), Err(ScamScopeError::Model(_))));

        let duplicated: TfidfVectorizer =
            serde_json::from_str(r#"{"vocabulary":["bank","bank"],"idf":[1.0,1.0]}"#).unwrap();
        assert!(duplicated.validate().is_err());
    }

    #[test]
    fn empty_corpus_is_an_error() {
        let result = TfidfVectorizer::fit(&[vec![], vec![]], 10);
        assert!(matches!(result, Err(ScamScopeError::Model(_))));
    }
}
