//! # Label Encoder
//!
//! Maps categorical strings (scam type, state) to contiguous integer codes.
//! Codes follow sorted label order, so the encoder is a bijection between
//! the frozen class list and `0..K`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScamScopeError};

/// Code assigned to any label the encoder has never seen.
pub const FALLBACK_CODE: usize = 0;

/// Frozen sorted set of labels observed at training time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fits the encoder over every label in `labels`.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Sorted class list; position is the code.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Returns `true` if `label` was seen at fit time.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.encode(label).is_some()
    }

    /// Code of a known label.
    #[must_use]
    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
    }

    /// Code of `label`, or [`FALLBACK_CODE`] if it is unknown.
    ///
    /// The fallback collides with whichever class sorts first; that
    /// approximation is intentional.
    #[must_use]
    pub fn encode_or_fallback(&self, label: &str) -> usize {
        self.encode(label).unwrap_or(FALLBACK_CODE)
    }

    /// Label for a code.
    #[must_use]
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Checks that the classes are sorted and unique, as [`LabelEncoder::fit`]
    /// leaves them. Lookups rely on it.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::Model` naming the first out-of-order pair.
    pub fn validate(&self) -> Result<()> {
        match self.classes.windows(2).find(|pair| pair[0] >= pair[1]) {
            Some(pair) => Err(ScamScopeError::Model(format!(
                "encoder classes are not sorted and unique at {:?}, {:?}",
                pair[0], pair[1]
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_sorted_order() {
        let encoder = LabelEncoder::fit(["Selangor", "Johor", "Unknown", "Johor", "Kedah"]);
        assert_eq!(encoder.classes(), ["Johor", "Kedah", "Selangor", "Unknown"]);
        assert_eq!(encoder.encode("Johor"), Some(0));
        assert_eq!(encoder.encode("Kedah"), Some(1));
        assert_eq!(encoder.encode("Selangor"), Some(2));
        assert_eq!(encoder.encode("Unknown"), Some(3));
        assert_eq!(encoder.len(), 4);
    }

    #[test]
    fn encode_decode_bijection() {
        let encoder = LabelEncoder::fit(["b", "a", "c"]);
        for code in 0..encoder.len() {
            let label = encoder.decode(code).unwrap();
            assert_eq!(encoder.encode(label), Some(code));
        }
        assert_eq!(encoder.decode(3), None);
    }

    #[test]
    fn unknown_label_falls_back_to_zero() {
        let encoder = LabelEncoder::fit(["Phishing", "Investment Scam", "Unknown"]);
        assert!(!encoder.contains("Crypto Scam"));
        assert_eq!(encoder.encode("Crypto Scam"), None);
        assert_eq!(encoder.encode_or_fallback("Crypto Scam"), FALLBACK_CODE);
        assert_eq!(encoder.encode_or_fallback("Crypto Scam"), 0);

        // "Unknown" is a real class here and does not sort first, so it
        // keeps its own code while unseen labels still map to 0.
        assert_eq!(encoder.encode_or_fallback("Unknown"), 2);
    }

    #[test]
    fn fallback_matches_unknown_when_unknown_sorts_first() {
        let encoder = LabelEncoder::fit(["Unknown", "Zamboanga"]);
        assert_eq!(
            encoder.encode_or_fallback("never seen"),
            encoder.encode_or_fallback("Unknown")
        );
    }

    #[test]
    fn matching_is_exact() {
        let encoder = LabelEncoder::fit(["Johor"]);
        assert!(encoder.contains("Johor"));
        assert!(!encoder.contains("johor"));
        assert!(!encoder.contains("Johor "));
    }

    #[test]
    fn validate_accepts_fitted_and_rejects_disordered() {
        assert!(LabelEncoder::fit(["b", "a", "a"]).validate().is_ok());
        assert!(LabelEncoder::default().validate().is_ok());

        let unsorted: LabelEncoder =
            serde_json::from_str(r#"{"classes":["Selangor","Johor"]}"#).unwrap();
        assert!(matches!(unsorted.validate(), Err(ScamScopeError::Model(_))));

        let duplicated: LabelEncoder =
            serde_json::from_str(r#"{"classes":["Johor","Johor"]}"#).unwrap();
        assert!(duplicated.validate().is_err());
    }

    #[test]
    fn empty_encoder_falls_back() {
        let encoder = LabelEncoder::default();
        assert!(encoder.is_empty());
        assert_eq!(encoder.encode_or_fallback("anything"), 0);
    }
}
