use std::fmt;

use serde::{Deserialize, Serialize};

/// Category used whenever a scam type or state is absent.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Binary ground-truth / predicted class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScamLabel {
    /// Negative class (index 0).
    #[serde(rename = "Non-Scam")]
    NonScam,
    /// Positive class (index 1).
    #[serde(rename = "Scam")]
    Scam,
}

impl ScamLabel {
    /// Number of classes the classifier distinguishes.
    pub const NUM_CLASSES: usize = 2;

    /// Class index used by the classifier (`NonScam = 0`, `Scam = 1`).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::NonScam => 0,
            Self::Scam => 1,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::NonScam),
            1 => Some(Self::Scam),
            _ => None,
        }
    }

    /// Interprets a raw target cell.
    ///
    /// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `scam`/`non-scam`
    /// (also `nonscam`, `non scam`, `not scam`), case-insensitive.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_lowercase();
        match value.as_str() {
            "1" | "1.0" | "true" | "yes" | "scam" => Some(Self::Scam),
            "0" | "0.0" | "false" | "no" | "non-scam" | "nonscam" | "non scam" | "non_scam"
            | "not scam" => Some(Self::NonScam),
            _ => None,
        }
    }
}

impl fmt::Display for ScamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonScam => write!(f, "Non-Scam"),
            Self::Scam => write!(f, "Scam"),
        }
    }
}

/// One cleaned row of the labeled incident table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// Incident narrative. Rows without one are dropped before training.
    pub summary: Option<String>,
    /// Normalized, non-negative loss amount.
    pub amount_lost: f64,
    /// Scam category, `None` when the cell was empty.
    pub scam_type: Option<String>,
    /// Region label, `None` when the cell was empty.
    pub state: Option<String>,
    /// Ground truth.
    pub label: ScamLabel,
}

impl TrainingRecord {
    #[must_use]
    pub fn new(summary: impl Into<String>, amount_lost: f64, label: ScamLabel) -> Self {
        Self {
            summary: Some(summary.into()),
            amount_lost,
            scam_type: None,
            state: None,
            label,
        }
    }

    #[must_use]
    pub fn with_scam_type(mut self, scam_type: impl Into<String>) -> Self {
        self.scam_type = Some(scam_type.into());
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Scam type with the `"Unknown"` fill applied.
    #[must_use]
    pub fn scam_type_or_unknown(&self) -> &str {
        self.scam_type.as_deref().unwrap_or(UNKNOWN_CATEGORY)
    }

    /// State with the `"Unknown"` fill applied.
    #[must_use]
    pub fn state_or_unknown(&self) -> &str {
        self.state.as_deref().unwrap_or(UNKNOWN_CATEGORY)
    }
}

/// A single incident to classify, with categorical labels still as text.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentInput {
    pub summary: String,
    pub amount_lost: f64,
    pub scam_type: String,
    pub state: String,
}

impl IncidentInput {
    /// Creates an input with zero loss and `"Unknown"` categories.
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            amount_lost: 0.0,
            scam_type: UNKNOWN_CATEGORY.to_string(),
            state: UNKNOWN_CATEGORY.to_string(),
        }
    }

    #[must_use]
    pub fn with_amount(mut self, amount_lost: f64) -> Self {
        self.amount_lost = amount_lost;
        self
    }

    #[must_use]
    pub fn with_scam_type(mut self, scam_type: impl Into<String>) -> Self {
        self.scam_type = scam_type.into();
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }
}

/// Model-ready row: summary text, raw amount and the two category codes.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub summary: String,
    pub amount_lost: f64,
    pub scam_type_code: usize,
    pub state_code: usize,
}
