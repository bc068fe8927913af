use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::{IncidentInput, ScamLabel, UNKNOWN_CATEGORY};
use crate::error::{Result, ScamScopeError};

/// Confidence above which a prediction is `High` risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.8;
/// Confidence above which a prediction is `Medium` risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.6;

/// Three-tier risk derived from the prediction confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Maps a confidence to its tier. Both thresholds are exclusive:
    /// exactly `0.8` is `Medium`, exactly `0.6` is `Low`.
    #[must_use]
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > HIGH_RISK_THRESHOLD {
            Self::High
        } else if confidence > MEDIUM_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// The successful output of the predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class.
    pub prediction: ScamLabel,
    /// Probability of the predicted class, in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Tier derived from `confidence`.
    pub risk_level: RiskLevel,
}

impl Prediction {
    /// Builds a prediction from the positive-class probability.
    ///
    /// The positive class wins only when strictly more likely than not.
    #[must_use]
    pub fn from_scam_probability(p_scam: f64) -> Self {
        let p_scam = p_scam.clamp(0.0, 1.0);
        let (prediction, confidence) = if p_scam > 0.5 {
            (ScamLabel::Scam, p_scam)
        } else {
            (ScamLabel::NonScam, 1.0 - p_scam)
        };
        Self {
            prediction,
            confidence,
            risk_level: RiskLevel::from_confidence(confidence),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2}%, risk={})",
            self.prediction,
            self.confidence * 100.0,
            self.risk_level
        )
    }
}

/// Loss amount as it arrives on the wire: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountValue {
    Number(f64),
    Text(String),
}

impl Default for AmountValue {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl AmountValue {
    /// Coerces the value to a finite number.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::InvalidAmount` for non-numeric text or
    /// non-finite values.
    pub fn to_f64(&self) -> Result<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ScamScopeError::InvalidAmount(s.clone()))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ScamScopeError::InvalidAmount(value.to_string()))
        }
    }
}

/// Request body shared by the HTTP handler and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub amount_lost: AmountValue,
    #[serde(default)]
    pub scam_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl PredictionRequest {
    /// Applies request defaults and validates the amount.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::InvalidAmount` if `amountLost` is not numeric.
    pub fn to_input(&self) -> Result<IncidentInput> {
        let amount_lost = self.amount_lost.to_f64()?;
        Ok(IncidentInput {
            summary: self.summary.clone().unwrap_or_default(),
            amount_lost,
            scam_type: self
                .scam_type
                .clone()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            state: self
                .state
                .clone()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        })
    }
}

/// Uniform response payload: either the prediction or `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    Success(Prediction),
    Failure { error: String },
}

impl PredictionResponse {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Failure {
            error: message.into(),
        }
    }

    /// Converts any outcome into a response; errors keep only their message.
    #[must_use]
    pub fn from_result(result: Result<Prediction>) -> Self {
        match result {
            Ok(prediction) => Self::Success(prediction),
            Err(e) => Self::error(e.to_string()),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_thresholds() {
        assert_eq!(RiskLevel::from_confidence(0.85), RiskLevel::High);
        assert_eq!(RiskLevel::from_confidence(0.7), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_confidence(0.5), RiskLevel::Low);
        assert_eq!(RiskLevel::from_confidence(0.8), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_confidence(0.6), RiskLevel::Low);
        assert_eq!(RiskLevel::from_confidence(1.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_confidence(0.0), RiskLevel::Low);
    }

    #[test]
    fn prediction_takes_probability_of_predicted_class() {
        let p = Prediction::from_scam_probability(0.9);
        assert_eq!(p.prediction, ScamLabel::Scam);
        assert!((p.confidence - 0.9).abs() < 1e-12);
        assert_eq!(p.risk_level, RiskLevel::High);

        let p = Prediction::from_scam_probability(0.3);
        assert_eq!(p.prediction, ScamLabel::NonScam);
        assert!((p.confidence - 0.7).abs() < 1e-12);
        assert_eq!(p.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn even_odds_predict_non_scam() {
        let p = Prediction::from_scam_probability(0.5);
        assert_eq!(p.prediction, ScamLabel::NonScam);
        assert_eq!(p.confidence, 0.5);
        assert_eq!(p.risk_level, RiskLevel::Low);
    }

    #[test]
    fn prediction_json_shape() {
        let p = Prediction {
            prediction: ScamLabel::Scam,
            confidence: 0.75,
            risk_level: RiskLevel::Medium,
        };
        let json = serde_json::to_value(PredictionResponse::Success(p)).unwrap();
        assert_eq!(json["prediction"], "Scam");
        assert_eq!(json["confidence"], 0.75);
        assert_eq!(json["risk_level"], "Medium");
    }

    #[test]
    fn error_response_json_shape() {
        let response = PredictionResponse::error("boom");
        assert!(response.is_error());
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"error":"boom"}"#
        );
    }

    #[test]
    fn request_defaults() {
        let request: PredictionRequest = serde_json::from_str("{}").unwrap();
        let input = request.to_input().unwrap();
        assert_eq!(input.summary, "");
        assert_eq!(input.amount_lost, 0.0);
        assert_eq!(input.scam_type, UNKNOWN_CATEGORY);
        assert_eq!(input.state, UNKNOWN_CATEGORY);
    }

    #[test]
    fn request_null_categories_become_unknown() {
        let request: PredictionRequest =
            serde_json::from_str(r#"{"summary":"x","scamType":null,"state":null}"#).unwrap();
        let input = request.to_input().unwrap();
        assert_eq!(input.scam_type, UNKNOWN_CATEGORY);
        assert_eq!(input.state, UNKNOWN_CATEGORY);
    }

    #[test]
    fn request_amount_accepts_number_and_numeric_string() {
        let request: PredictionRequest =
            serde_json::from_str(r#"{"amountLost": 20000}"#).unwrap();
        assert_eq!(request.to_input().unwrap().amount_lost, 20000.0);

        let request: PredictionRequest =
            serde_json::from_str(r#"{"amountLost": " 1500.5 "}"#).unwrap();
        assert_eq!(request.to_input().unwrap().amount_lost, 1500.5);
    }

    #[test]
    fn request_rejects_non_numeric_amount() {
        let request: PredictionRequest =
            serde_json::from_str(r#"{"amountLost": "abc"}"#).unwrap();
        let err = request.to_input().unwrap_err();
        assert!(matches!(err, ScamScopeError::InvalidAmount(_)));
    }

    #[test]
    fn amount_rejects_non_finite() {
        assert!(AmountValue::Text("NaN".into()).to_f64().is_err());
        assert!(AmountValue::Text("inf".into()).to_f64().is_err());
        assert!(AmountValue::Number(f64::INFINITY).to_f64().is_err());
    }
}
