pub mod prediction;
pub mod record;

pub use prediction::{
    AmountValue, HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD, Prediction, PredictionRequest,
    PredictionResponse, RiskLevel,
};
pub use record::{FeatureRow, IncidentInput, ScamLabel, TrainingRecord, UNKNOWN_CATEGORY};
