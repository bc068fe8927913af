//! # ScamScope Core
//!
//! Classification pipeline and predictor for incident reports. Turns a
//! free-text summary, a loss amount, a scam category and a state into a
//! Scam / Non-Scam verdict with a confidence and a risk tier.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scamscope_core::{IncidentInput, Predictor};
//!
//! let predictor = Predictor::load_dir("models").unwrap();
//! let input = IncidentInput::new("fake investment company offering high returns")
//!     .with_amount(20_000.0)
//!     .with_scam_type("Investment Scam")
//!     .with_state("Selangor");
//! let prediction = predictor.predict(&input).unwrap();
//! println!("{prediction}");
//! ```
pub mod artifacts;
pub mod encoder;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod predictor;
pub mod text;
pub mod types;

// Re-export primary API
pub use artifacts::{ArtifactPaths, ArtifactSet, MODEL_DIR_ENV};
pub use encoder::{FALLBACK_CODE, LabelEncoder};
pub use error::{Result, ScamScopeError};
pub use model::{ClassWeight, FitReport, LogisticConfig};
pub use pipeline::{Pipeline, PipelineConfig};
pub use predictor::{Predictor, PredictorHandle, predict_once};
pub use types::{
    AmountValue, FeatureRow, IncidentInput, Prediction, PredictionRequest, PredictionResponse,
    RiskLevel, ScamLabel, TrainingRecord, UNKNOWN_CATEGORY,
};
