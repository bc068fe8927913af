//! # Classification Pipeline
//!
//! Column layout of the feature vector fed to the classifier:
//!
//! | Columns      | Source                  | Transform           |
//! |--------------|-------------------------|---------------------|
//! | `0..V`       | summary                 | TF-IDF (V ≤ 500)    |
//! | `V`          | amount lost             | standard scaler     |
//! | `V + 1`      | scam-type code          | pass-through        |
//! | `V + 2`      | state code              | pass-through        |

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, ScamScopeError};
use crate::model::{ClassWeight, FitReport, LogisticConfig, LogisticRegression, StandardScaler};
use crate::text::{DEFAULT_MAX_FEATURES, TfidfVectorizer, Tokenizer};
use crate::types::{FeatureRow, ScamLabel};

/// Columns appended after the text block: amount, scam-type code, state code.
pub const NUMERIC_COLUMNS: usize = 3;

/// Configuration for fitting a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Vocabulary bound of the text vectorizer.
    pub max_features: usize,
    /// Classifier solver settings.
    pub classifier: LogisticConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            classifier: LogisticConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new pipeline configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vocabulary bound (at least 1).
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features.max(1);
        self
    }

    /// Set the inverse regularization strength.
    pub fn with_c(mut self, c: f64) -> Self {
        self.classifier.c = c;
        self
    }

    /// Set the solver iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.classifier.max_iter = max_iter;
        self
    }

    /// Set the class weighting scheme.
    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.classifier.class_weight = class_weight;
        self
    }
}

/// Serializable form of a fitted pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub vectorizer: TfidfVectorizer,
    pub scaler: StandardScaler,
    pub classifier: LogisticRegression,
}

/// Fitted text + numeric + categorical pipeline. Immutable after fitting.
#[derive(Debug, Clone)]
pub struct Pipeline {
    tokenizer: Tokenizer,
    artifact: PipelineArtifact,
}

impl Pipeline {
    /// Fits vectorizer, scaler and classifier on the given rows.
    ///
    /// # Errors
    ///
    /// - `ScamScopeError::SingleClass` if `labels` holds only one class.
    /// - `ScamScopeError::Model` for an empty vocabulary or a solver failure.
    pub fn fit(
        rows: &[FeatureRow],
        labels: &[ScamLabel],
        config: &PipelineConfig,
    ) -> Result<(Self, FitReport)> {
        if rows.len() != labels.len() {
            return Err(ScamScopeError::Model(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }

        let tokenizer = Tokenizer::new()?;
        let documents: Vec<Vec<String>> = rows
            .iter()
            .map(|row| tokenizer.tokenize(&row.summary))
            .collect();
        let vectorizer = TfidfVectorizer::fit(&documents, config.max_features)?;

        let amounts: Vec<f64> = rows.iter().map(|row| row.amount_lost).collect();
        let scaler = StandardScaler::fit(&amounts);

        let width = vectorizer.len() + NUMERIC_COLUMNS;
        let matrix: Vec<Vec<f64>> = rows
            .iter()
            .zip(&documents)
            .map(|(row, terms)| {
                let mut features = vec![0.0; width];
                assemble(&vectorizer, &scaler, terms, row, &mut features);
                features
            })
            .collect();

        let (classifier, report) = LogisticRegression::fit(&matrix, labels, &config.classifier)?;
        info!(
            samples = rows.len(),
            vocabulary = vectorizer.len(),
            iterations = report.iterations,
            converged = report.converged,
            "pipeline fitted"
        );

        Ok((
            Self {
                tokenizer,
                artifact: PipelineArtifact {
                    vectorizer,
                    scaler,
                    classifier,
                },
            },
            report,
        ))
    }

    /// Rebuilds a pipeline from its persisted form.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::Model` if the vectorizer is inconsistent,
    /// the scaler is not finite and positive, or the classifier width does
    /// not match the vectorizer vocabulary.
    pub fn from_artifact(artifact: PipelineArtifact) -> Result<Self> {
        artifact.vectorizer.validate()?;
        let scaler = &artifact.scaler;
        if !scaler.mean.is_finite() || !scaler.scale.is_finite() || scaler.scale <= 0.0 {
            return Err(ScamScopeError::Model(format!(
                "invalid amount scaler (mean {}, scale {})",
                scaler.mean, scaler.scale
            )));
        }
        let expected = artifact.vectorizer.len() + NUMERIC_COLUMNS;
        if artifact.classifier.n_features() != expected {
            return Err(ScamScopeError::Model(format!(
                "classifier expects {} features but vectorizer produces {}",
                artifact.classifier.n_features(),
                expected
            )));
        }
        Ok(Self {
            tokenizer: Tokenizer::new()?,
            artifact,
        })
    }

    #[must_use]
    pub fn artifact(&self) -> &PipelineArtifact {
        &self.artifact
    }

    #[must_use]
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.artifact.vectorizer
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.artifact.vectorizer.len() + NUMERIC_COLUMNS
    }

    /// Dense feature vector for one row.
    #[must_use]
    pub fn transform(&self, row: &FeatureRow) -> Vec<f64> {
        let terms = self.tokenizer.tokenize(&row.summary);
        let mut features = vec![0.0; self.n_features()];
        assemble(
            &self.artifact.vectorizer,
            &self.artifact.scaler,
            &terms,
            row,
            &mut features,
        );
        features
    }

    /// `[P(Non-Scam), P(Scam)]` for one row.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::Model` if the classifier rejects the vector.
    pub fn predict_proba(&self, row: &FeatureRow) -> Result<[f64; 2]> {
        self.artifact.classifier.predict_proba(&self.transform(row))
    }

    /// Most likely class for one row.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::Model` if the classifier rejects the vector.
    pub fn predict(&self, row: &FeatureRow) -> Result<ScamLabel> {
        self.artifact.classifier.predict(&self.transform(row))
    }
}

fn assemble(
    vectorizer: &TfidfVectorizer,
    scaler: &StandardScaler,
    terms: &[String],
    row: &FeatureRow,
    out: &mut [f64],
) {
    let text = vectorizer.len();
    vectorizer.transform_into(terms, &mut out[..text]);
    out[text] = scaler.transform(row.amount_lost);
    out[text + 1] = row.scam_type_code as f64;
    out[text + 2] = row.state_code as f64;
}
