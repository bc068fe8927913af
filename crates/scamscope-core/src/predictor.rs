//! # Predictor
//!
//! The single encode/predict component behind every front end. A
//! [`Predictor`] owns one immutable artifact snapshot; a
//! [`PredictorHandle`] is the process-wide holder used by long-running
//! services, loaded once at startup and swapped atomically on reload.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, error, info};

use crate::artifacts::{ArtifactPaths, ArtifactSet};
use crate::error::Result;
use crate::types::{FeatureRow, IncidentInput, Prediction, PredictionRequest, PredictionResponse};

/// Classifies incidents against one loaded artifact snapshot.
#[derive(Debug, Clone)]
pub struct Predictor {
    artifacts: ArtifactSet,
}

impl Predictor {
    #[must_use]
    pub fn new(artifacts: ArtifactSet) -> Self {
        Self { artifacts }
    }

    /// Loads the three artifacts from `paths`.
    ///
    /// # Errors
    ///
    /// Returns an artifact error if any file is missing, corrupt or
    /// incompatible.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        ArtifactSet::load(paths).map(Self::new)
    }

    /// Loads the artifacts from their well-known names inside `dir`.
    ///
    /// # Errors
    ///
    /// See [`Predictor::load`].
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(&ArtifactPaths::in_dir(dir))
    }

    #[must_use]
    pub fn artifacts(&self) -> &ArtifactSet {
        &self.artifacts
    }

    /// Encodes categories with the training-time encoders. Unknown labels
    /// take the fallback code 0.
    #[must_use]
    pub fn encode(&self, input: &IncidentInput) -> FeatureRow {
        let scam_types = &self.artifacts.scam_types;
        let states = &self.artifacts.states;
        if !scam_types.contains(&input.scam_type) {
            debug!(scam_type = %input.scam_type, "unknown scam type, using fallback code");
        }
        if !states.contains(&input.state) {
            debug!(state = %input.state, "unknown state, using fallback code");
        }
        FeatureRow {
            summary: input.summary.clone(),
            amount_lost: input.amount_lost,
            scam_type_code: scam_types.encode_or_fallback(&input.scam_type),
            state_code: states.encode_or_fallback(&input.state),
        }
    }

    /// Classifies one incident.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::Model` if the pipeline rejects the row.
    pub fn predict(&self, input: &IncidentInput) -> Result<Prediction> {
        let row = self.encode(input);
        let [_, p_scam] = self.artifacts.pipeline.predict_proba(&row)?;
        let prediction = Prediction::from_scam_probability(p_scam);
        debug!(
            prediction = %prediction.prediction,
            confidence = prediction.confidence,
            "incident classified"
        );
        Ok(prediction)
    }

    /// Validates a wire request and classifies it.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::InvalidAmount` for a malformed amount, or
    /// any error from [`Predictor::predict`].
    pub fn predict_request(&self, request: &PredictionRequest) -> Result<Prediction> {
        let input = request.to_input()?;
        self.predict(&input)
    }

    /// Like [`Predictor::predict_request`], with every failure folded into
    /// the `{"error": ...}` payload.
    #[must_use]
    pub fn respond(&self, request: &PredictionRequest) -> PredictionResponse {
        PredictionResponse::from_result(self.predict_request(request))
    }
}

/// Loads the artifacts from `dir` and answers one request.
///
/// Nothing is cached between calls; each call reads the files again.
#[must_use]
pub fn predict_once(dir: impl AsRef<Path>, request: &PredictionRequest) -> PredictionResponse {
    PredictionResponse::from_result(
        Predictor::load_dir(dir).and_then(|predictor| predictor.predict_request(request)),
    )
}

/// Shared, hot-swappable predictor for long-running services.
///
/// Readers clone the inner `Arc` and work on an immutable snapshot; the
/// lock is held only while copying or replacing the pointer.
#[derive(Debug)]
pub struct PredictorHandle {
    paths: ArtifactPaths,
    current: RwLock<Arc<Predictor>>,
}

impl PredictorHandle {
    /// Loads the initial snapshot.
    ///
    /// # Errors
    ///
    /// Returns an artifact error if the initial load fails.
    pub fn load(paths: ArtifactPaths) -> Result<Self> {
        let predictor = Predictor::load(&paths)?;
        info!(pipeline = %paths.pipeline.display(), "model artifacts loaded");
        Ok(Self::with_predictor(paths, predictor))
    }

    /// Wraps an already-built predictor; `paths` is used by [`reload`](Self::reload).
    #[must_use]
    pub fn with_predictor(paths: ArtifactPaths, predictor: Predictor) -> Self {
        Self {
            paths,
            current: RwLock::new(Arc::new(predictor)),
        }
    }

    #[must_use]
    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Current snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<Predictor> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Re-reads the artifacts and swaps them in. On failure the previous
    /// snapshot stays active.
    ///
    /// # Errors
    ///
    /// Returns the artifact error that prevented the reload.
    pub fn reload(&self) -> Result<()> {
        match Predictor::load(&self.paths) {
            Ok(predictor) => {
                *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(predictor);
                info!(pipeline = %self.paths.pipeline.display(), "model artifacts reloaded");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "model reload failed, keeping previous artifacts");
                Err(e)
            }
        }
    }

    /// Answers one request with the current snapshot.
    #[must_use]
    pub fn respond(&self, request: &PredictionRequest) -> PredictionResponse {
        self.current().respond(request)
    }
}
