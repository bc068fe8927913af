//! Training workflow: clean, encode, split, fit, evaluate.

use std::path::Path;

use scamscope_core::{
    ArtifactPaths, ArtifactSet, FeatureRow, FitReport, IncidentInput, LabelEncoder, Pipeline,
    PipelineConfig, Prediction, Predictor, ScamLabel, ScamScopeError, TrainingRecord,
};
use tracing::info;

use crate::data::load_csv;
use crate::metrics::Evaluation;
use crate::split::{DEFAULT_SEED, DEFAULT_TEST_SIZE, train_test_split};

/// Settings for one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Held-out fraction, kept strictly inside `(0, 1)`.
    pub test_size: f64,
    pub seed: u64,
    pub pipeline: PipelineConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SEED,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl TrainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the held-out fraction. Out-of-range values are clamped.
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = if test_size.is_finite() {
            test_size.clamp(0.01, 0.99)
        } else {
            DEFAULT_TEST_SIZE
        };
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }
}

/// Incident classified after training as a sanity check.
pub const SAMPLE_SUMMARY: &str =
    "The victim was contacted by a fake investment company offering high returns.";
pub const SAMPLE_AMOUNT: f64 = 20000.0;
pub const SAMPLE_SCAM_TYPE: &str = "Investment Scam";
pub const SAMPLE_STATE: &str = "Selangor";

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub artifacts: ArtifactSet,
    pub evaluation: Evaluation,
    pub fit: FitReport,
    pub train_size: usize,
    pub test_size: usize,
}

impl TrainedModel {
    /// Writes the three artifacts into `dir` under their well-known names.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> anyhow::Result<ArtifactPaths> {
        let paths = ArtifactPaths::in_dir(dir);
        let run_id = self.artifacts.save(&paths)?;
        info!(
            dir = %paths.pipeline.parent().unwrap_or(Path::new(".")).display(),
            run_id,
            "artifacts saved"
        );
        Ok(paths)
    }

    /// A predictor over the in-memory artifacts.
    pub fn predictor(&self) -> Predictor {
        Predictor::new(self.artifacts.clone())
    }

    /// The sample incident and its prediction under this model.
    pub fn sample_prediction(&self) -> anyhow::Result<(IncidentInput, Prediction)> {
        let input = IncidentInput::new(SAMPLE_SUMMARY)
            .with_amount(SAMPLE_AMOUNT)
            .with_scam_type(SAMPLE_SCAM_TYPE)
            .with_state(SAMPLE_STATE);
        let prediction = self.predictor().predict(&input)?;
        Ok((input, prediction))
    }
}

pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Trains on already-loaded records.
    ///
    /// Encoders are fitted on the whole cleaned table; the pipeline only
    /// sees the training partition.
    pub fn train(&self, records: &[TrainingRecord]) -> anyhow::Result<TrainedModel> {
        let records: Vec<&TrainingRecord> = records.iter().filter(|r| r.summary.is_some()).collect();
        if records.is_empty() {
            return Err(ScamScopeError::EmptyDataset.into());
        }

        let scams = records.iter().filter(|r| r.label == ScamLabel::Scam).count();
        if scams == 0 || scams == records.len() {
            return Err(ScamScopeError::SingleClass { found: 1 }.into());
        }
        info!(
            rows = records.len(),
            scam = scams,
            non_scam = records.len() - scams,
            "training table ready"
        );

        let scam_types = LabelEncoder::fit(records.iter().map(|r| r.scam_type_or_unknown()));
        let states = LabelEncoder::fit(records.iter().map(|r| r.state_or_unknown()));
        info!(
            scam_types = scam_types.len(),
            states = states.len(),
            "category encoders fitted"
        );

        let rows: Vec<FeatureRow> = records
            .iter()
            .map(|r| FeatureRow {
                summary: r.summary.clone().unwrap_or_default(),
                amount_lost: r.amount_lost,
                scam_type_code: scam_types.encode_or_fallback(r.scam_type_or_unknown()),
                state_code: states.encode_or_fallback(r.state_or_unknown()),
            })
            .collect();
        let labels: Vec<ScamLabel> = records.iter().map(|r| r.label).collect();

        let split = train_test_split(rows.len(), self.config.test_size, self.config.seed);
        let pick = |idx: &[usize]| -> (Vec<FeatureRow>, Vec<ScamLabel>) {
            idx.iter().map(|&i| (rows[i].clone(), labels[i])).unzip()
        };
        let (train_rows, train_labels) = pick(&split.train);
        let (test_rows, test_labels) = pick(&split.test);
        info!(train = train_rows.len(), test = test_rows.len(), "dataset split");

        let (pipeline, fit) = Pipeline::fit(&train_rows, &train_labels, &self.config.pipeline)?;

        // Scored with the same decision rule the predictor serves.
        let predicted = test_rows
            .iter()
            .map(|row| -> scamscope_core::Result<ScamLabel> {
                let [_, p_scam] = pipeline.predict_proba(row)?;
                Ok(Prediction::from_scam_probability(p_scam).prediction)
            })
            .collect::<scamscope_core::Result<Vec<_>>>()?;
        let evaluation = Evaluation::from_labels(&test_labels, &predicted);
        info!(
            accuracy = evaluation.accuracy(),
            macro_f1 = evaluation.macro_avg().f1,
            "held-out evaluation"
        );

        Ok(TrainedModel {
            artifacts: ArtifactSet {
                pipeline,
                scam_types,
                states,
            },
            evaluation,
            fit,
            train_size: train_rows.len(),
            test_size: test_rows.len(),
        })
    }

    /// Loads a CSV dataset and trains on it.
    pub fn train_on_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<TrainedModel> {
        let records = load_csv(path)?;
        self.train(&records)
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(TrainerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scamscope_core::FALLBACK_CODE;

    fn records() -> Vec<TrainingRecord> {
        let mut out = Vec::new();
        for i in 0..10 {
            out.push(
                TrainingRecord::new("fake investment scheme promising high returns", 20000.0, ScamLabel::Scam)
                    .with_scam_type("Investment Scam")
                    .with_state(if i % 2 == 0 { "Selangor" } else { "Johor" }),
            );
            out.push(
                TrainingRecord::new("refund received from the bank", 100.0, ScamLabel::NonScam)
                    .with_state(if i % 2 == 0 { "Johor" } else { "Selangor" }),
            );
        }
        out
    }

    #[test]
    fn test_config_clamps_test_size() {
        assert_eq!(TrainerConfig::new().with_test_size(1.5).test_size, 0.99);
        assert_eq!(TrainerConfig::new().with_test_size(0.0).test_size, 0.01);
        assert_eq!(TrainerConfig::new().with_test_size(f64::NAN).test_size, DEFAULT_TEST_SIZE);
    }

    #[test]
    fn test_train_sizes_and_encoders() {
        let model = Trainer::default().train(&records()).unwrap();
        assert_eq!(model.train_size + model.test_size, 20);
        assert_eq!(model.test_size, 4);
        assert_eq!(model.evaluation.total(), 4);
        assert_eq!(
            model.artifacts.scam_types.classes(),
            ["Investment Scam".to_string(), "Unknown".to_string()]
        );
        assert_eq!(model.artifacts.states.len(), 2);
    }

    #[test]
    fn test_encoders_cover_held_out_rows() {
        let mut data = records();
        let held_out = train_test_split(data.len(), DEFAULT_TEST_SIZE, DEFAULT_SEED).test[0];
        data[held_out].scam_type = Some("Zz Courier Scam".into());
        data[held_out].state = Some("Zz Labuan".into());

        let model = Trainer::default().train(&data).unwrap();
        let scam_types = &model.artifacts.scam_types;
        let states = &model.artifacts.states;
        assert!(scam_types.contains("Zz Courier Scam"));
        assert!(states.contains("Zz Labuan"));
        // Sorts last, so its code cannot coincide with the fallback.
        assert_eq!(scam_types.encode("Zz Courier Scam"), Some(scam_types.len() - 1));
        assert_ne!(states.encode_or_fallback("Zz Labuan"), FALLBACK_CODE);
    }

    #[test]
    fn test_evaluation_matches_served_predictions() {
        let data = records();
        let model = Trainer::default().train(&data).unwrap();
        let predictor = model.predictor();

        let split = train_test_split(data.len(), DEFAULT_TEST_SIZE, DEFAULT_SEED);
        let (truth, served): (Vec<ScamLabel>, Vec<ScamLabel>) = split
            .test
            .iter()
            .map(|&i| {
                let r = &data[i];
                let input = IncidentInput::new(r.summary.clone().unwrap_or_default())
                    .with_amount(r.amount_lost)
                    .with_scam_type(r.scam_type_or_unknown())
                    .with_state(r.state_or_unknown());
                (r.label, predictor.predict(&input).unwrap().prediction)
            })
            .unzip();
        assert_eq!(model.evaluation, Evaluation::from_labels(&truth, &served));
    }

    #[test]
    fn test_sample_prediction() {
        let model = Trainer::default().train(&records()).unwrap();
        let (input, prediction) = model.sample_prediction().unwrap();
        assert_eq!(input.scam_type, SAMPLE_SCAM_TYPE);
        assert_eq!(input.amount_lost, SAMPLE_AMOUNT);
        assert_eq!(prediction.prediction, ScamLabel::Scam);
        assert!(prediction.confidence > 0.5);
    }

    #[test]
    fn test_rows_without_summary_are_dropped() {
        let mut data = records();
        data.push(TrainingRecord {
            summary: None,
            amount_lost: 1.0,
            scam_type: Some("Ghost Type".into()),
            state: None,
            label: ScamLabel::Scam,
        });
        let model = Trainer::default().train(&data).unwrap();
        assert!(!model.artifacts.scam_types.contains("Ghost Type"));
        assert_eq!(model.train_size + model.test_size, 20);
    }

    #[test]
    fn test_empty_dataset() {
        let err = Trainer::default().train(&[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScamScopeError>(),
            Some(ScamScopeError::EmptyDataset)
        ));
    }

    #[test]
    fn test_single_class() {
        let data: Vec<TrainingRecord> = records()
            .into_iter()
            .filter(|r| r.label == ScamLabel::Scam)
            .collect();
        let err = Trainer::default().train(&data).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScamScopeError>(),
            Some(ScamScopeError::SingleClass { .. })
        ));
    }
}
