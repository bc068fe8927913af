//! # ScamScope Trainer
//!
//! Offline workflow that turns the labeled incident table into the three
//! artifacts the predictor loads: the fitted pipeline and the scam-type and
//! state encoders. Also reports held-out metrics for the operator.

pub mod data;
pub mod metrics;
pub mod split;
pub mod trainer;

use std::path::Path;

pub use data::{load_csv, normalize_amount, read_records};
pub use metrics::{ClassMetrics, Evaluation};
pub use split::{Split, train_test_split};
pub use trainer::{TrainedModel, Trainer, TrainerConfig};

/// Train on `data_path` and persist artifacts into `out_dir`.
pub fn run_training<P: AsRef<Path>, Q: AsRef<Path>>(
    data_path: P,
    out_dir: Q,
    config: TrainerConfig,
) -> anyhow::Result<TrainedModel> {
    let data_path = data_path.as_ref();
    if !data_path.exists() {
        anyhow::bail!("Training data not found: {}", data_path.display());
    }

    let model = Trainer::new(config).train_on_file(data_path)?;
    model.save(out_dir)?;
    Ok(model)
}
