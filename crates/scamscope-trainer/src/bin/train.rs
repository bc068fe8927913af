use std::path::PathBuf;

use clap::Parser;
use scamscope_core::{ArtifactPaths, MODEL_DIR_ENV, PipelineConfig};
use scamscope_trainer::{TrainerConfig, run_training};
use tracing_subscriber::EnvFilter;

/// Train the scam classifier and write its artifacts.
#[derive(Parser, Debug)]
#[command(name = "train", version, about)]
struct Cli {
    /// Labeled incident table (CSV).
    #[arg(long, env = "SCAMSCOPE_DATASET", default_value = "data/scam_data.csv")]
    data: PathBuf,

    /// Output directory for the artifacts.
    #[arg(long, env = MODEL_DIR_ENV)]
    out: Option<PathBuf>,

    /// Fraction of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,

    /// Shuffle seed for the train/test split.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Vocabulary bound of the TF-IDF vectorizer.
    #[arg(long, default_value_t = 500)]
    max_features: usize,

    /// Inverse regularization strength.
    #[arg(short = 'C', long = "c", default_value_t = 1.0)]
    c: f64,

    /// Solver iteration cap.
    #[arg(long, default_value_t = 100)]
    max_iter: usize,

    /// Also write the evaluation as JSON to this file.
    #[arg(long)]
    metrics_json: Option<PathBuf>,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let out = cli.out.unwrap_or_else(ArtifactPaths::default_dir);
    let config = TrainerConfig::new()
        .with_test_size(cli.test_size)
        .with_seed(cli.seed)
        .with_pipeline(
            PipelineConfig::new()
                .with_max_features(cli.max_features)
                .with_c(cli.c)
                .with_max_iter(cli.max_iter),
        );

    let model = run_training(&cli.data, &out, config)?;

    println!(
        "Trained on {} rows, evaluated on {} ({} solver iterations, converged: {})",
        model.train_size, model.test_size, model.fit.iterations, model.fit.converged
    );
    println!();
    print!("{}", model.evaluation);
    println!();

    let (sample, prediction) = model.sample_prediction()?;
    println!("Example prediction:");
    println!("  summary:    {}", sample.summary);
    println!("  amount:     {}", sample.amount_lost);
    println!("  scam type:  {}", sample.scam_type);
    println!("  state:      {}", sample.state);
    println!("  => {prediction}");
    println!();
    println!("Artifacts written to {}", out.display());

    if let Some(path) = cli.metrics_json {
        let json = serde_json::to_string_pretty(&model.evaluation.to_json())?;
        std::fs::write(&path, json)?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Training failed: {e:#}");
        std::process::exit(1);
    }
}
