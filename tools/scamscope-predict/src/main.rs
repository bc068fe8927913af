use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;
use scamscope_core::{
    AmountValue, ArtifactPaths, MODEL_DIR_ENV, PredictionRequest, PredictionResponse, Predictor,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const INVALID_ARGUMENTS: &str = "Invalid arguments";

/// Classify one incident, or a stream of JSON requests with `--stdin`.
#[derive(Parser, Debug)]
#[command(name = "scamscope-predict", version, about)]
struct Cli {
    /// <summary> <amount> <scam_type> <state>
    #[arg(allow_hyphen_values = true)]
    args: Vec<String>,

    /// Read one JSON request per line from stdin.
    #[arg(long)]
    stdin: bool,

    /// Directory holding the model artifacts.
    #[arg(long, env = MODEL_DIR_ENV)]
    model_dir: Option<PathBuf>,
}

/// Builds a request from the four positional arguments.
fn request_from_args(args: &[String]) -> Option<PredictionRequest> {
    let [summary, amount, scam_type, state] = args else {
        return None;
    };
    Some(PredictionRequest {
        summary: Some(summary.clone()),
        amount_lost: AmountValue::Text(amount.clone()),
        scam_type: Some(scam_type.clone()),
        state: Some(state.clone()),
    })
}

/// Answers one JSON-lines request. Malformed JSON becomes an error payload.
fn respond_line(predictor: &Predictor, line: &str) -> PredictionResponse {
    match serde_json::from_str::<PredictionRequest>(line) {
        Ok(request) => predictor.respond(&request),
        Err(e) => PredictionResponse::error(format!("invalid request: {e}")),
    }
}

fn print_json(out: &mut impl Write, response: &PredictionResponse) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, response)?;
    writeln!(out)?;
    Ok(())
}

fn run_stdin(predictor: &Predictor) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        print_json(&mut out, &respond_line(predictor, line))?;
    }
    out.flush()?;
    Ok(())
}

fn invalid_arguments() -> ! {
    println!(
        "{}",
        serde_json::json!({ "error": INVALID_ARGUMENTS })
    );
    std::process::exit(1);
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => invalid_arguments(),
    };

    let request = if cli.stdin {
        if !cli.args.is_empty() {
            invalid_arguments();
        }
        None
    } else {
        match request_from_args(&cli.args) {
            Some(request) => Some(request),
            None => invalid_arguments(),
        }
    };

    let dir = cli.model_dir.unwrap_or_else(ArtifactPaths::default_dir);
    debug!(dir = %dir.display(), "loading model artifacts");
    let predictor = match Predictor::load_dir(&dir) {
        Ok(predictor) => predictor,
        Err(e) => {
            print_json(&mut io::stdout(), &PredictionResponse::error(e.to_string()))?;
            std::process::exit(1);
        }
    };

    match request {
        Some(request) => print_json(&mut io::stdout(), &predictor.respond(&request)),
        None => run_stdin(&predictor),
    }
}
