use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use scamscope_core::{ArtifactPaths, MODEL_DIR_ENV, PredictorHandle};
use scamscope_serve::{AppState, create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Serve scam predictions over HTTP.
#[derive(Parser, Debug)]
#[command(name = "scamscope-serve", version, about)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "SCAMSCOPE_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Directory holding the model artifacts.
    #[arg(long, env = MODEL_DIR_ENV)]
    model_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scamscope_serve=info,scamscope_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let dir = cli.model_dir.unwrap_or_else(ArtifactPaths::default_dir);
    tracing::info!("Loading model artifacts from {}", dir.display());

    let handle = PredictorHandle::load(ArtifactPaths::in_dir(&dir))
        .with_context(|| format!("failed to load model artifacts from {}", dir.display()))?;
    let app = create_router(AppState::new(handle));

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    tracing::info!("Listening on http://{}", cli.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
