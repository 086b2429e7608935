use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use conflict_coach::config::AppConfig;
use conflict_coach::core::analysis::{AnalysisEngine, ConversationHistory, NeuralTelemetry};

/// Analyze a recorded practice conversation and print the report as JSON.
#[derive(Parser, Debug)]
#[command(name = "conflict-coach")]
#[command(version, about)]
struct Cli {
    /// Configuration file; defaults to the user config directory
    #[arg(short, long, env = "CONFLICT_COACH_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of exchanges
    conversation: PathBuf,

    /// Optional JSON object of neural telemetry
    telemetry: Option<PathBuf>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    let _log_guard = conflict_coach::core::logging::init(&config.logging);
    log::info!("{} v{} starting", conflict_coach::NAME, conflict_coach::VERSION);

    let history: ConversationHistory = read_json(&cli.conversation)?;
    let telemetry: Option<NeuralTelemetry> = cli
        .telemetry
        .as_deref()
        .map(read_json::<NeuralTelemetry>)
        .transpose()?;

    let engine = Arc::new(AnalysisEngine::new(config.ai.clone()));
    let mode = engine.initialize().await;
    log::info!("Analyzing {} exchanges in {} mode", history.len(), mode);

    let outcome = engine.analyze_detailed(&history, telemetry.as_ref()).await;
    log::info!("Report produced by {:?} path", outcome.source);

    println!("{}", serde_json::to_string_pretty(&outcome.report)?);

    engine.shutdown().await;
    Ok(())
}
