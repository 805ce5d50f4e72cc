//! codemend CLI: run the maintenance pipeline over a repository and print
//! the structured result as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use codemend_core::CodemendConfig;
use codemend_orchestration::PipelineOrchestrator;

#[derive(Parser, Debug)]
#[command(name = "codemend", about = "Analyze, patch, and verify a repository")]
struct Cli {
    /// Repository root to analyze
    repo: PathBuf,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CodemendConfig::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => CodemendConfig::default(),
    };

    let orchestrator = PipelineOrchestrator::new(config);
    let result = orchestrator
        .run(&cli.repo)
        .with_context(|| format!("pipeline run over {}", cli.repo.display()))?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.regressions.is_empty() {
        tracing::warn!(regressions = ?result.regressions, "run finished with regressions");
    }
    Ok(())
}
