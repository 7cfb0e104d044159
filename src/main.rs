use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codesearch_eval::dataset::{load_split, HfTokenizer, TextTokenizer};
use codesearch_eval::embeddings::HttpEncoder;
use codesearch_eval::{tasks, Config};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Code-search retrieval evaluation (Mean Reciprocal Rank)
#[derive(Parser, Debug)]
#[command(name = "codesearch-eval", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank codes against queries on the test split and report MRR
    Test {
        /// Test split to use instead of dataset.test_path (JSONL file or directory)
        #[arg(long)]
        split: Option<PathBuf>,

        /// Write the full report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Fine-tune the model (not implemented)
    Train,
    /// Evaluate on the validation split (not implemented)
    Evaluate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logger level falls back to run.log_level, so load config first
    let config = Config::load();
    let default_level = config
        .as_ref()
        .map(|c| c.run.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", default_level))
        .init();

    let config = config?;
    log::info!("Starting codesearch-eval v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Test { split, report } => run_test(&config, split, report).await,
        Command::Train => Ok(tasks::train(&config)?),
        Command::Evaluate => Ok(tasks::evaluate(&config)?),
    }
}

async fn run_test(config: &Config, split: Option<PathBuf>, report_path: Option<PathBuf>) -> Result<()> {
    let tokenizer = HfTokenizer::from_file(
        &config.model.tokenizer_path,
        &[config.run.max_code_length, config.run.max_query_length],
    )?;
    log::info!(
        "Tokenizer loaded from {} (pad id {})",
        config.model.tokenizer_path.display(),
        tokenizer.pad_token_id()
    );

    let encoder = HttpEncoder::new(
        &config.model.base_url,
        config.model.model.clone(),
        config.api_key()?,
        tokenizer.pad_token_id(),
        config.device,
        Duration::from_secs(config.model.timeout_secs),
    )?;
    log::info!(
        "Encoder configured: model={}, endpoint={}",
        config.model.model,
        encoder.endpoint()
    );

    let split = split.unwrap_or_else(|| config.test_path().to_path_buf());
    let examples = load_split(&split)?;

    let report = tasks::test(config, &encoder, Arc::new(tokenizer), examples).await?;

    println!("\n=== Evaluation Results ===");
    println!("{}", report.format_summary());

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        log::info!("Report written to {}", path.display());
    }

    Ok(())
}
