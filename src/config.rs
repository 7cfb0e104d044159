use crate::embeddings::Device;
use crate::eval::DistanceMetric;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Where inference runs ("cpu", "cuda", "cuda:N")
    #[serde(default)]
    pub device: Device,
    pub run: RunConfig,
    pub model: ModelConfig,
    pub dataset: DatasetConfig,
}

/// Evaluation run parameters
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Code token sequences are padded/truncated to this length
    pub max_code_length: usize,
    /// Query token sequences are padded/truncated to this length
    pub max_query_length: usize,
    /// Shuffle seed
    pub seed: u64,
    /// Items ranked against each other per MRR batch
    pub test_batch_size: usize,
    /// Items sent to the model per inference call
    pub train_batch_size: usize,
    /// Tokenization workers
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,
    #[serde(default)]
    pub distance_metric: DistanceMetric,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Model endpoint and tokenizer
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible embeddings API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key. Local servers usually need none.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// HuggingFace `tokenizer.json` matching the model
    pub tokenizer_path: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Dataset location
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// JSONL file, or directory of `*.jsonl` shards, holding the test split
    pub test_path: PathBuf,
}

fn default_num_workers() -> usize {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in CODESEARCH_EVAL_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("CODESEARCH_EVAL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::load_from(&config_path)
    }

    /// Load and validate the configuration at `path`
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let run = &self.run;
        if run.max_code_length == 0 {
            anyhow::bail!("run.max_code_length must be greater than 0");
        }
        if run.max_query_length == 0 {
            anyhow::bail!("run.max_query_length must be greater than 0");
        }
        if run.test_batch_size == 0 {
            anyhow::bail!("run.test_batch_size must be greater than 0");
        }
        if run.train_batch_size == 0 {
            anyhow::bail!("run.train_batch_size must be greater than 0");
        }
        if run.num_workers == 0 {
            anyhow::bail!("run.num_workers must be greater than 0");
        }

        // Tokenizer and split paths are checked where the test task opens them
        if let Some(ref key_env) = self.model.api_key_env {
            std::env::var(key_env).with_context(|| {
                format!(
                    "Environment variable {} not set. Set it in your .env file or as an environment variable.",
                    key_env
                )
            })?;
        }

        Ok(())
    }

    /// Resolve the API key named by `model.api_key_env`, if any
    pub fn api_key(&self) -> Result<Option<String>> {
        match self.model.api_key_env {
            Some(ref key_env) => {
                let key = std::env::var(key_env)
                    .with_context(|| format!("Environment variable {} not set", key_env))?;
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    pub fn test_path(&self) -> &Path {
        &self.dataset.test_path
    }
}
