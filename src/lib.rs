pub mod config;
pub mod dataset;
pub mod embeddings;
pub mod error;
pub mod eval;
pub mod tasks;

pub use config::Config;
pub use error::{EvalError, Result};
pub use eval::{compute_ranks, DistanceMetric, EmbeddingMatrix, MrrReport, RankComputer};
