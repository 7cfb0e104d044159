use thiserror::Error;

/// Main error type for codesearch-eval
#[derive(Error, Debug)]
pub enum EvalError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON (dataset records, API responses)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding endpoint errors
    #[error("Embedding API error: {0}")]
    Embedding(String),

    /// Tokenizer loading or encoding errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Dataset loading errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Source and target matrices disagree on shape
    #[error(
        "Shape mismatch: source is {src_rows}x{src_cols}, target is {tgt_rows}x{tgt_cols}"
    )]
    ShapeMismatch {
        src_rows: usize,
        src_cols: usize,
        tgt_rows: usize,
        tgt_cols: usize,
    },

    /// Ranking was asked for on a matrix with no rows
    #[error("Cannot rank an empty embedding matrix")]
    EmptyMatrix,

    /// A true pair's distance was NaN or infinite, so it has no rank
    #[error("Non-finite distance {value} for pair {row}")]
    NonFiniteDistance { row: usize, value: f64 },

    /// Distance metric name not recognised
    #[error("Unknown distance metric: {0}")]
    UnknownMetric(String),

    /// Concatenated embedding counts differ from the configured batch size
    #[error(
        "Batch size mismatch: expected {expected} embeddings, got {codes} codes and {queries} queries"
    )]
    BatchSizeMismatch {
        expected: usize,
        codes: usize,
        queries: usize,
    },

    /// Not a single full batch could be formed from the split
    #[error("No complete batches: {examples} examples is fewer than batch size {batch_size}")]
    NoCompleteBatches { examples: usize, batch_size: usize },

    /// Recognised task that is not implemented
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// Convenient Result type using EvalError
pub type Result<T> = std::result::Result<T, EvalError>;
