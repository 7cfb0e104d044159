//! Test split plumbing: JSONL loading, tokenization, shuffling and batching.

pub mod batch;
pub mod loader;
pub mod tokenizer;

pub use batch::{full_batches, shuffle_pairs};
pub use loader::{discover_shards, load_split};
pub use tokenizer::{tokenize_examples, HfTokenizer, SequenceLengths, TextTokenizer};

use serde::Deserialize;

/// One code/docstring record of the test split.
///
/// Only the two columns the evaluation reads are kept; every other field of
/// the record is dropped while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestExample {
    /// Source code of the function
    pub original_string: String,
    /// Natural-language query paired with the code
    pub docstring: String,
}

/// Fixed-length token ids for one example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedPair {
    pub code: Vec<u32>,
    pub query: Vec<u32>,
}
