//! Tokenization of the code and query columns into fixed-length id sequences.

use super::{TestExample, TokenizedPair};
use crate::error::{EvalError, Result};
use futures_util::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tokenizers::TruncationParams;

/// Rows handed to one tokenization worker at a time
const SHARD_SIZE: usize = 1000;

/// Text to token ids.
pub trait TextTokenizer: Send + Sync {
    /// Ids for `text` including special tokens, at most `max_length` long
    fn tokenize(&self, text: &str, max_length: usize) -> Result<Vec<u32>>;

    fn pad_token_id(&self) -> u32;

    /// Ids truncated and right-padded to exactly `max_length`
    fn encode_padded(&self, text: &str, max_length: usize) -> Result<Vec<u32>> {
        let mut ids = self.tokenize(text, max_length)?;
        ids.truncate(max_length);
        ids.resize(max_length, self.pad_token_id());
        Ok(ids)
    }
}

/// Wrapper around a HuggingFace `tokenizer.json`
///
/// Padding saved in the file is disabled; `encode_padded` pads instead. One
/// copy of the tokenizer is kept per sequence length, each truncating the
/// content so the post-processor's special tokens still fit.
pub struct HfTokenizer {
    by_length: Vec<(usize, tokenizers::Tokenizer)>,
    pad_token_id: u32,
}

impl HfTokenizer {
    /// Load tokenizer from a file path, prepared for each of `max_lengths`
    pub fn from_file(tokenizer_path: &Path, max_lengths: &[usize]) -> Result<Self> {
        let tokenizer = tokenizers::Tokenizer::from_file(tokenizer_path).map_err(|e| {
            EvalError::Tokenizer(format!(
                "Failed to load tokenizer from {}: {}",
                tokenizer_path.display(),
                e
            ))
        })?;
        Self::new(tokenizer, max_lengths)
    }

    pub fn new(mut tokenizer: tokenizers::Tokenizer, max_lengths: &[usize]) -> Result<Self> {
        // RoBERTa-style vocabularies use <pad> with id 1
        let pad_token_id = tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| tokenizer.token_to_id("<pad>"))
            .or_else(|| tokenizer.token_to_id("[PAD]"))
            .unwrap_or(1);
        tokenizer.with_padding(None);

        let mut by_length: Vec<(usize, tokenizers::Tokenizer)> = Vec::new();
        for &max_length in max_lengths {
            if by_length.iter().any(|(len, _)| *len == max_length) {
                continue;
            }
            let mut truncating = tokenizer.clone();
            truncating
                .with_truncation(Some(TruncationParams {
                    max_length,
                    ..Default::default()
                }))
                .map_err(|e| {
                    EvalError::Tokenizer(format!(
                        "Invalid truncation length {}: {}",
                        max_length, e
                    ))
                })?;
            by_length.push((max_length, truncating));
        }

        Ok(Self {
            by_length,
            pad_token_id,
        })
    }
}

impl TextTokenizer for HfTokenizer {
    fn tokenize(&self, text: &str, max_length: usize) -> Result<Vec<u32>> {
        let tokenizer = self
            .by_length
            .iter()
            .find(|(len, _)| *len == max_length)
            .map(|(_, t)| t)
            .ok_or_else(|| {
                EvalError::Tokenizer(format!(
                    "Tokenizer was not prepared for max_length {}",
                    max_length
                ))
            })?;

        let encoding = tokenizer
            .encode(text, true)
            .map_err(|e| EvalError::Tokenizer(format!("Tokenization failed: {}", e)))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn pad_token_id(&self) -> u32 {
        self.pad_token_id
    }
}

/// Padded lengths for the two columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceLengths {
    pub code: usize,
    pub query: usize,
}

fn tokenize_shard(
    tokenizer: &dyn TextTokenizer,
    shard: &[TestExample],
    lengths: SequenceLengths,
) -> Result<Vec<TokenizedPair>> {
    shard
        .iter()
        .map(|example| {
            Ok(TokenizedPair {
                code: tokenizer.encode_padded(&example.original_string, lengths.code)?,
                query: tokenizer.encode_padded(&example.docstring, lengths.query)?,
            })
        })
        .collect()
}

/// Tokenize both columns of every example on a bounded pool of blocking workers.
///
/// At most `num_workers` shards are in flight; output order matches input order.
pub async fn tokenize_examples(
    examples: Vec<TestExample>,
    tokenizer: Arc<dyn TextTokenizer>,
    lengths: SequenceLengths,
    num_workers: usize,
) -> Result<Vec<TokenizedPair>> {
    let total = examples.len();
    let mut shards = Vec::with_capacity(total.div_ceil(SHARD_SIZE));
    let mut rest = examples.into_iter();
    loop {
        let shard: Vec<TestExample> = rest.by_ref().take(SHARD_SIZE).collect();
        if shard.is_empty() {
            break;
        }
        shards.push(shard);
    }

    log::debug!(
        "Tokenizing {} examples in {} shards on {} workers",
        total,
        shards.len(),
        num_workers
    );

    let mut workers = futures_util::stream::iter(shards.into_iter().map(|shard| {
        let tokenizer = Arc::clone(&tokenizer);
        tokio::task::spawn_blocking(move || tokenize_shard(tokenizer.as_ref(), &shard, lengths))
    }))
    .buffered(num_workers.max(1));

    let mut pairs = Vec::with_capacity(total);
    while let Some(joined) = workers.next().await {
        let shard_pairs = joined
            .map_err(|e| EvalError::Tokenizer(format!("Tokenization worker failed: {}", e)))??;
        pairs.extend(shard_pairs);
    }

    Ok(pairs)
}
