//! Code-search task: rank every code snippet of a batch against every query of
//! the same batch and report Mean Reciprocal Rank of the true pairs.

use crate::config::Config;
use crate::dataset::{
    full_batches, shuffle_pairs, tokenize_examples, SequenceLengths, TestExample, TextTokenizer,
    TokenizedPair,
};
use crate::embeddings::Encoder;
use crate::error::{EvalError, Result};
use crate::eval::{EmbeddingMatrix, MrrAccumulator, MrrReport, RankComputer};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Fine-tuning is not supported; evaluation only.
pub fn train(_cfg: &Config) -> Result<()> {
    Err(EvalError::Unsupported(
        "the train task is not implemented; only test is available".to_string(),
    ))
}

/// Validation-split evaluation is not supported; run the test task instead.
pub fn evaluate(_cfg: &Config) -> Result<()> {
    Err(EvalError::Unsupported(
        "the evaluate task is not implemented; only test is available".to_string(),
    ))
}

/// Evaluate `encoder` on the test split and return the MRR report.
///
/// Pairs are tokenized, shuffled with `run.seed`, and cut into batches of
/// `run.test_batch_size` (a final smaller batch is skipped). Each batch is
/// embedded `run.train_batch_size` items at a time, and the true code/query
/// pairs are ranked against the rest of their batch.
pub async fn test(
    cfg: &Config,
    encoder: &dyn Encoder,
    tokenizer: Arc<dyn TextTokenizer>,
    test_dataset: Vec<TestExample>,
) -> Result<MrrReport> {
    let run = &cfg.run;

    log::info!("Tokenizing codes and queries.");
    let lengths = SequenceLengths {
        code: run.max_code_length,
        query: run.max_query_length,
    };
    let mut pairs = tokenize_examples(test_dataset, tokenizer, lengths, run.num_workers).await?;
    shuffle_pairs(&mut pairs, run.seed);

    let total_batches = pairs.len() / run.test_batch_size;
    log::info!(
        "Evaluating {} batches of {} on {} ({} distance)",
        total_batches,
        run.test_batch_size,
        encoder.device(),
        run.distance_metric
    );
    if encoder.device() != cfg.device {
        log::warn!(
            "Encoder runs on {} but config requests {}",
            encoder.device(),
            cfg.device
        );
    }

    let ranker = RankComputer::new(run.distance_metric);
    let mut accumulator = MrrAccumulator::new(run.test_batch_size, run.distance_metric);
    let pb = create_progress_bar(total_batches);

    for batch in full_batches(&pairs, run.test_batch_size) {
        let (codes, queries) = embed_batch(encoder, batch, run.train_batch_size).await?;

        if codes.nrows() != run.test_batch_size || queries.nrows() != run.test_batch_size {
            return Err(EvalError::BatchSizeMismatch {
                expected: run.test_batch_size,
                codes: codes.nrows(),
                queries: queries.nrows(),
            });
        }

        let (ranks, _distances) = ranker.compute_ranks(&codes, &queries)?;
        let metrics = accumulator.push(&ranks);
        log::debug!(
            "Batch {}/{} MRR: {:.4}",
            accumulator.num_batches(),
            total_batches,
            metrics.mrr
        );
        pb.inc(1);
    }
    pb.finish_and_clear();

    let report = accumulator.finish(pairs.len())?;
    log::info!("Test MRR: {:.4}", report.mrr);
    Ok(report)
}

/// Embed codes and queries of one batch in sub-batches, concatenating the outputs.
async fn embed_batch(
    encoder: &dyn Encoder,
    batch: &[TokenizedPair],
    sub_batch_size: usize,
) -> Result<(EmbeddingMatrix, EmbeddingMatrix)> {
    let mut codes = EmbeddingMatrix::default();
    let mut queries = EmbeddingMatrix::default();

    for mini_batch in batch.chunks(sub_batch_size) {
        let code_ids: Vec<Vec<u32>> = mini_batch.iter().map(|p| p.code.clone()).collect();
        let query_ids: Vec<Vec<u32>> = mini_batch.iter().map(|p| p.query.clone()).collect();

        codes.append(&encoder.encode(&code_ids).await?)?;
        queries.append(&encoder.encode(&query_ids).await?)?;
    }

    Ok((codes, queries))
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Iteration [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta})")
            .map_err(|e| log::warn!("Failed to set progress bar style: {}", e))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb
}
