//! Evaluation metrics over true-match ranks: reciprocal rank, Hits@K, and the
//! per-run MRR aggregation.

use crate::error::{EvalError, Result};
use crate::eval::DistanceMetric;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 1/rank. Rank 0 never comes out of the rank computer; it scores 0.0.
pub fn reciprocal_rank(rank: usize) -> f64 {
    if rank == 0 {
        return 0.0;
    }
    1.0 / rank as f64
}

/// Mean of 1/rank over all items. If ranks is empty, returns 0.0.
pub fn mean_reciprocal_rank(ranks: &[usize]) -> f64 {
    if ranks.is_empty() {
        return 0.0;
    }
    ranks.iter().map(|&r| reciprocal_rank(r)).sum::<f64>() / ranks.len() as f64
}

/// Hits at K: fraction of items whose true match ranks within the top K.
/// If k is 0 or ranks is empty, returns 0.0.
pub fn hits_at_k(ranks: &[usize], k: usize) -> f64 {
    if k == 0 || ranks.is_empty() {
        return 0.0;
    }
    let hits = ranks.iter().filter(|&&r| r >= 1 && r <= k).count();
    hits as f64 / ranks.len() as f64
}

/// Metrics for one fixed-size evaluation batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchMetrics {
    pub size: usize,
    pub mrr: f64,
    pub hits_at_1: f64,
    pub hits_at_5: f64,
    pub hits_at_10: f64,
}

impl BatchMetrics {
    pub fn from_ranks(ranks: &[usize]) -> Self {
        Self {
            size: ranks.len(),
            mrr: mean_reciprocal_rank(ranks),
            hits_at_1: hits_at_k(ranks, 1),
            hits_at_5: hits_at_k(ranks, 5),
            hits_at_10: hits_at_k(ranks, 10),
        }
    }
}

/// Final result of a test run.
#[derive(Debug, Clone, Serialize)]
pub struct MrrReport {
    /// Mean over batches of the per-batch MRR
    pub mrr: f64,
    pub num_batches: usize,
    pub batch_size: usize,
    pub distance_metric: DistanceMetric,
    pub hits_at_1: f64,
    pub hits_at_5: f64,
    pub hits_at_10: f64,
    pub batches: Vec<BatchMetrics>,
    pub generated_at: DateTime<Utc>,
}

impl MrrReport {
    pub fn format_summary(&self) -> String {
        format!(
            "MRR: {:.4} | Hits@1: {:.1}% | Hits@5: {:.1}% | Hits@10: {:.1}% | Batches: {} x {} ({})",
            self.mrr,
            self.hits_at_1 * 100.0,
            self.hits_at_5 * 100.0,
            self.hits_at_10 * 100.0,
            self.num_batches,
            self.batch_size,
            self.distance_metric,
        )
    }
}

/// Running sum of per-batch metrics.
#[derive(Debug, Clone)]
pub struct MrrAccumulator {
    batch_size: usize,
    metric: DistanceMetric,
    batches: Vec<BatchMetrics>,
}

impl MrrAccumulator {
    pub fn new(batch_size: usize, metric: DistanceMetric) -> Self {
        Self {
            batch_size,
            metric,
            batches: Vec::new(),
        }
    }

    /// Record the ranks of one batch and return its metrics.
    pub fn push(&mut self, ranks: &[usize]) -> BatchMetrics {
        let metrics = BatchMetrics::from_ranks(ranks);
        self.batches.push(metrics);
        metrics
    }

    pub fn num_batches(&self) -> usize {
        self.batches.len()
    }

    /// Average the recorded batches.
    ///
    /// `examples` is only used to describe the failure when no batch was recorded.
    pub fn finish(self, examples: usize) -> Result<MrrReport> {
        if self.batches.is_empty() {
            return Err(EvalError::NoCompleteBatches {
                examples,
                batch_size: self.batch_size,
            });
        }

        let n = self.batches.len() as f64;
        let mean = |f: fn(&BatchMetrics) -> f64| self.batches.iter().map(f).sum::<f64>() / n;
        let mrr = mean(|b| b.mrr);
        let hits_at_1 = mean(|b| b.hits_at_1);
        let hits_at_5 = mean(|b| b.hits_at_5);
        let hits_at_10 = mean(|b| b.hits_at_10);

        Ok(MrrReport {
            mrr,
            num_batches: self.batches.len(),
            batch_size: self.batch_size,
            distance_metric: self.metric,
            hits_at_1,
            hits_at_5,
            hits_at_10,
            batches: self.batches,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mrr_all_first_rank() {
        assert!((mean_reciprocal_rank(&[1, 1, 1]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mrr_mixed_ranks() {
        // (1 + 1/2 + 1/4) / 3
        let expected = (1.0 + 0.5 + 0.25) / 3.0;
        assert!((mean_reciprocal_rank(&[1, 2, 4]) - expected).abs() < 1e-12);
    }

    #[test]
    fn mrr_empty_ranks() {
        assert_eq!(mean_reciprocal_rank(&[]), 0.0);
    }

    #[test]
    fn reciprocal_rank_zero_is_zero() {
        assert_eq!(reciprocal_rank(0), 0.0);
        assert_eq!(reciprocal_rank(4), 0.25);
    }

    #[test]
    fn hits_at_k_partial() {
        let ranks = [1, 3, 6, 12];
        assert!((hits_at_k(&ranks, 1) - 0.25).abs() < 1e-12);
        assert!((hits_at_k(&ranks, 5) - 0.5).abs() < 1e-12);
        assert!((hits_at_k(&ranks, 10) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn hits_at_k_zero_k() {
        assert_eq!(hits_at_k(&[1, 2], 0), 0.0);
    }

    #[test]
    fn accumulator_averages_batches() {
        let mut acc = MrrAccumulator::new(2, DistanceMetric::Cosine);
        acc.push(&[1, 1]);
        acc.push(&[2, 2]);
        assert_eq!(acc.num_batches(), 2);
        let report = acc.finish(4).unwrap();
        assert!((report.mrr - 0.75).abs() < 1e-12);
        assert!((report.hits_at_1 - 0.5).abs() < 1e-12);
        assert_eq!(report.num_batches, 2);
        assert_eq!(report.batches.len(), 2);
        assert!((report.batches[0].mrr - 1.0).abs() < 1e-12);
        assert!((report.batches[1].mrr - 0.5).abs() < 1e-12);
        assert!(report.format_summary().starts_with("MRR: 0.7500"));
    }

    #[test]
    fn accumulator_without_batches_fails() {
        let acc = MrrAccumulator::new(1000, DistanceMetric::Cosine);
        let err = acc.finish(999).unwrap_err();
        assert!(matches!(
            err,
            EvalError::NoCompleteBatches { examples: 999, batch_size: 1000 }
        ));
    }

    #[test]
    fn report_serializes_metric_name() {
        let mut acc = MrrAccumulator::new(1, DistanceMetric::Euclidean);
        acc.push(&[1]);
        let json = serde_json::to_value(acc.finish(1).unwrap()).unwrap();
        assert_eq!(json["distance_metric"], "euclidean");
        assert_eq!(json["num_batches"], 1);
    }
}
