//! Rank computation for paired embeddings.
//!
//! Row `i` of the source matrix is, by construction of the evaluation batch,
//! paired with row `i` of the target matrix. The rank of row `i` is the number
//! of targets at least as close to source `i` as its true target, so ties with
//! the true target inflate the rank rather than being broken in its favour.

use super::distance::DistanceMetric;
use super::matrix::{DistanceMatrix, EmbeddingMatrix};
use crate::error::{EvalError, Result};

/// Ranks paired items by distance under a fixed metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankComputer {
    metric: DistanceMetric,
}

impl RankComputer {
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Full pairwise distance matrix between `src` and `tgt`.
    ///
    /// Both matrices must have the same number of rows and the same dimension.
    pub fn distances(&self, src: &EmbeddingMatrix, tgt: &EmbeddingMatrix) -> Result<DistanceMatrix> {
        if src.nrows() != tgt.nrows() || src.dim() != tgt.dim() {
            return Err(EvalError::ShapeMismatch {
                src_rows: src.nrows(),
                src_cols: src.dim(),
                tgt_rows: tgt.nrows(),
                tgt_cols: tgt.dim(),
            });
        }
        if src.is_empty() {
            return Err(EvalError::EmptyMatrix);
        }

        let n = src.nrows();
        let mut data = Vec::with_capacity(n * n);
        for s in src.iter_rows() {
            data.extend(tgt.iter_rows().map(|t| self.metric.distance(s, t)));
        }
        Ok(DistanceMatrix::from_raw(data, n))
    }

    /// Per-row ranks of the true match, plus the distance matrix they came from.
    pub fn compute_ranks(
        &self,
        src: &EmbeddingMatrix,
        tgt: &EmbeddingMatrix,
    ) -> Result<(Vec<usize>, DistanceMatrix)> {
        let distances = self.distances(src, tgt)?;
        let ranks = ranks_from_distances(&distances)?;
        Ok((ranks, distances))
    }
}

/// Rank of each row's diagonal entry, ties inclusive.
///
/// A NaN or infinite diagonal entry cannot be ranked and fails with
/// `EvalError::NonFiniteDistance`.
pub fn ranks_from_distances(distances: &DistanceMatrix) -> Result<Vec<usize>> {
    (0..distances.len())
        .map(|i| {
            let correct = distances.get(i, i);
            if !correct.is_finite() {
                return Err(EvalError::NonFiniteDistance { row: i, value: correct });
            }
            let closer_or_tied = distances
                .row(i)
                .iter()
                .enumerate()
                .filter(|&(j, &d)| j != i && d <= correct)
                .count();
            Ok(closer_or_tied + 1)
        })
        .collect()
}

/// Rank `tgt` rows against `src` rows using `metric`.
pub fn compute_ranks(
    src: &EmbeddingMatrix,
    tgt: &EmbeddingMatrix,
    metric: DistanceMetric,
) -> Result<(Vec<usize>, DistanceMatrix)> {
    RankComputer::new(metric).compute_ranks(src, tgt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f32]]) -> EmbeddingMatrix {
        EmbeddingMatrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn test_orthogonal_unit_vectors() {
        let m = matrix(&[&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]]);
        let (ranks, distances) = compute_ranks(&m, &m, DistanceMetric::Cosine).unwrap();
        assert_eq!(ranks, vec![1, 1, 1]);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 0.0 } else { 1.0 };
                assert!((distances.get(i, j) - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_identical_rows_all_tie() {
        let m = matrix(&[&[0.3, 0.4], &[0.3, 0.4], &[0.3, 0.4], &[0.3, 0.4]]);
        let (ranks, _) = compute_ranks(&m, &m, DistanceMetric::Cosine).unwrap();
        assert_eq!(ranks, vec![4, 4, 4, 4]);
    }

    #[test]
    fn test_strictly_minimal_diagonal_gives_rank_one() {
        let src = matrix(&[&[1.0, 0.1], &[0.1, 1.0]]);
        let tgt = matrix(&[&[0.9, 0.0], &[0.0, 0.9]]);
        let (ranks, _) = compute_ranks(&src, &tgt, DistanceMetric::Euclidean).unwrap();
        assert_eq!(ranks, vec![1, 1]);
    }

    #[test]
    fn test_wrong_match_ranks_lower() {
        // Target 1 sits on top of source 0, and target 0 is nearer source 1
        // than source 1's own target, so both true matches come second.
        let src = matrix(&[&[1.0, 0.0], &[0.0, 1.0]]);
        let tgt = matrix(&[&[0.7, 0.7], &[1.0, 0.0]]);
        let (ranks, distances) = compute_ranks(&src, &tgt, DistanceMetric::Cosine).unwrap();
        assert_eq!(ranks, vec![2, 2]);
        assert!(distances.get(0, 1) < distances.get(0, 0));
        assert!(distances.get(1, 0) < distances.get(1, 1));
    }

    #[test]
    fn test_ranks_within_bounds() {
        let src = matrix(&[&[1.0, 2.0], &[-1.0, 0.5], &[0.0, 0.0], &[3.0, -2.0], &[0.5, 0.5]]);
        let tgt = matrix(&[&[0.0, 1.0], &[2.0, 2.0], &[1.0, -1.0], &[0.0, 0.0], &[-3.0, 1.0]]);
        for metric in DistanceMetric::ALL {
            let (ranks, distances) = compute_ranks(&src, &tgt, metric).unwrap();
            assert_eq!(ranks.len(), 5);
            assert_eq!(distances.len(), 5);
            assert!(ranks.iter().all(|&r| (1..=5).contains(&r)), "{metric}: {ranks:?}");
        }
    }

    #[test]
    fn test_single_item_rank_is_one() {
        let src = matrix(&[&[1.0, 2.0]]);
        let tgt = matrix(&[&[-5.0, 0.0]]);
        let (ranks, _) = compute_ranks(&src, &tgt, DistanceMetric::Cosine).unwrap();
        assert_eq!(ranks, vec![1]);
    }

    #[test]
    fn test_row_count_mismatch_fails() {
        let src = matrix(&[&[1.0, 0.0]]);
        let tgt = matrix(&[&[1.0, 0.0], &[0.0, 1.0]]);
        let err = compute_ranks(&src, &tgt, DistanceMetric::Cosine).unwrap_err();
        assert!(matches!(
            err,
            EvalError::ShapeMismatch { src_rows: 1, tgt_rows: 2, .. }
        ));
    }

    #[test]
    fn test_dimension_mismatch_fails() {
        let src = matrix(&[&[1.0, 0.0], &[0.0, 1.0]]);
        let tgt = matrix(&[&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]]);
        let err = compute_ranks(&src, &tgt, DistanceMetric::Cosine).unwrap_err();
        assert!(matches!(err, EvalError::ShapeMismatch { src_cols: 2, tgt_cols: 3, .. }));
    }

    #[test]
    fn test_empty_fails() {
        let empty = EmbeddingMatrix::default();
        let err = compute_ranks(&empty, &empty, DistanceMetric::Cosine).unwrap_err();
        assert!(matches!(err, EvalError::EmptyMatrix));
    }

    #[test]
    fn test_non_finite_diagonal_is_an_error() {
        let d = DistanceMatrix::from_raw(vec![0.5, 0.0, 0.0, f64::NAN], 2);
        assert!(matches!(
            ranks_from_distances(&d),
            Err(EvalError::NonFiniteDistance { row: 1, .. })
        ));

        let d = DistanceMatrix::from_raw(vec![f64::INFINITY, 0.0, 0.0, 0.0], 2);
        assert!(matches!(
            ranks_from_distances(&d),
            Err(EvalError::NonFiniteDistance { row: 0, .. })
        ));
    }

    #[test]
    fn test_nan_embeddings_fail_instead_of_ranking_first() {
        let src = matrix(&[&[f32::NAN, 0.0], &[0.0, 1.0]]);
        let tgt = matrix(&[&[1.0, 0.0], &[0.0, 1.0]]);
        let err = compute_ranks(&src, &tgt, DistanceMetric::Cosine).unwrap_err();
        assert!(matches!(err, EvalError::NonFiniteDistance { row: 0, .. }));
    }

    #[test]
    fn test_nan_off_diagonal_does_not_count() {
        let d = DistanceMatrix::from_raw(vec![0.2, f64::NAN, 0.1, 0.3], 2);
        assert_eq!(ranks_from_distances(&d).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_rank_computer_keeps_metric() {
        let rc = RankComputer::new(DistanceMetric::Chebyshev);
        assert_eq!(rc.metric(), DistanceMetric::Chebyshev);
        assert_eq!(RankComputer::default().metric(), DistanceMetric::Cosine);
    }
}
