//! Pairwise distance metrics used to rank targets against sources.
//!
//! Names follow the conventional `cdist` spellings so configs written for other
//! evaluation harnesses keep working.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance function between two equal-length vectors.
///
/// All metrics are computed in `f64` regardless of the embedding precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// `1 - cos(u, v)`
    #[default]
    Cosine,
    /// L2 norm of `u - v`
    Euclidean,
    /// Squared L2 norm of `u - v`
    SqEuclidean,
    /// L1 norm of `u - v` (Manhattan)
    Cityblock,
    /// L-infinity norm of `u - v`
    Chebyshev,
    /// Cosine distance between mean-centred vectors
    Correlation,
    /// `sum |u - v| / sum |u + v|`
    BrayCurtis,
    /// `sum |u - v| / (|u| + |v|)`, per component
    Canberra,
}

impl DistanceMetric {
    pub const ALL: [DistanceMetric; 8] = [
        DistanceMetric::Cosine,
        DistanceMetric::Euclidean,
        DistanceMetric::SqEuclidean,
        DistanceMetric::Cityblock,
        DistanceMetric::Chebyshev,
        DistanceMetric::Correlation,
        DistanceMetric::BrayCurtis,
        DistanceMetric::Canberra,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::SqEuclidean => "sqeuclidean",
            DistanceMetric::Cityblock => "cityblock",
            DistanceMetric::Chebyshev => "chebyshev",
            DistanceMetric::Correlation => "correlation",
            DistanceMetric::BrayCurtis => "braycurtis",
            DistanceMetric::Canberra => "canberra",
        }
    }

    /// Distance between `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if the vectors have different lengths. Callers go through
    /// [`crate::eval::compute_ranks`], which checks shapes up front.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f64 {
        assert_eq!(
            a.len(),
            b.len(),
            "Vectors must have same length for {} distance",
            self.name()
        );

        let pairs = a.iter().zip(b.iter()).map(|(&x, &y)| (x as f64, y as f64));
        match self {
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
            DistanceMetric::Euclidean => pairs.map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt(),
            DistanceMetric::SqEuclidean => pairs.map(|(x, y)| (x - y) * (x - y)).sum(),
            DistanceMetric::Cityblock => pairs.map(|(x, y)| (x - y).abs()).sum(),
            DistanceMetric::Chebyshev => pairs.map(|(x, y)| (x - y).abs()).fold(0.0, f64::max),
            DistanceMetric::Correlation => 1.0 - centred_cosine_similarity(a, b),
            DistanceMetric::BrayCurtis => {
                let (num, den) = pairs.fold((0.0, 0.0), |(num, den), (x, y)| {
                    (num + (x - y).abs(), den + (x + y).abs())
                });
                if den == 0.0 {
                    0.0
                } else {
                    num / den
                }
            }
            DistanceMetric::Canberra => pairs
                .map(|(x, y)| {
                    let den = x.abs() + y.abs();
                    if den == 0.0 {
                        0.0
                    } else {
                        (x - y).abs() / den
                    }
                })
                .sum(),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        DistanceMetric::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| EvalError::UnknownMetric(s.to_string()))
    }
}

/// Cosine similarity in `f64`, or 0.0 if either vector has zero magnitude
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut mag_a = 0.0f64;
    let mut mag_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a.sqrt() * mag_b.sqrt())
}

/// Pearson correlation; zero-variance inputs are treated as uncorrelated.
fn centred_cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().map(|&x| x as f64).sum::<f64>() / n;
    let mean_b = b.iter().map(|&y| y as f64).sum::<f64>() / n;

    let mut dot = 0.0f64;
    let mut var_a = 0.0f64;
    let mut var_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64 - mean_a, y as f64 - mean_b);
        dot += x * y;
        var_a += x * x;
        var_b += y * y;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }

    dot / (var_a.sqrt() * var_b.sqrt())
}
