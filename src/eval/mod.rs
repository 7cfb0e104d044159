//! Retrieval evaluation: distance metrics, true-match ranking, and MRR aggregation.

pub mod distance;
pub mod matrix;
pub mod metrics;
pub mod ranks;

pub use distance::DistanceMetric;
pub use matrix::{DistanceMatrix, EmbeddingMatrix};
pub use metrics::{hits_at_k, mean_reciprocal_rank, BatchMetrics, MrrAccumulator, MrrReport};
pub use ranks::{compute_ranks, ranks_from_distances, RankComputer};
