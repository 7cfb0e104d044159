//! Mock encoder for testing

use super::{Device, Encoder};
use crate::error::Result;
use crate::eval::EmbeddingMatrix;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Bag-of-tokens encoder: component `id % dim` counts occurrences of `id`.
///
/// Sequences with the same non-padding tokens embed identically, which makes
/// expected ranks easy to construct in tests.
pub struct MockEncoder {
    dim: usize,
    pad_token_id: u32,
    calls: AtomicUsize,
    largest_call: AtomicUsize,
}

impl MockEncoder {
    pub fn new(dim: usize, pad_token_id: u32) -> Self {
        Self {
            dim: dim.max(1),
            pad_token_id,
            calls: AtomicUsize::new(0),
            largest_call: AtomicUsize::new(0),
        }
    }

    /// Number of `encode` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most sequences seen in a single `encode` call
    pub fn largest_call(&self) -> usize {
        self.largest_call.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Encoder for MockEncoder {
    async fn encode(&self, input_ids: &[Vec<u32>]) -> Result<EmbeddingMatrix> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.largest_call.fetch_max(input_ids.len(), Ordering::SeqCst);

        let mut matrix = EmbeddingMatrix::with_dim(self.dim);
        let mut row = vec![0.0f32; self.dim];
        for ids in input_ids {
            row.iter_mut().for_each(|x| *x = 0.0);
            for &id in ids.iter().filter(|&&id| id != self.pad_token_id) {
                row[id as usize % self.dim] += 1.0;
            }
            matrix.push_row(&row)?;
        }
        Ok(matrix)
    }

    fn device(&self) -> Device {
        Device::Cpu
    }
}
