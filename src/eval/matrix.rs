use crate::error::{EvalError, Result};

/// Row-major matrix of embeddings, one row per item.
///
/// Row order is item identity: row `i` of a code matrix is paired with row `i`
/// of the matching query matrix.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    dim: usize,
}

impl EmbeddingMatrix {
    /// Empty matrix that only accepts rows of `dim` components
    pub fn with_dim(dim: usize) -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            dim,
        }
    }

    /// Build a matrix from per-item vectors, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.first().map(Vec::len).unwrap_or(0);
        let mut matrix = Self::with_dim(dim);
        matrix.data.reserve(rows.len() * dim);
        for row in rows {
            matrix.push_row(&row)?;
        }
        Ok(matrix)
    }

    /// Append one row.
    pub fn push_row(&mut self, row: &[f32]) -> Result<()> {
        if self.rows == 0 && self.dim == 0 {
            self.dim = row.len();
        }
        if row.len() != self.dim {
            return Err(EvalError::Embedding(format!(
                "Row {} has dimension {}, expected {}",
                self.rows,
                row.len(),
                self.dim
            )));
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    /// Concatenate `other` below `self` (axis 0).
    pub fn append(&mut self, other: &EmbeddingMatrix) -> Result<()> {
        if other.rows == 0 {
            return Ok(());
        }
        if self.rows == 0 {
            self.dim = other.dim;
        }
        if other.dim != self.dim {
            return Err(EvalError::Embedding(format!(
                "Cannot concatenate {}-dimensional rows onto a {}-dimensional matrix",
                other.dim, self.dim
            )));
        }
        self.data.extend_from_slice(&other.data);
        self.rows += other.rows;
        Ok(())
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// # Panics
    ///
    /// Panics if `i >= nrows()`.
    pub fn row(&self, i: usize) -> &[f32] {
        assert!(i < self.rows, "row {} out of bounds ({} rows)", i, self.rows);
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }
}

/// Square matrix of pairwise distances: entry `(i, j)` is `distance(src_i, tgt_j)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    n: usize,
}

impl DistanceMatrix {
    pub(crate) fn from_raw(data: Vec<f64>, n: usize) -> Self {
        debug_assert_eq!(data.len(), n * n);
        Self { data, n }
    }

    /// Number of rows (and columns)
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Distance of every source to its paired target
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.n).map(|i| self.get(i, i)).collect()
    }
}
