//! Exact in-memory index: brute-force scan over every stored vector.
use anyhow::Result;
use std::cmp::Ordering;

use lexrag_core::{Error, IndexHit, Metric, VectorIndex};

pub struct FlatIndex {
    dim: usize,
    metric: Metric,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new(dim: usize, metric: Metric) -> Self {
        Self {
            dim,
            metric,
            vectors: Vec::new(),
        }
    }

    /// Build from embeddings in catalog order; every vector must be `dim` wide.
    pub fn from_vectors(
        dim: usize,
        metric: Metric,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, Error> {
        let mut index = Self::new(dim, metric);
        for v in vectors {
            index.add(v)?;
        }
        Ok(index)
    }

    /// Append a vector; its position is the current length.
    pub fn add(&mut self, vector: Vec<f32>) -> Result<usize, Error> {
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }
}

/// Smaller is closer for every metric.
pub fn distance(metric: Metric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        Metric::L2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
        Metric::Dot => 1.0 - a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>(),
        Metric::Cosine => {
            // Dimensions already match, so the similarity cannot fail.
            1.0 - lexrag_core::similarity::cosine_similarity(a, b).unwrap_or(0.0)
        }
    }
}

impl VectorIndex for FlatIndex {
    fn dim(&self) -> usize {
        self.dim
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<IndexHit>> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            }
            .into());
        }
        if k == 0 || self.vectors.is_empty() {
            return Ok(Vec::new());
        }
        let mut hits: Vec<IndexHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, v)| IndexHit {
                position,
                distance: distance(self.metric, query, v),
            })
            .collect();
        // Stable sort keeps lower positions first on equal distance.
        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }
}
