use std::collections::HashMap;

use anyhow::anyhow;
use lexrag_core::{CorpusEntry, Embedder, EntryCatalog, Metric, VectorIndex};
use lexrag_retrieve::RetrievalEngine;
use lexrag_vector::FlatIndex;

/// Embedder backed by a fixed text → vector table.
pub struct MapEmbedder {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl MapEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: HashMap::new(),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.dim);
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

impl Embedder for MapEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| anyhow!("no vector for {text:?}"))
    }
}

/// Unit basis vector `e_i` in `dim` dimensions.
pub fn basis(dim: usize, i: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[i] = 1.0;
    v
}

/// Engine over `(source, text, vector)` rows plus the query vectors, using an
/// exact L2 index built in row order.
pub fn engine(
    dim: usize,
    rows: &[(&str, &str, Vec<f32>)],
    queries: &[(&str, Vec<f32>)],
) -> RetrievalEngine {
    let mut embedder = MapEmbedder::new(dim);
    let mut entries = Vec::new();
    let mut vectors = Vec::new();
    for (source, text, vector) in rows {
        embedder = embedder.with(text, vector.clone());
        entries.push(CorpusEntry::new(*source, *text));
        vectors.push(vector.clone());
    }
    for (text, vector) in queries {
        embedder = embedder.with(text, vector.clone());
    }
    let index = FlatIndex::from_vectors(dim, Metric::L2, vectors).expect("index");
    assert_eq!(index.len(), entries.len());
    RetrievalEngine::new(
        Box::new(embedder),
        Box::new(index),
        EntryCatalog::new(entries),
    )
    .expect("engine")
}
