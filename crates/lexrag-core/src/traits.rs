use crate::types::IndexHit;

/// Text → dense vector. Every call for a given implementation returns
/// vectors of length `dim()`.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Read-only nearest-neighbour index over the corpus embeddings.
pub trait VectorIndex: Send + Sync {
    fn dim(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Best-first hits, at most `min(k, len())` of them.
    /// Fails with [`crate::Error::DimensionMismatch`] when `query.len() != dim()`.
    fn search(&self, query: &[f32], k: usize) -> anyhow::Result<Vec<IndexHit>>;
}

/// Decoding knobs passed through to the generation backend.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerationParams {
    pub max_new_tokens: usize,
    pub sample: bool,
    pub temperature: f32,
    pub top_k: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 1024,
            sample: true,
            temperature: 1.0,
            top_k: None,
            seed: Some(42),
        }
    }
}

/// Prompt → generated text. Implementations are expected to echo the prompt
/// at the start of their output.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> anyhow::Result<String>;
}
