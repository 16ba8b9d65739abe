//! Domain types shared by the retrieval engine, the answer composer and the
//! presentation layers.

use serde::{Deserialize, Serialize};

/// One line of the entry catalog.
///
/// - `source_id`: the reference document the entry was taken from
/// - `text`: the entry payload (typically one legal article)
///
/// Position in the catalog is the entry's identity; it must match the
/// ordinal of its vector in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub source_id: String,
    pub text: String,
}

impl CorpusEntry {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

/// Distance metric of a vector index. Every metric is smaller-is-closer:
/// squared L2, `1 - cos` and `1 - dot` respectively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    L2,
    Cosine,
    Dot,
}

/// Caller-supplied knobs for one retrieval pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrievalParams {
    /// Candidates pulled from the index.
    pub top_k: usize,
    /// Cosine similarity at or above which two entries are near-duplicates.
    pub similarity_threshold: f32,
    /// Hard cap on distinct entries kept.
    pub max_results: usize,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            top_k: 10,
            similarity_threshold: 0.9,
            max_results: 3,
        }
    }
}

impl RetrievalParams {
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.top_k == 0 {
            return Err(crate::Error::InvalidArgument(
                "top_k must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(crate::Error::InvalidArgument(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

/// Raw result of a top-k query against a vector index.
///
/// `distance` is smaller-is-closer for every index in this workspace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHit {
    pub position: usize,
    pub distance: f32,
}

/// An index hit resolved through the entry catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub entry: CorpusEntry,
    pub distance: f32,
}

/// A representative kept by the near-duplicate merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeduplicatedResult {
    pub source_id: String,
    #[serde(rename = "entry_text")]
    pub text: String,
    pub distance: f32,
}

impl From<SearchHit> for DeduplicatedResult {
    fn from(hit: SearchHit) -> Self {
        Self {
            source_id: hit.entry.source_id,
            text: hit.entry.text,
            distance: hit.distance,
        }
    }
}

/// Final answer for one query plus the entries it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagResponse {
    pub answer: String,
    pub citations: Vec<DeduplicatedResult>,
}
